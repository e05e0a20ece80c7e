//! Closed-form, low-precision ephemeris.
//!
//! Moon longitude from the principal periodic terms of the lunar theory in
//! Meeus, "Astronomical Algorithms" (2nd ed), Chapter 47. The terms kept
//! here put the geometric longitude within about 0.01° of the full series.
//! Ascendant from local sidereal time (IERS ERA + Capitaine GMST polynomial)
//! and mean obliquity; houses are equal 30° divisions from the Ascendant.
//!
//! UT is used where TT is expected; the ~1 minute difference moves the Moon
//! by well under 0.01°.

use std::f64::consts::TAU;

use super::{CelestialPositionProvider, EphemerisError, RawPositions};
use crate::time::JulianDay;

pub const J2000_JD: f64 = 2_451_545.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;
const ARCSEC_TO_DEG: f64 = 1.0 / 3600.0;

/// (D, M, M', F, coefficient in 1e-6 degrees), Meeus table 47.A.
const MOON_LONGITUDE_TERMS: &[(i8, i8, i8, i8, f64)] = &[
    (0, 0, 1, 0, 6_288_774.0),
    (2, 0, -1, 0, 1_274_027.0),
    (2, 0, 0, 0, 658_314.0),
    (0, 0, 2, 0, 213_618.0),
    (0, 1, 0, 0, -185_116.0),
    (0, 0, 0, 2, -114_332.0),
    (2, 0, -2, 0, 58_793.0),
    (2, -1, -1, 0, 57_066.0),
    (2, 0, 1, 0, 53_322.0),
    (2, -1, 0, 0, 45_758.0),
    (0, 1, -1, 0, -40_923.0),
    (1, 0, 0, 0, -34_720.0),
    (0, 1, 1, 0, -30_383.0),
    (2, 0, 0, -2, 15_327.0),
    (0, 0, 1, 2, -12_528.0),
    (0, 0, 1, -2, 10_980.0),
    (4, 0, -1, 0, 10_675.0),
    (0, 0, 3, 0, 10_034.0),
    (4, 0, -2, 0, 8_548.0),
    (2, 1, -1, 0, -7_888.0),
    (2, 1, 0, 0, -6_766.0),
    (1, 0, -1, 0, -5_163.0),
    (1, 1, 0, 0, 4_987.0),
    (2, -1, 1, 0, 4_036.0),
    (2, 0, 2, 0, 3_994.0),
    (4, 0, 0, 0, 3_861.0),
    (2, 0, -3, 0, 3_665.0),
    (0, 1, -2, 0, -2_689.0),
    (2, 0, -1, 2, -2_602.0),
    (2, -1, -2, 0, 2_390.0),
    (1, 0, 1, 0, -2_348.0),
    (2, -2, 0, 0, 2_236.0),
    (0, 1, 2, 0, -2_120.0),
    (0, 2, 0, 0, -2_069.0),
    (2, -2, -1, 0, 2_048.0),
];

fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}

/// Geometric ecliptic longitude of the Moon in degrees, not normalized.
pub fn moon_longitude_deg(jd: f64) -> f64 {
    let t = centuries_since_j2000(jd);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let mean_longitude = 218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t2
        + t3 / 538_841.0
        - t4 / 65_194_000.0;
    let elongation = 297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t2
        + t3 / 545_868.0
        - t4 / 113_065_000.0;
    let sun_anomaly = 357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t2 + t3 / 24_490_000.0;
    let moon_anomaly = 134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t2 + t3 / 69_699.0
        - t4 / 14_712_000.0;
    let latitude_argument = 93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t2
        - t3 / 3_526_000.0
        + t4 / 863_310_000.0;
    // Eccentricity of Earth's orbit scales terms involving the Sun's anomaly
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;

    let mut sum: f64 = MOON_LONGITUDE_TERMS
        .iter()
        .map(|&(d, m, mp, f, coeff)| {
            let arg = d as f64 * elongation
                + m as f64 * sun_anomaly
                + mp as f64 * moon_anomaly
                + f as f64 * latitude_argument;
            coeff * e.powi(m.unsigned_abs() as i32) * arg.to_radians().sin()
        })
        .sum();

    let a1 = 119.75 + 131.849 * t;
    let a2 = 53.09 + 479_264.290 * t;
    sum += 3_958.0 * a1.to_radians().sin()
        + 1_962.0 * (mean_longitude - latitude_argument).to_radians().sin()
        + 318.0 * a2.to_radians().sin();

    mean_longitude + sum / 1_000_000.0
}

/// Greenwich Mean Sidereal Time in radians, [0, 2π).
pub fn gmst_rad(jd_ut1: f64) -> f64 {
    let du = jd_ut1 - J2000_JD;
    let era = TAU * (0.779_057_273_264_0 + 1.002_737_811_911_354_6 * du);
    let t = du / DAYS_PER_CENTURY;
    let t2 = t * t;
    let poly_arcsec = 0.014_506 + 4_612.156_534 * t + 1.391_581_7 * t2
        - 0.000_000_44 * t2 * t
        - 0.000_029_956 * t2 * t2;
    (era + (poly_arcsec * ARCSEC_TO_DEG).to_radians()).rem_euclid(TAU)
}

/// Mean obliquity of the ecliptic in radians (IAU 2006, linear term).
pub fn mean_obliquity_rad(jd: f64) -> f64 {
    let t = centuries_since_j2000(jd);
    (23.439_279_444 - 0.013_010_213_6 * t).to_radians()
}

/// Ecliptic longitude of the Ascendant in degrees, [0, 360).
///
/// `longitude_east` is positive east of Greenwich.
pub fn ascendant_deg(jd: f64, latitude: f64, longitude_east: f64) -> f64 {
    let lst = (gmst_rad(jd) + longitude_east.to_radians()).rem_euclid(TAU);
    let eps = mean_obliquity_rad(jd);
    let phi = latitude.to_radians();
    let asc = f64::atan2(
        lst.cos(),
        -(lst.sin() * eps.cos() + phi.tan() * eps.sin()),
    );
    asc.rem_euclid(TAU).to_degrees()
}

/// Reentrant provider with no data files and no global state.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticEphemeris;

impl AnalyticEphemeris {
    pub fn new() -> Self {
        Self
    }
}

impl CelestialPositionProvider for AnalyticEphemeris {
    fn positions_at(
        &self,
        julian_day: JulianDay,
        latitude: f64,
        longitude: f64,
    ) -> Result<RawPositions, EphemerisError> {
        let jd = julian_day.value();
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(EphemerisError::HouseCalculationFailed {
                message: format!("latitude {latitude} out of range"),
            });
        }

        let ascendant = ascendant_deg(jd, latitude, longitude);
        let mut house_cusps = [0.0; 12];
        for (i, cusp) in house_cusps.iter_mut().enumerate() {
            *cusp = ascendant + 30.0 * i as f64;
        }

        Ok(RawPositions {
            moon_longitude: moon_longitude_deg(jd),
            house_cusps,
        })
    }

    fn name(&self) -> &'static str {
        "analytic"
    }
}
