//! Swiss Ephemeris backed provider.
//!
//! The Swiss Ephemeris C library keeps process-global state (ephemeris path,
//! file handles, caches), so every call goes through [`SWISS_LOCK`]. The lock
//! also remembers which data directory the library was last pointed at, so
//! adapters with different paths can share the process.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use lazy_static::lazy_static;
use log::debug;
use swisseph::swe::{calc_ut, houses_ex, set_ephe_path};
use swisseph::{AscMc, Cusp};

use super::{
    house_system_byte, CelestialPositionProvider, EphemerisError, RawPositions,
    DEFAULT_HOUSE_SYSTEM,
};
use crate::time::JulianDay;

pub const DEFAULT_EPHEMERIS_PATH: &str = "/usr/local/share/swisseph";

// FLG_SWIEPH: read the Swiss Ephemeris data files
const FLG_SWIEPH: i32 = 2;
const MOON: u32 = 1;

lazy_static! {
    /// Ephemeris path currently set in the C library.
    static ref SWISS_LOCK: Mutex<Option<String>> = Mutex::new(None);
}

fn swiss_lock() -> MutexGuard<'static, Option<String>> {
    SWISS_LOCK.lock().unwrap_or_else(|poisoned| {
        // Re-apply the path after a panic
        let mut guard = poisoned.into_inner();
        *guard = None;
        guard
    })
}

/// Path the C library was last configured with, if any.
pub fn configured_ephemeris_path() -> Option<String> {
    swiss_lock().clone()
}

/// Swiss Ephemeris adapter implementation
#[derive(Debug, Clone)]
pub struct SwissEphemerisAdapter {
    ephemeris_path: PathBuf,
    ephemeris_path_text: String,
    house_system: String,
    house_system_byte: u8,
}

impl SwissEphemerisAdapter {
    /// Create a new adapter with optional ephemeris path
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, EphemerisError> {
        Self::with_house_system(ephemeris_path, DEFAULT_HOUSE_SYSTEM)
    }

    pub fn with_house_system(
        ephemeris_path: Option<PathBuf>,
        house_system: &str,
    ) -> Result<Self, EphemerisError> {
        let path = ephemeris_path.unwrap_or_else(|| {
            env::var("SWISS_EPHEMERIS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_EPHEMERIS_PATH))
        });

        if !path.exists() {
            return Err(EphemerisError::FileNotFound {
                path: path.display().to_string(),
                message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
            });
        }

        let path_text = match path.to_str() {
            Some(text) if !text.contains('\0') => text.to_string(),
            _ => {
                return Err(EphemerisError::FileNotFound {
                    path: path.display().to_string(),
                    message: "Ephemeris path must be valid UTF-8".to_string(),
                })
            }
        };

        let byte = house_system_byte(house_system)?;
        debug!(
            "Swiss Ephemeris adapter at {} with {} houses",
            path.display(),
            house_system
        );

        Ok(Self {
            ephemeris_path: path,
            ephemeris_path_text: path_text,
            house_system: house_system.trim().to_lowercase(),
            house_system_byte: byte,
        })
    }

    pub fn ephemeris_path(&self) -> &Path {
        &self.ephemeris_path
    }

    pub fn house_system(&self) -> &str {
        &self.house_system
    }

    fn calc_moon_longitude(&self, jd: f64) -> Result<f64, EphemerisError> {
        let result = calc_ut(jd, MOON, FLG_SWIEPH as u32).map_err(|e| {
            EphemerisError::CalculationFailed {
                body: "moon".to_string(),
                julian_day: jd,
                message: format!("Swiss Ephemeris error: {}", e),
            }
        })?;
        Ok(result.out[0])
    }

    fn calc_house_cusps(&self, jd: f64, lat: f64, lon: f64) -> Result<[f64; 12], EphemerisError> {
        let (c, a) = houses_ex(jd, FLG_SWIEPH, lat, lon, self.house_system_byte as i32);
        let cusps = Cusp::from_array(c);
        let ascmc = AscMc::from_array(a);

        let cusp_values = [
            cusps.first,
            cusps.second,
            cusps.third,
            cusps.fourth,
            cusps.fifth,
            cusps.sixth,
            cusps.seventh,
            cusps.eighth,
            cusps.ninth,
            cusps.tenth,
            cusps.eleventh,
            cusps.twelfth,
        ];
        if cusp_values.iter().any(|c| !c.is_finite()) || !ascmc.ascendant.is_finite() {
            return Err(EphemerisError::HouseCalculationFailed {
                message: format!(
                    "{} houses undefined at latitude {lat}",
                    self.house_system
                ),
            });
        }
        Ok(cusp_values)
    }
}

impl CelestialPositionProvider for SwissEphemerisAdapter {
    fn positions_at(
        &self,
        julian_day: JulianDay,
        latitude: f64,
        longitude: f64,
    ) -> Result<RawPositions, EphemerisError> {
        let jd = julian_day.value();
        let mut configured = swiss_lock();
        if configured.as_deref() != Some(self.ephemeris_path_text.as_str()) {
            debug!("Pointing Swiss Ephemeris at {}", self.ephemeris_path_text);
            set_ephe_path(&self.ephemeris_path_text);
            *configured = Some(self.ephemeris_path_text.clone());
        }
        let moon_longitude = self.calc_moon_longitude(jd)?;
        let house_cusps = self.calc_house_cusps(jd, latitude, longitude)?;
        Ok(RawPositions {
            moon_longitude,
            house_cusps,
        })
    }

    fn name(&self) -> &'static str {
        "swiss"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_file_not_found() {
        let err = SwissEphemerisAdapter::new(Some(PathBuf::from("/nonexistent/urania/ephe")))
            .unwrap_err();
        assert!(matches!(err, EphemerisError::FileNotFound { .. }));
    }

    #[test]
    fn test_unknown_house_system_rejected() {
        let dir = env::temp_dir();
        let err = SwissEphemerisAdapter::with_house_system(Some(dir), "topocentric").unwrap_err();
        assert!(matches!(err, EphemerisError::InvalidHouseSystem { .. }));
    }

    #[test]
    #[ignore] // Requires Swiss Ephemeris files
    fn test_moon_matches_analytic_within_a_degree() {
        let adapter = SwissEphemerisAdapter::new(None).unwrap();
        let jd = JulianDay(2_451_545.0);
        let swiss = adapter.positions_at(jd, 51.48, 0.0).unwrap();
        let analytic = crate::ephemeris::AnalyticEphemeris
            .positions_at(jd, 51.48, 0.0)
            .unwrap();
        let diff = (swiss.moon_longitude - analytic.moon_longitude).rem_euclid(360.0);
        assert!(diff < 1.0 || diff > 359.0);
    }

    #[test]
    #[ignore] // Requires Swiss Ephemeris files; mutates the library's global path
    fn test_each_adapter_applies_its_own_path() {
        let installed = SwissEphemerisAdapter::new(None).unwrap();
        let scratch = SwissEphemerisAdapter::new(Some(env::temp_dir())).unwrap();
        let jd = JulianDay(2_451_545.0);

        scratch.positions_at(jd, 0.0, 0.0).unwrap();
        assert_eq!(
            configured_ephemeris_path().as_deref(),
            env::temp_dir().to_str()
        );
        installed.positions_at(jd, 0.0, 0.0).unwrap();
        assert_eq!(
            configured_ephemeris_path().as_deref(),
            installed.ephemeris_path().to_str()
        );
    }
}
