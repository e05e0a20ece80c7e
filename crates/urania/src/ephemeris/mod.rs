//! Celestial position providers.
//!
//! A provider turns a Julian Day (UT) and a geographic position into the
//! Moon's ecliptic longitude and twelve house cusps. Cusp 1 is the
//! Ascendant. Providers may return longitudes outside [0, 360); callers go
//! through [`CelestialPositions::from_raw`] which normalizes and rejects
//! non-finite output.

pub mod analytic;
#[cfg(feature = "swisseph")]
pub mod swiss;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::JulianDay;
use crate::zodiac::normalize_degrees;

pub use analytic::AnalyticEphemeris;
#[cfg(feature = "swisseph")]
pub use swiss::{configured_ephemeris_path, SwissEphemerisAdapter};

/// Errors that can occur during ephemeris calculations
#[derive(Error, Debug)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Invalid house system: {system}. Valid systems: {valid:?}")]
    InvalidHouseSystem { system: String, valid: Vec<String> },
    #[error("Failed to calculate position for {body} at JD {julian_day}: {message}")]
    CalculationFailed {
        body: String,
        julian_day: f64,
        message: String,
    },
    #[error("House calculation failed: {message}")]
    HouseCalculationFailed { message: String },
    #[error("Provider returned a non-finite {quantity}")]
    NonFinite { quantity: String },
}

/// House system mapping
pub const HOUSE_SYSTEMS: &[(&str, u8)] = &[
    ("placidus", b'P'),
    ("whole_sign", b'W'),
    ("koch", b'K'),
    ("equal", b'E'),
    ("regiomontanus", b'R'),
    ("campanus", b'C'),
    ("alcabitius", b'A'),
    ("morinus", b'M'),
];

pub const DEFAULT_HOUSE_SYSTEM: &str = "placidus";

/// Convert house system string to byte format
pub fn house_system_byte(house_system: &str) -> Result<u8, EphemerisError> {
    let wanted = house_system.trim().to_lowercase();
    HOUSE_SYSTEMS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, byte)| *byte)
        .ok_or_else(|| EphemerisError::InvalidHouseSystem {
            system: house_system.to_string(),
            valid: HOUSE_SYSTEMS.iter().map(|(name, _)| name.to_string()).collect(),
        })
}

/// Provider output before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPositions {
    pub moon_longitude: f64,
    pub house_cusps: [f64; 12],
}

pub trait CelestialPositionProvider: Send + Sync {
    fn positions_at(
        &self,
        julian_day: JulianDay,
        latitude: f64,
        longitude: f64,
    ) -> Result<RawPositions, EphemerisError>;

    fn name(&self) -> &'static str;
}

/// Moon, Ascendant and house cusps, every longitude in [0, 360).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CelestialPositions {
    pub moon_longitude: f64,
    pub ascendant_longitude: f64,
    pub house_cusps: [f64; 12],
}

impl CelestialPositions {
    pub fn from_raw(raw: RawPositions) -> Result<Self, EphemerisError> {
        let moon_longitude = finite_longitude(raw.moon_longitude, "moon longitude")?;
        let mut house_cusps = [0.0; 12];
        for (i, cusp) in raw.house_cusps.iter().enumerate() {
            house_cusps[i] = finite_longitude(*cusp, &format!("house {} cusp", i + 1))?;
        }
        Ok(Self {
            moon_longitude,
            ascendant_longitude: house_cusps[0],
            house_cusps,
        })
    }
}

fn finite_longitude(value: f64, quantity: &str) -> Result<f64, EphemerisError> {
    if !value.is_finite() {
        return Err(EphemerisError::NonFinite {
            quantity: quantity.to_string(),
        });
    }
    Ok(normalize_degrees(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_normalizes() {
        let mut cusps = [0.0; 12];
        for (i, c) in cusps.iter_mut().enumerate() {
            *c = -15.0 + 30.0 * i as f64;
        }
        let pos = CelestialPositions::from_raw(RawPositions {
            moon_longitude: 725.0,
            house_cusps: cusps,
        })
        .unwrap();
        assert!((pos.moon_longitude - 5.0).abs() < 1e-9);
        assert!((pos.ascendant_longitude - 345.0).abs() < 1e-9);
        assert!(pos.house_cusps.iter().all(|c| (0.0..360.0).contains(c)));
    }

    #[test]
    fn test_from_raw_rejects_nan() {
        let err = CelestialPositions::from_raw(RawPositions {
            moon_longitude: f64::NAN,
            house_cusps: [0.0; 12],
        })
        .unwrap_err();
        assert!(matches!(err, EphemerisError::NonFinite { .. }));
    }

    #[test]
    fn test_house_system_byte() {
        assert_eq!(house_system_byte("Placidus").unwrap(), b'P');
        assert_eq!(house_system_byte("whole_sign").unwrap(), b'W');
        assert!(matches!(
            house_system_byte("topocentric"),
            Err(EphemerisError::InvalidHouseSystem { .. })
        ));
    }
}
