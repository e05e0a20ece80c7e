use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ephemeris::EphemerisError;

/// Input field a failure can be traced back to, so callers know what to re-prompt for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedField {
    Country,
    City,
    Date,
    Time,
    Ephemeris,
}

/// Errors that can end a chart computation.
///
/// A chart is all-or-nothing: any of these aborts the request and no partial
/// result is returned. Timezone lookup failures are not listed here because
/// they are recovered locally by falling back to UTC.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Country not found: {country}")]
    CountryNotFound { country: String },
    #[error("City not found: {city} ({country})")]
    CityNotFound { city: String, country: String },
    #[error("Invalid date {input:?}: {reason}")]
    InvalidDateFormat { input: String, reason: String },
    #[error("Invalid time {input:?}: {reason}")]
    InvalidTimeFormat { input: String, reason: String },
    #[error("Local time {local} is ambiguous or does not exist in {timezone}")]
    AmbiguousOrInvalidLocalTime { local: String, timezone: String },
    #[error("Ephemeris computation failed: {0}")]
    EphemerisComputationFailure(#[from] EphemerisError),
}

impl ChartError {
    pub fn field(&self) -> FailedField {
        match self {
            ChartError::CountryNotFound { .. } => FailedField::Country,
            ChartError::CityNotFound { .. } => FailedField::City,
            ChartError::InvalidDateFormat { .. } => FailedField::Date,
            ChartError::InvalidTimeFormat { .. }
            | ChartError::AmbiguousOrInvalidLocalTime { .. } => FailedField::Time,
            ChartError::EphemerisComputationFailure(_) => FailedField::Ephemeris,
        }
    }

    pub(crate) fn invalid_date(input: impl Into<String>, reason: impl Into<String>) -> Self {
        ChartError::InvalidDateFormat {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_time(input: impl Into<String>, reason: impl Into<String>) -> Self {
        ChartError::InvalidTimeFormat {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mapping() {
        let err = ChartError::CountryNotFound {
            country: "Wakanda".to_string(),
        };
        assert_eq!(err.field(), FailedField::Country);
        assert_eq!(err.to_string(), "Country not found: Wakanda");

        let err = ChartError::AmbiguousOrInvalidLocalTime {
            local: "2021-03-26 00:30".to_string(),
            timezone: "Asia/Amman".to_string(),
        };
        assert_eq!(err.field(), FailedField::Time);
    }
}
