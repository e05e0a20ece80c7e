//! Chart assembly: runs every stage for one request and returns the
//! aggregate. A chart is all-or-nothing.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::calendars::CalendarSet;
use crate::ephemeris::{AnalyticEphemeris, CelestialPositionProvider, CelestialPositions};
use crate::error::ChartError;
use crate::gazetteer::{self, Gazetteer};
use crate::location::{
    LocationResolver, NearestCityTimezones, ResolvedLocation, TimezoneLookup,
    DEFAULT_TIMEZONE_MAX_DISTANCE_KM,
};
use crate::time::{
    to_julian_day, BirthDate, BirthMoment, ClockTime, JulianDay, LocalTimePolicy,
    LocalTimeResolution, Meridiem,
};
use crate::zodiac::{
    chinese_animal, degree_to_sign, sun_sign_from_date, ChineseAnimal, ZodiacSign,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub birth_date: BirthDate,
    pub clock_time: ClockTime,
    pub city: String,
    pub country: String,
}

impl ChartRequest {
    pub fn new(
        birth_date: BirthDate,
        clock_time: ClockTime,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            birth_date,
            clock_time,
            city: city.into(),
            country: country.into(),
        }
    }

    /// Build a request from raw text fields. Time is checked before date.
    pub fn parse(
        date: &str,
        hour: &str,
        minute: &str,
        meridiem: &str,
        city: &str,
        country: &str,
    ) -> Result<Self, ChartError> {
        let raw_time = format!("{hour} {minute} {meridiem}");
        let hour12 = hour
            .trim()
            .parse::<u32>()
            .map_err(|_| ChartError::invalid_time(&raw_time, "hour is not a number"))?;
        let minute = minute
            .trim()
            .parse::<u32>()
            .map_err(|_| ChartError::invalid_time(&raw_time, "minute is not a number"))?;
        let clock_time = ClockTime::new(hour12, minute, Meridiem::parse(meridiem)?)?;
        let birth_date = BirthDate::parse(date)?;
        Ok(Self::new(birth_date, clock_time, city.trim(), country.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZodiacAssignment {
    pub sun_sign: ZodiacSign,
    pub moon_sign: ZodiacSign,
    pub ascendant_sign: ZodiacSign,
    pub chinese_animal: ChineseAnimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    pub location: ResolvedLocation,
    pub clock_time: ClockTime,
    pub birth_moment: BirthMoment,
    pub utc: DateTime<Utc>,
    pub julian_day: JulianDay,
    pub local_time_resolution: LocalTimeResolution,
    pub provider: String,
    pub positions: CelestialPositions,
    pub zodiac: ZodiacAssignment,
    pub calendars: CalendarSet,
}

pub struct ChartEngine {
    resolver: LocationResolver,
    provider: Arc<dyn CelestialPositionProvider>,
    policy: LocalTimePolicy,
}

impl ChartEngine {
    pub fn new(
        gazetteer: Arc<Gazetteer>,
        timezones: Arc<dyn TimezoneLookup>,
        provider: Arc<dyn CelestialPositionProvider>,
        policy: LocalTimePolicy,
    ) -> Self {
        Self {
            resolver: LocationResolver::new(gazetteer, timezones),
            provider,
            policy,
        }
    }

    /// Nearest-city timezones over `gazetteer`, default distance cap.
    pub fn with_gazetteer(
        gazetteer: Arc<Gazetteer>,
        provider: Arc<dyn CelestialPositionProvider>,
        policy: LocalTimePolicy,
    ) -> Self {
        let timezones = Arc::new(NearestCityTimezones::new(
            Arc::clone(&gazetteer),
            DEFAULT_TIMEZONE_MAX_DISTANCE_KM,
        ));
        Self::new(gazetteer, timezones, provider, policy)
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn policy(&self) -> LocalTimePolicy {
        self.policy
    }

    pub fn compute_chart(&self, request: &ChartRequest) -> Result<ChartResult, ChartError> {
        request.clock_time.validate()?;
        request.birth_date.validate()?;

        let location = self.resolver.resolve(&request.city, &request.country)?;

        let moment = BirthMoment::new(request.birth_date, request.clock_time)?;
        let instant = to_julian_day(&moment, &location.timezone_id, self.policy)?;
        debug!(
            "{} {} -> {} (JD {:.6})",
            moment, location.timezone_id, instant.utc, instant.julian_day.value()
        );

        let raw = self
            .provider
            .positions_at(instant.julian_day, location.latitude, location.longitude)?;
        let positions = CelestialPositions::from_raw(raw)?;
        debug!(
            "{} provider: moon {:.4}, ascendant {:.4}",
            self.provider.name(),
            positions.moon_longitude,
            positions.ascendant_longitude
        );

        let date = request.birth_date;
        let zodiac = ZodiacAssignment {
            sun_sign: sun_sign_from_date(date.day, date.month)?,
            moon_sign: degree_to_sign(positions.moon_longitude),
            ascendant_sign: degree_to_sign(positions.ascendant_longitude),
            chinese_animal: chinese_animal(date.year),
        };

        let calendars = CalendarSet::from_gregorian(date.year, date.month, date.day)?;

        Ok(ChartResult {
            location,
            clock_time: request.clock_time,
            birth_moment: moment,
            utc: instant.utc,
            julian_day: instant.julian_day,
            local_time_resolution: instant.resolution,
            provider: self.provider.name().to_string(),
            positions,
            zodiac,
            calendars,
        })
    }
}

impl Default for ChartEngine {
    /// Embedded catalog, analytic provider, prefer-later local time policy.
    fn default() -> Self {
        Self::with_gazetteer(
            gazetteer::shared(),
            Arc::new(AnalyticEphemeris::new()),
            LocalTimePolicy::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_checks_time_first() {
        let err = ChartRequest::parse("31/02/2000", "13", "00", "PM", "Amman", "Jordan").unwrap_err();
        assert!(matches!(err, ChartError::InvalidTimeFormat { .. }));

        let err = ChartRequest::parse("31/02/2000", "11", "00", "PM", "Amman", "Jordan").unwrap_err();
        assert!(matches!(err, ChartError::InvalidDateFormat { .. }));
    }

    #[test]
    fn test_parse_request_arabic_meridiem() {
        let req = ChartRequest::parse("01/01/1990", "12", "30", "صباحًا", "Amman", "Jordan").unwrap();
        assert_eq!(req.clock_time.meridiem, Meridiem::Am);
        assert_eq!(req.birth_date, BirthDate::new(1990, 1, 1).unwrap());
    }

    #[test]
    fn test_default_engine_uses_analytic_provider() {
        let engine = ChartEngine::default();
        assert_eq!(engine.provider_name(), "analytic");
        assert_eq!(engine.policy(), LocalTimePolicy::PreferLater);
    }
}
