pub mod calendars;
pub mod chart;
pub mod ephemeris;
pub mod error;
pub mod gazetteer;
pub mod location;
pub mod time;
pub mod zodiac;

pub use calendars::{CalendarDate, CalendarKind, CalendarSet};
pub use chart::{ChartEngine, ChartRequest, ChartResult, ZodiacAssignment};
pub use ephemeris::{AnalyticEphemeris, CelestialPositionProvider, CelestialPositions, EphemerisError};
#[cfg(feature = "swisseph")]
pub use ephemeris::SwissEphemerisAdapter;
pub use error::{ChartError, FailedField};
pub use gazetteer::{Gazetteer, GazetteerError};
pub use location::{LocationResolver, NearestCityTimezones, ResolvedLocation, TimezoneLookup};
pub use time::{BirthDate, BirthMoment, ClockTime, JulianDay, LocalTimePolicy, Meridiem};
pub use zodiac::{ChineseAnimal, ZodiacSign};

use lazy_static::lazy_static;

lazy_static! {
    static ref DEFAULT_ENGINE: ChartEngine = ChartEngine::default();
}

/// Compute a chart with the process-wide default engine: embedded catalog,
/// nearest-city timezones and the analytic ephemeris.
pub fn compute_chart(request: &ChartRequest) -> Result<ChartResult, ChartError> {
    DEFAULT_ENGINE.compute_chart(request)
}
