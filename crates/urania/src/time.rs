//! Birth time normalization: 12-hour clock to 24-hour, local wall time to
//! UTC, and UTC to Julian Day.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendars::{gregorian_to_jdn, is_valid_gregorian};
use crate::error::ChartError;

pub const UTC_ZONE: &str = "UTC";

/// Step used to walk back to the wall time just before a gap.
const GAP_STEP_MINUTES: i64 = 15;
/// Longest gap searched. Samoa skipped all of 2011-12-30.
const LONGEST_GAP_HOURS: i64 = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Accepts `AM`/`PM` in any case, with or without dots, and the Arabic
    /// morning/evening markers.
    pub fn parse(input: &str) -> Result<Self, ChartError> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| *c != '.')
            .collect::<String>()
            .to_lowercase();
        match cleaned.as_str() {
            "am" | "صباحًا" | "صباحا" | "ص" => Ok(Meridiem::Am),
            "pm" | "مساءً" | "مساء" | "م" => Ok(Meridiem::Pm),
            _ => Err(ChartError::invalid_time(input, "meridiem must be AM or PM")),
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meridiem::Am => f.write_str("AM"),
            Meridiem::Pm => f.write_str("PM"),
        }
    }
}

/// Convert a 12-hour clock hour to 24-hour form.
pub fn normalize_hour(hour12: u32, meridiem: Meridiem) -> Result<u32, ChartError> {
    if !(1..=12).contains(&hour12) {
        return Err(ChartError::invalid_time(
            format!("{hour12} {meridiem}"),
            "hour must be between 1 and 12",
        ));
    }
    Ok(match (meridiem, hour12) {
        (Meridiem::Pm, h) if h < 12 => h + 12,
        (Meridiem::Am, 12) => 0,
        (_, h) => h,
    })
}

/// Wall-clock birth time as entered: 12-hour clock plus AM/PM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour12: u32,
    pub minute: u32,
    pub meridiem: Meridiem,
}

impl ClockTime {
    pub fn new(hour12: u32, minute: u32, meridiem: Meridiem) -> Result<Self, ChartError> {
        let time = Self {
            hour12,
            minute,
            meridiem,
        };
        time.validate()?;
        Ok(time)
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        normalize_hour(self.hour12, self.meridiem)?;
        if self.minute > 59 {
            return Err(ChartError::invalid_time(
                self.to_string(),
                "minute must be between 0 and 59",
            ));
        }
        Ok(())
    }

    pub fn hour24(&self) -> Result<u32, ChartError> {
        normalize_hour(self.hour12, self.meridiem)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02} {}", self.hour12, self.minute, self.meridiem)
    }
}

/// Civil birth date in the proleptic Gregorian calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BirthDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl BirthDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, ChartError> {
        let date = Self { year, month, day };
        date.validate()?;
        Ok(date)
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if !is_valid_gregorian(self.year, self.month, self.day) {
            return Err(ChartError::invalid_date(
                self.to_string(),
                "not a valid Gregorian date",
            ));
        }
        Ok(())
    }

    /// Parse `DD/MM/YYYY`; `-` and `.` work as separators too.
    pub fn parse(input: &str) -> Result<Self, ChartError> {
        let parts: Vec<&str> = input.trim().split(['/', '-', '.']).collect();
        if parts.len() != 3 {
            return Err(ChartError::invalid_date(input, "expected DD/MM/YYYY"));
        }
        let field = |s: &str, name: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| ChartError::invalid_date(input, format!("{name} is not a number")))
        };
        let day = field(parts[0], "day")?;
        let month = field(parts[1], "month")?;
        let year = field(parts[2], "year")?;
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return Err(ChartError::invalid_date(input, "day or month out of range"));
        }
        if !(1..=9999).contains(&year) {
            return Err(ChartError::invalid_date(input, "year must be between 1 and 9999"));
        }
        Self::new(year as i32, month as u32, day as u32)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{}", self.day, self.month, self.year)
    }
}

/// Local birth moment with the hour already in 24-hour form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthMoment {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl BirthMoment {
    pub fn new(date: BirthDate, time: ClockTime) -> Result<Self, ChartError> {
        date.validate()?;
        time.validate()?;
        Ok(Self {
            year: date.year,
            month: date.month,
            day: date.day,
            hour: time.hour24()?,
            minute: time.minute,
        })
    }

    fn naive(&self) -> Result<NaiveDateTime, ChartError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_opt(self.hour, self.minute, 0))
            .ok_or_else(|| {
                ChartError::invalid_date(self.to_string(), "not representable as a date-time")
            })
    }
}

impl fmt::Display for BirthMoment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Julian Day in Universal Time. Integral at noon UT.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JulianDay(pub f64);

impl JulianDay {
    pub fn from_calendar(year: i32, month: u32, day: u32, hour_of_day: f64) -> Self {
        JulianDay(gregorian_to_jdn(year, month, day) as f64 - 0.5 + hour_of_day / 24.0)
    }

    pub fn from_utc(dt: &DateTime<Utc>) -> Self {
        let naive = dt.naive_utc();
        let hour_of_day = naive.hour() as f64
            + naive.minute() as f64 / 60.0
            + naive.second() as f64 / 3600.0;
        let date = naive.date();
        Self::from_calendar(date.year(), date.month(), date.day(), hour_of_day)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// How local-time ambiguity around DST transitions is settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalTimePolicy {
    /// Take the later instant: the second occurrence of a repeated wall time,
    /// and for a skipped wall time the pre-transition offset (which lands
    /// after the gap).
    #[default]
    PreferLater,
    /// Refuse ambiguous or skipped wall times.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalTimeResolution {
    Unique,
    Ambiguous,
    Skipped,
}

/// A local birth moment pinned to UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalInstant {
    pub utc: DateTime<Utc>,
    pub julian_day: JulianDay,
    pub timezone: String,
    pub resolution: LocalTimeResolution,
}

/// Parse an IANA zone id, falling back to UTC when it is unknown.
pub fn parse_timezone_or_utc(timezone_id: &str) -> Tz {
    match timezone_id.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            warn!("Unknown timezone {timezone_id:?}, using UTC");
            Tz::UTC
        }
    }
}

pub fn is_valid_timezone(timezone_id: &str) -> bool {
    timezone_id.parse::<Tz>().is_ok()
}

/// Convert a local birth moment in `timezone_id` to UTC and its Julian Day.
pub fn to_julian_day(
    moment: &BirthMoment,
    timezone_id: &str,
    policy: LocalTimePolicy,
) -> Result<LocalInstant, ChartError> {
    let tz = parse_timezone_or_utc(timezone_id);
    let naive = moment.naive()?;
    let (utc, resolution) = localize(&tz, naive, policy)?;

    Ok(LocalInstant {
        julian_day: JulianDay::from_utc(&utc),
        utc,
        timezone: tz.name().to_string(),
        resolution,
    })
}

fn localize(
    tz: &Tz,
    naive: NaiveDateTime,
    policy: LocalTimePolicy,
) -> Result<(DateTime<Utc>, LocalTimeResolution), ChartError> {
    let unresolvable = || ChartError::AmbiguousOrInvalidLocalTime {
        local: naive.format("%Y-%m-%d %H:%M").to_string(),
        timezone: tz.name().to_string(),
    };

    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok((dt.with_timezone(&Utc), LocalTimeResolution::Unique)),
        chrono::LocalResult::Ambiguous(first, second) => match policy {
            LocalTimePolicy::Strict => Err(unresolvable()),
            LocalTimePolicy::PreferLater => {
                let later = first.max(second).with_timezone(&Utc);
                warn!("Local time {naive} is repeated in {}, using {later}", tz.name());
                Ok((later, LocalTimeResolution::Ambiguous))
            }
        },
        chrono::LocalResult::None => match policy {
            LocalTimePolicy::Strict => Err(unresolvable()),
            LocalTimePolicy::PreferLater => {
                let offset = offset_before_gap(tz, naive).ok_or_else(unresolvable)?;
                let utc_naive = naive - Duration::seconds(offset.local_minus_utc() as i64);
                let utc = Utc.from_utc_datetime(&utc_naive);
                warn!("Local time {naive} is skipped in {}, using {utc}", tz.name());
                Ok((utc, LocalTimeResolution::Skipped))
            }
        },
    }
}

/// Offset in force at the last valid wall time before `naive`.
fn offset_before_gap(tz: &Tz, naive: NaiveDateTime) -> Option<chrono::FixedOffset> {
    let steps = LONGEST_GAP_HOURS * 60 / GAP_STEP_MINUTES;
    (1..=steps).find_map(|step| {
        let earlier = naive - Duration::minutes(step * GAP_STEP_MINUTES);
        tz.offset_from_local_datetime(&earlier).latest().map(|offset| offset.fix())
    })
}
