//! Gregorian date conversion into other calendar systems.
//!
//! Every conversion is a pure function over integers that goes through the
//! Julian Day Number (the integer day count whose day 0 starts at noon on
//! 1 January 4713 BC, proleptic Julian). Buddhist and Japanese era years are
//! plain year shifts and never renumber months or days.

pub mod coptic;
pub mod eras;
pub mod hebrew;
pub mod hijri;
pub mod indian;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ChartError;

pub use coptic::gregorian_to_coptic;
pub use eras::{buddhist_year, japanese_era, JapaneseEra, JapaneseEraYear};
pub use hebrew::gregorian_to_hebrew;
pub use hijri::gregorian_to_hijri;
pub use indian::gregorian_to_indian_civil;

/// A (year, month, day) triple in some calendar. Months start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for CalendarDate {
    /// Day-first, the way the dates are read back to users.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{}", self.day, self.month, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    /// Tabular Islamic calendar; may differ from Umm al-Qura by a day.
    Hijri,
    Hebrew,
    IndianCivil,
    Coptic,
}

pub type Converter = fn(i32, u32, u32) -> CalendarDate;

impl CalendarKind {
    pub const ALL: [CalendarKind; 4] = [
        CalendarKind::Hijri,
        CalendarKind::Hebrew,
        CalendarKind::IndianCivil,
        CalendarKind::Coptic,
    ];

    pub fn converter(self) -> Converter {
        match self {
            CalendarKind::Hijri => gregorian_to_hijri,
            CalendarKind::Hebrew => gregorian_to_hebrew,
            CalendarKind::IndianCivil => gregorian_to_indian_civil,
            CalendarKind::Coptic => gregorian_to_coptic,
        }
    }

    /// Month name in its usual English transliteration.
    pub fn month_name(self, date: &CalendarDate) -> &'static str {
        match self {
            CalendarKind::Hijri => hijri::month_name(date.month),
            CalendarKind::Hebrew => hebrew::month_name(date.year, date.month),
            CalendarKind::IndianCivil => indian::month_name(date.month),
            CalendarKind::Coptic => coptic::month_name(date.month),
        }
    }
}

/// Convert a valid Gregorian date into the requested calendar.
pub fn convert(kind: CalendarKind, year: i32, month: u32, day: u32) -> CalendarDate {
    (kind.converter())(year, month, day)
}

/// All the calendar renderings of one Gregorian date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSet {
    /// Tabular Hijri date, not Umm al-Qura.
    pub hijri: CalendarDate,
    pub hebrew: CalendarDate,
    pub indian_civil: CalendarDate,
    pub coptic: CalendarDate,
    pub buddhist_year: i32,
    pub japanese_era: JapaneseEraYear,
}

impl CalendarSet {
    pub fn from_gregorian(year: i32, month: u32, day: u32) -> Result<Self, ChartError> {
        if !is_valid_gregorian(year, month, day) {
            return Err(ChartError::invalid_date(
                format!("{day:02}/{month:02}/{year}"),
                "not a valid Gregorian date",
            ));
        }
        Ok(Self {
            hijri: convert(CalendarKind::Hijri, year, month, day),
            hebrew: convert(CalendarKind::Hebrew, year, month, day),
            indian_civil: convert(CalendarKind::IndianCivil, year, month, day),
            coptic: convert(CalendarKind::Coptic, year, month, day),
            buddhist_year: buddhist_year(year),
            japanese_era: japanese_era(year),
        })
    }

    pub fn get(&self, kind: CalendarKind) -> CalendarDate {
        match kind {
            CalendarKind::Hijri => self.hijri,
            CalendarKind::Hebrew => self.hebrew,
            CalendarKind::IndianCivil => self.indian_civil,
            CalendarKind::Coptic => self.coptic,
        }
    }
}

pub fn is_gregorian_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_gregorian_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_gregorian_leap(year) => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn is_valid_gregorian(year: i32, month: u32, day: u32) -> bool {
    (1..=12).contains(&month) && day >= 1 && day <= days_in_gregorian_month(year, month)
}

/// Julian Day Number of a proleptic Gregorian date (Fliegel & Van Flandern).
///
/// Valid for years after -4800. 2000-01-01 is 2451545.
pub fn gregorian_to_jdn(year: i32, month: u32, day: u32) -> i64 {
    let (y, m, d) = (year as i64, month as i64, day as i64);
    let a = (m - 14) / 12;
    (1461 * (y + 4800 + a)) / 4 + (367 * (m - 2 - 12 * a)) / 12
        - (3 * ((y + 4900 + a) / 100)) / 4
        + d
        - 32075
}

pub fn jdn_to_gregorian(jdn: i64) -> CalendarDate {
    let f = jdn + 1401 + (((4 * jdn + 274_277) / 146_097) * 3) / 4 - 38;
    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;
    let day = (h % 153) / 5 + 1;
    let month = ((h / 153) + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;
    CalendarDate::new(year as i32, month as u32, day as u32)
}

/// Ceiling division for a positive divisor.
pub(crate) fn ceil_div(a: i64, b: i64) -> i64 {
    -((-a).div_euclid(b))
}
