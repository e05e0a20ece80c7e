//! Coptic calendar (Era of the Martyrs).
//!
//! Twelve months of 30 days followed by the epagomenal month Nasie of 5
//! days, 6 in the year before a Julian leap year.

use super::{gregorian_to_jdn, jdn_to_gregorian, CalendarDate};

/// JDN of 1 Thout 1 AM (29 August 284, Julian).
pub const COPTIC_EPOCH_JDN: i64 = 1_825_030;

const MONTH_NAMES: [&str; 13] = [
    "Thout", "Paopi", "Hathor", "Koiak", "Tobi", "Meshir", "Paremhat", "Parmouti", "Pashons",
    "Paoni", "Epip", "Mesori", "Nasie",
];

pub fn is_leap_year(year: i32) -> bool {
    year.rem_euclid(4) == 3
}

pub fn coptic_to_jdn(year: i32, month: u32, day: u32) -> i64 {
    let y = year as i64;
    COPTIC_EPOCH_JDN - 1 + 365 * (y - 1) + y.div_euclid(4) + 30 * (month as i64 - 1) + day as i64
}

pub fn jdn_to_coptic(jdn: i64) -> CalendarDate {
    let year = (4 * (jdn - COPTIC_EPOCH_JDN) + 1463).div_euclid(1461) as i32;
    let month = ((jdn - coptic_to_jdn(year, 1, 1)).div_euclid(30) + 1) as u32;
    let day = (jdn + 1 - coptic_to_jdn(year, month, 1)) as u32;
    CalendarDate::new(year, month, day)
}

pub fn gregorian_to_coptic(year: i32, month: u32, day: u32) -> CalendarDate {
    jdn_to_coptic(gregorian_to_jdn(year, month, day))
}

pub fn coptic_to_gregorian(year: i32, month: u32, day: u32) -> CalendarDate {
    jdn_to_gregorian(coptic_to_jdn(year, month, day))
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month.clamp(1, 13) - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_dates() {
        assert_eq!(gregorian_to_coptic(2000, 1, 1), CalendarDate::new(1716, 4, 22));
        assert_eq!(gregorian_to_coptic(2023, 9, 12), CalendarDate::new(1740, 1, 1));
        // Nayrouz moves to 11 September after a Coptic leap year
        assert_eq!(gregorian_to_coptic(2024, 9, 11), CalendarDate::new(1741, 1, 1));
    }

    #[test]
    fn test_epagomenal_days() {
        assert!(is_leap_year(1739));
        assert_eq!(gregorian_to_coptic(2023, 9, 11), CalendarDate::new(1739, 13, 6));
        assert_eq!(coptic_to_gregorian(1740, 13, 5), CalendarDate::new(2024, 9, 10));
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(4), "Koiak");
        assert_eq!(month_name(13), "Nasie");
    }
}
