//! Indian national (Saka) calendar.
//!
//! The year starts on 1 Chaitra, which falls on 22 March, or 21 March in
//! Gregorian leap years. Chaitra has 30 days (31 in those leap years), the
//! next five months 31 and the last six 30. Saka years trail the Gregorian
//! year by 78 from Chaitra onward and by 79 before it.

use super::{gregorian_to_jdn, is_gregorian_leap, jdn_to_gregorian, CalendarDate};

pub const SAKA_OFFSET: i32 = 78;

const MONTH_NAMES: [&str; 12] = [
    "Chaitra",
    "Vaishakha",
    "Jyaishtha",
    "Ashadha",
    "Shravana",
    "Bhadra",
    "Ashvin",
    "Kartika",
    "Agrahayana",
    "Pausha",
    "Magha",
    "Phalguna",
];

/// JDN of 1 Chaitra in the given Gregorian year.
fn chaitra_first_jdn(gregorian_year: i32) -> i64 {
    let day = if is_gregorian_leap(gregorian_year) { 21 } else { 22 };
    gregorian_to_jdn(gregorian_year, 3, day)
}

fn month_lengths(saka_year: i32) -> [u32; 12] {
    let chaitra = if is_gregorian_leap(saka_year + SAKA_OFFSET) {
        31
    } else {
        30
    };
    [chaitra, 31, 31, 31, 31, 31, 30, 30, 30, 30, 30, 30]
}

pub fn gregorian_to_indian_civil(year: i32, month: u32, day: u32) -> CalendarDate {
    let jdn = gregorian_to_jdn(year, month, day);
    let start_year = if jdn < chaitra_first_jdn(year) {
        year - 1
    } else {
        year
    };
    let saka_year = start_year - SAKA_OFFSET;

    let mut offset = jdn - chaitra_first_jdn(start_year);
    let mut saka_month = 1;
    for len in month_lengths(saka_year) {
        if offset < len as i64 {
            break;
        }
        offset -= len as i64;
        saka_month += 1;
    }
    CalendarDate::new(saka_year, saka_month, offset as u32 + 1)
}

pub fn indian_civil_to_gregorian(year: i32, month: u32, day: u32) -> CalendarDate {
    let preceding: i64 = month_lengths(year)
        .iter()
        .take(month.saturating_sub(1) as usize)
        .map(|len| *len as i64)
        .sum();
    let jdn = chaitra_first_jdn(year + SAKA_OFFSET) + preceding + day as i64 - 1;
    jdn_to_gregorian(jdn)
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month.clamp(1, 12) - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_dates() {
        assert_eq!(gregorian_to_indian_civil(2000, 1, 1), CalendarDate::new(1921, 10, 11));
        assert_eq!(gregorian_to_indian_civil(2000, 3, 21), CalendarDate::new(1922, 1, 1));
        assert_eq!(gregorian_to_indian_civil(2023, 3, 22), CalendarDate::new(1945, 1, 1));
        assert_eq!(gregorian_to_indian_civil(2023, 3, 21), CalendarDate::new(1944, 12, 30));
    }

    #[test]
    fn test_inverse() {
        for year in [1999, 2000, 2023, 2024] {
            for month in 1..=12 {
                for day in [1, 15, 28] {
                    let s = gregorian_to_indian_civil(year, month, day);
                    assert_eq!(
                        indian_civil_to_gregorian(s.year, s.month, s.day),
                        CalendarDate::new(year, month, day)
                    );
                }
            }
        }
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(10), "Pausha");
    }
}
