//! Hebrew (Jewish) calendar.
//!
//! Lunisolar: a 19-year Metonic cycle with 7 leap years of 13 months, year
//! start driven by the molad of Tishrei and the postponement rules. Months
//! are numbered from Nisan = 1, so Tishrei (7) opens the year and Adar II is
//! month 13 in leap years. Years count Anno Mundi.

use super::{gregorian_to_jdn, CalendarDate};

/// JDN of 1 Tishrei AM 1 (7 October 3761 BC, proleptic Julian).
const HEBREW_EPOCH_JDN: i64 = 347_998;

const TISHREI: u32 = 7;

pub fn is_leap_year(year: i32) -> bool {
    (7 * year as i64 + 1).rem_euclid(19) < 7
}

pub fn months_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        13
    } else {
        12
    }
}

/// Days from the epoch to the molad of Tishrei of `year`, moved off
/// Sunday, Wednesday and Friday.
fn elapsed_days(year: i32) -> i64 {
    let y = year as i64;
    let months = (235 * y - 234).div_euclid(19);
    let parts = 12_084 + 13_753 * months;
    let mut day = months * 29 + parts.div_euclid(25_920);
    if (3 * (day + 1)).rem_euclid(7) < 3 {
        day += 1;
    }
    day
}

/// Postponement keeping year lengths within the legal set.
fn year_length_correction(year: i32) -> i64 {
    let last = elapsed_days(year - 1);
    let present = elapsed_days(year);
    let next = elapsed_days(year + 1);
    if next - present == 356 {
        2
    } else if present - last == 382 {
        1
    } else {
        0
    }
}

fn new_year_jdn(year: i32) -> i64 {
    HEBREW_EPOCH_JDN + elapsed_days(year) + year_length_correction(year)
}

/// 353–355 days in common years, 383–385 in leap years.
pub fn days_in_year(year: i32) -> i64 {
    new_year_jdn(year + 1) - new_year_jdn(year)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 | 4 | 6 | 10 | 13 => 29,
        12 if !is_leap_year(year) => 29,
        // Heshvan is long only in complete years
        8 if days_in_year(year) % 10 != 5 => 29,
        // Kislev is short only in deficient years
        9 if days_in_year(year) % 10 == 3 => 29,
        _ => 30,
    }
}

pub fn hebrew_to_jdn(year: i32, month: u32, day: u32) -> i64 {
    let mut jdn = new_year_jdn(year) + day as i64 - 1;
    if month < TISHREI {
        for m in TISHREI..=months_in_year(year) {
            jdn += days_in_month(year, m) as i64;
        }
        for m in 1..month {
            jdn += days_in_month(year, m) as i64;
        }
    } else {
        for m in TISHREI..month {
            jdn += days_in_month(year, m) as i64;
        }
    }
    jdn
}

pub fn jdn_to_hebrew(jdn: i64) -> CalendarDate {
    let approx = ((jdn - HEBREW_EPOCH_JDN) * 98_496).div_euclid(35_975_351) as i32;
    let mut year = approx - 1;
    while jdn >= new_year_jdn(year + 1) {
        year += 1;
    }

    let mut month = if jdn < hebrew_to_jdn(year, 1, 1) {
        TISHREI
    } else {
        1
    };
    while jdn > hebrew_to_jdn(year, month, days_in_month(year, month)) {
        month += 1;
    }
    let day = (jdn - hebrew_to_jdn(year, month, 1) + 1) as u32;
    CalendarDate::new(year, month, day)
}

pub fn gregorian_to_hebrew(year: i32, month: u32, day: u32) -> CalendarDate {
    jdn_to_hebrew(gregorian_to_jdn(year, month, day))
}

pub fn month_name(year: i32, month: u32) -> &'static str {
    match month {
        1 => "Nisan",
        2 => "Iyyar",
        3 => "Sivan",
        4 => "Tammuz",
        5 => "Av",
        6 => "Elul",
        7 => "Tishrei",
        8 => "Heshvan",
        9 => "Kislev",
        10 => "Tevet",
        11 => "Shevat",
        12 if is_leap_year(year) => "Adar I",
        12 => "Adar",
        13 => "Adar II",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_dates() {
        assert_eq!(gregorian_to_hebrew(2000, 1, 1), CalendarDate::new(5760, 10, 23));
        // Rosh Hashanah 5784
        assert_eq!(gregorian_to_hebrew(2023, 9, 16), CalendarDate::new(5784, 7, 1));
        // 1 Adar II 5784
        assert_eq!(gregorian_to_hebrew(2024, 3, 11), CalendarDate::new(5784, 13, 1));
        assert_eq!(gregorian_to_hebrew(2023, 9, 15), CalendarDate::new(5783, 6, 29));
    }

    #[test]
    fn test_year_lengths_are_legal() {
        for year in 5700..5850 {
            let len = days_in_year(year);
            if is_leap_year(year) {
                assert!((383..=385).contains(&len), "year {year} has {len} days");
            } else {
                assert!((353..=355).contains(&len), "year {year} has {len} days");
            }
        }
    }

    #[test]
    fn test_inverse() {
        let start = gregorian_to_jdn(1990, 1, 1);
        for jdn in start..start + 800 {
            let h = jdn_to_hebrew(jdn);
            assert_eq!(hebrew_to_jdn(h.year, h.month, h.day), jdn);
        }
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(5784, 12), "Adar I");
        assert_eq!(month_name(5783, 12), "Adar");
        assert_eq!(month_name(5784, 13), "Adar II");
    }

    #[test]
    fn test_month_name_out_of_range() {
        assert_eq!(month_name(5784, 0), "Unknown");
        assert_eq!(month_name(5784, 14), "Unknown");
        assert_eq!(month_name(5783, 14), "Unknown");
    }
}
