//! Tabular Islamic (Hijri) calendar.
//!
//! Arithmetic civil variant: 30-year cycle with leap years 2, 5, 7, 10, 13,
//! 16, 18, 21, 24, 26 and 29, odd months of 30 days, even months of 29 and
//! Dhu al-Hijjah of 30 in leap years. Observational calendars (Umm al-Qura,
//! local moon sighting) can differ from it by a day or two.

use super::{ceil_div, gregorian_to_jdn, jdn_to_gregorian, CalendarDate};

/// JDN of 1 Muharram 1 AH (16 July 622, Julian).
pub const HIJRI_EPOCH_JDN: i64 = 1_948_440;

const MONTH_NAMES: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi al-Awwal",
    "Rabi al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Shaban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qadah",
    "Dhu al-Hijjah",
];

pub fn is_leap_year(year: i32) -> bool {
    (14 + 11 * year as i64).rem_euclid(30) < 11
}

pub fn hijri_to_jdn(year: i32, month: u32, day: u32) -> i64 {
    let (y, m, d) = (year as i64, month as i64, day as i64);
    d + ceil_div(59 * (m - 1), 2) + (y - 1) * 354 + (3 + 11 * y).div_euclid(30) + HIJRI_EPOCH_JDN - 1
}

pub fn jdn_to_hijri(jdn: i64) -> CalendarDate {
    let year = (30 * (jdn - HIJRI_EPOCH_JDN) + 10646).div_euclid(10631) as i32;
    let into_year = jdn - (29 + hijri_to_jdn(year, 1, 1));
    let month = (ceil_div(2 * into_year, 59) + 1).min(12) as u32;
    let day = (jdn - hijri_to_jdn(year, month, 1) + 1) as u32;
    CalendarDate::new(year, month, day)
}

/// Hijri date of a Gregorian date, by the tabular calendar.
///
/// This is not the Umm al-Qura calendar used officially in Saudi Arabia, nor
/// a sighting-based local calendar. Either may put the date a day (rarely
/// two) away from the result here.
///
/// ```
/// use urania::calendars::{gregorian_to_hijri, CalendarDate};
///
/// assert_eq!(gregorian_to_hijri(2000, 1, 1), CalendarDate::new(1420, 9, 24));
/// ```
pub fn gregorian_to_hijri(year: i32, month: u32, day: u32) -> CalendarDate {
    jdn_to_hijri(gregorian_to_jdn(year, month, day))
}

pub fn hijri_to_gregorian(year: i32, month: u32, day: u32) -> CalendarDate {
    jdn_to_gregorian(hijri_to_jdn(year, month, day))
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month.clamp(1, 12) - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_dates() {
        assert_eq!(gregorian_to_hijri(2000, 1, 1), CalendarDate::new(1420, 9, 24));
        // 1 Ramadan 1445
        assert_eq!(gregorian_to_hijri(2024, 3, 11), CalendarDate::new(1445, 9, 1));
        assert_eq!(gregorian_to_hijri(1990, 5, 15), CalendarDate::new(1410, 10, 19));
    }

    #[test]
    fn test_epoch() {
        assert_eq!(jdn_to_hijri(HIJRI_EPOCH_JDN), CalendarDate::new(1, 1, 1));
    }

    #[test]
    fn test_leap_cycle() {
        let leaps: Vec<i32> = (1..=30).filter(|y| is_leap_year(*y)).collect();
        assert_eq!(leaps, vec![2, 5, 7, 10, 13, 16, 18, 21, 24, 26, 29]);
    }

    #[test]
    fn test_inverse() {
        assert_eq!(hijri_to_gregorian(1420, 9, 24), CalendarDate::new(2000, 1, 1));
        for jdn in 2_400_000..2_400_800 {
            let h = jdn_to_hijri(jdn);
            assert_eq!(hijri_to_jdn(h.year, h.month, h.day), jdn);
        }
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(9), "Ramadan");
    }
}
