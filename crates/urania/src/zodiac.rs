//! Sign mapping for Western and Chinese zodiacs.
//!
//! Longitudes map onto the twelve 30° tropical signs starting at 0° Aries.
//! Sun signs come from the civil birth date through a fixed table of
//! conventional cutover days rather than from the Sun's computed longitude.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ChartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Air => "air",
            Element::Water => "water",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// Canonical order, Aries at 0°.
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    /// Fire, earth, air, water repeating from Aries.
    pub fn element(self) -> Element {
        match self.index() % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    /// Traditional (pre-modern) planetary ruler.
    pub fn ruler(self) -> &'static str {
        const TRADITIONAL_RULERS: [&str; 12] = [
            "mars",    // Aries
            "venus",   // Taurus
            "mercury", // Gemini
            "moon",    // Cancer
            "sun",     // Leo
            "mercury", // Virgo
            "venus",   // Libra
            "mars",    // Scorpio
            "jupiter", // Sagittarius
            "saturn",  // Capricorn
            "saturn",  // Aquarius
            "jupiter", // Pisces
        ];
        TRADITIONAL_RULERS[self.index()]
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChineseAnimal {
    Rat,
    Ox,
    Tiger,
    Rabbit,
    Dragon,
    Snake,
    Horse,
    Goat,
    Monkey,
    Rooster,
    Dog,
    Pig,
}

impl ChineseAnimal {
    pub const ALL: [ChineseAnimal; 12] = [
        ChineseAnimal::Rat,
        ChineseAnimal::Ox,
        ChineseAnimal::Tiger,
        ChineseAnimal::Rabbit,
        ChineseAnimal::Dragon,
        ChineseAnimal::Snake,
        ChineseAnimal::Horse,
        ChineseAnimal::Goat,
        ChineseAnimal::Monkey,
        ChineseAnimal::Rooster,
        ChineseAnimal::Dog,
        ChineseAnimal::Pig,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChineseAnimal::Rat => "Rat",
            ChineseAnimal::Ox => "Ox",
            ChineseAnimal::Tiger => "Tiger",
            ChineseAnimal::Rabbit => "Rabbit",
            ChineseAnimal::Dragon => "Dragon",
            ChineseAnimal::Snake => "Snake",
            ChineseAnimal::Horse => "Horse",
            ChineseAnimal::Goat => "Goat",
            ChineseAnimal::Monkey => "Monkey",
            ChineseAnimal::Rooster => "Rooster",
            ChineseAnimal::Dog => "Dog",
            ChineseAnimal::Pig => "Pig",
        }
    }
}

impl fmt::Display for ChineseAnimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sign entering in each month and the day it enters.
///
/// Slot `m` (1..=12) belongs to month `m`; slot 0 is the December sign
/// carried into early January.
const SUN_SIGN_CUTOVERS: [(ZodiacSign, u32); 13] = [
    (ZodiacSign::Capricorn, 31),
    (ZodiacSign::Aquarius, 20),
    (ZodiacSign::Pisces, 19),
    (ZodiacSign::Aries, 20),
    (ZodiacSign::Taurus, 20),
    (ZodiacSign::Gemini, 21),
    (ZodiacSign::Cancer, 21),
    (ZodiacSign::Leo, 22),
    (ZodiacSign::Virgo, 23),
    (ZodiacSign::Libra, 23),
    (ZodiacSign::Scorpio, 23),
    (ZodiacSign::Sagittarius, 22),
    (ZodiacSign::Capricorn, 22),
];

/// Wrap any longitude into [0, 360).
pub fn normalize_degrees(longitude: f64) -> f64 {
    let wrapped = longitude.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn degree_to_sign(longitude: f64) -> ZodiacSign {
    let index = (normalize_degrees(longitude) / 30.0).floor() as usize;
    ZodiacSign::from_index(index)
}

/// Degrees travelled inside the current sign, in [0, 30).
pub fn degree_in_sign(longitude: f64) -> f64 {
    normalize_degrees(longitude) % 30.0
}

pub fn sun_sign_from_date(day: u32, month: u32) -> Result<ZodiacSign, ChartError> {
    if !(1..=12).contains(&month) {
        return Err(ChartError::invalid_date(
            format!("{day:02}/{month:02}"),
            "month must be between 1 and 12",
        ));
    }
    if !(1..=31).contains(&day) {
        return Err(ChartError::invalid_date(
            format!("{day:02}/{month:02}"),
            "day must be between 1 and 31",
        ));
    }

    let slot = month as usize;
    let (sign, cutover) = SUN_SIGN_CUTOVERS[slot];
    if day >= cutover {
        Ok(sign)
    } else {
        Ok(SUN_SIGN_CUTOVERS[slot - 1].0)
    }
}

/// Gregorian year of a Rat year (1984, 1996, 2008, 2020, ...).
const RAT_YEAR_ANCHOR: i32 = 4;

/// Animal of the Gregorian year. The lunar new year boundary is ignored,
/// so January births before the festival get the new year's animal.
pub fn chinese_animal(year: i32) -> ChineseAnimal {
    ChineseAnimal::ALL[(year - RAT_YEAR_ANCHOR).rem_euclid(12) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_to_sign_boundaries() {
        assert_eq!(degree_to_sign(0.0), ZodiacSign::Aries);
        assert_eq!(degree_to_sign(29.999), ZodiacSign::Aries);
        assert_eq!(degree_to_sign(30.0), ZodiacSign::Taurus);
        assert_eq!(degree_to_sign(359.99), ZodiacSign::Pisces);
        assert_eq!(degree_to_sign(360.0), ZodiacSign::Aries);
        assert_eq!(degree_to_sign(-1.0), ZodiacSign::Pisces);
        assert_eq!(degree_to_sign(-1e-18), ZodiacSign::Aries);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-30.0), 330.0);
        assert!(normalize_degrees(-1e-18) < 360.0);
    }

    #[test]
    fn test_sun_sign_cutovers() {
        assert_eq!(sun_sign_from_date(19, 1).unwrap(), ZodiacSign::Capricorn);
        assert_eq!(sun_sign_from_date(20, 1).unwrap(), ZodiacSign::Aquarius);
        assert_eq!(sun_sign_from_date(18, 2).unwrap(), ZodiacSign::Aquarius);
        assert_eq!(sun_sign_from_date(19, 2).unwrap(), ZodiacSign::Pisces);
        assert_eq!(sun_sign_from_date(21, 3).unwrap(), ZodiacSign::Aries);
        assert_eq!(sun_sign_from_date(21, 12).unwrap(), ZodiacSign::Sagittarius);
        assert_eq!(sun_sign_from_date(22, 12).unwrap(), ZodiacSign::Capricorn);
        assert_eq!(sun_sign_from_date(31, 12).unwrap(), ZodiacSign::Capricorn);
    }

    #[test]
    fn test_sun_sign_rejects_bad_month() {
        assert!(sun_sign_from_date(1, 13).is_err());
        assert!(sun_sign_from_date(0, 5).is_err());
    }

    #[test]
    fn test_chinese_animal_anchor() {
        assert_eq!(chinese_animal(1990), ChineseAnimal::Horse);
        assert_eq!(chinese_animal(2020), ChineseAnimal::Rat);
        assert_eq!(chinese_animal(1984), ChineseAnimal::Rat);
        assert_eq!(chinese_animal(1983), ChineseAnimal::Pig);
        assert_eq!(chinese_animal(-2), ChineseAnimal::Horse);
    }

    #[test]
    fn test_sign_metadata() {
        assert_eq!(ZodiacSign::Leo.element(), Element::Fire);
        assert_eq!(ZodiacSign::Pisces.element(), Element::Water);
        assert_eq!(ZodiacSign::Scorpio.ruler(), "mars");
    }
}
