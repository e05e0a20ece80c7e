//! Year-only era shifts: Buddhist Era and Japanese imperial eras.
//!
//! Both work on the Gregorian year alone. Era changes that happen mid-year
//! (Heisei began 8 January 1989, Reiwa on 1 May 2019) are applied from 1
//! January of that year.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset of the Thai/Sri Lankan Buddhist Era from the Common Era.
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

pub fn buddhist_year(year: i32) -> i32 {
    year + BUDDHIST_ERA_OFFSET
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JapaneseEra {
    Showa,
    Heisei,
    Reiwa,
}

impl JapaneseEra {
    pub fn start_year(self) -> i32 {
        match self {
            JapaneseEra::Showa => 1926,
            JapaneseEra::Heisei => 1989,
            JapaneseEra::Reiwa => 2019,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            JapaneseEra::Showa => "Shōwa",
            JapaneseEra::Heisei => "Heisei",
            JapaneseEra::Reiwa => "Reiwa",
        }
    }
}

impl fmt::Display for JapaneseEra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JapaneseEraYear {
    pub era: JapaneseEra,
    pub year: i32,
}

impl fmt::Display for JapaneseEraYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.era, self.year)
    }
}

/// Every year before Heisei falls into Shōwa, so years before 1926 come out
/// as zero or negative Shōwa years rather than Taishō or Meiji.
pub fn japanese_era(year: i32) -> JapaneseEraYear {
    let era = if year >= JapaneseEra::Reiwa.start_year() {
        JapaneseEra::Reiwa
    } else if year >= JapaneseEra::Heisei.start_year() {
        JapaneseEra::Heisei
    } else {
        JapaneseEra::Showa
    };
    JapaneseEraYear {
        era,
        year: year - era.start_year() + 1,
    }
}
