//! Read-only country and city catalog.
//!
//! The default catalog is compiled in from `data/countries.json` and
//! `data/cities.json` (geonames-style records). At startup it can be replaced
//! by a combined JSON catalog file or by a directory holding the raw geonames
//! dumps (`countryInfo.txt` plus `cities15000.txt` or a larger city dump).
//! Either way the catalog is built once and never mutated afterwards.

mod loader;

use lazy_static::lazy_static;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub use loader::GazetteerError;

pub const DEFAULT_MIN_POPULATION: u64 = 15_000;

const EMBEDDED_COUNTRIES: &str = include_str!("../../data/countries.json");
const EMBEDDED_CITIES: &str = include_str!("../../data/cities.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(rename = "countrycode")]
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub population: u64,
    /// IANA zone id; empty when the source has none.
    #[serde(default)]
    pub timezone: String,
}

#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    countries: Vec<Country>,
    cities: Vec<City>,
}

lazy_static! {
    static ref GLOBAL: Arc<Gazetteer> = Arc::new(
        Gazetteer::embedded(DEFAULT_MIN_POPULATION).unwrap_or_else(|e| {
            error!("Embedded catalog failed to load: {e}");
            Gazetteer::default()
        })
    );
}

/// Process-wide catalog built from the embedded data.
pub fn global() -> &'static Gazetteer {
    GLOBAL.as_ref()
}

/// Shared handle to the process-wide catalog.
pub fn shared() -> Arc<Gazetteer> {
    Arc::clone(&GLOBAL)
}

impl Gazetteer {
    pub fn new(
        countries: Vec<Country>,
        cities: Vec<City>,
        min_population: u64,
    ) -> Result<Self, GazetteerError> {
        for country in &countries {
            loader::validate_country(country)?;
        }
        let mut kept = Vec::with_capacity(cities.len());
        for city in cities {
            loader::validate_city(&city)?;
            if city.population >= min_population {
                kept.push(city);
            }
        }
        Ok(Self {
            countries,
            cities: kept,
        })
    }

    pub fn from_json(
        countries_json: &str,
        cities_json: &str,
        min_population: u64,
    ) -> Result<Self, GazetteerError> {
        let countries = loader::parse_countries(countries_json)?;
        let cities = loader::parse_cities(cities_json)?;
        Self::new(countries, cities, min_population)
    }

    pub fn embedded(min_population: u64) -> Result<Self, GazetteerError> {
        let gazetteer = Self::from_json(EMBEDDED_COUNTRIES, EMBEDDED_CITIES, min_population)?;
        info!(
            "Loaded embedded catalog: {} countries, {} cities",
            gazetteer.countries.len(),
            gazetteer.cities.len()
        );
        Ok(gazetteer)
    }

    /// Build from the text of geonames `countryInfo.txt` and a city dump.
    pub fn from_geonames(
        country_info: &str,
        cities: &str,
        min_population: u64,
    ) -> Result<Self, GazetteerError> {
        let countries = loader::parse_geonames_countries(country_info)?;
        let cities = loader::parse_geonames_cities(cities)?;
        Self::new(countries, cities, min_population)
    }

    /// Load a combined `{"countries": [...], "cities": [...]}` file, or a
    /// directory of geonames dumps.
    pub fn load(path: &Path, min_population: u64) -> Result<Self, GazetteerError> {
        let gazetteer = if path.is_dir() {
            let city_dump = loader::find_city_dump(path)?;
            debug!("Reading geonames dumps from {}", path.display());
            Self::from_geonames(
                &loader::read_text(&path.join(loader::GEONAMES_COUNTRY_FILE))?,
                &loader::read_text(&city_dump)?,
                min_population,
            )?
        } else {
            let file = loader::read_catalog_file(path)?;
            Self::new(file.countries, file.cities, min_population)?
        };
        info!(
            "Loaded catalog {}: {} countries, {} cities",
            path.display(),
            gazetteer.countries.len(),
            gazetteer.cities.len()
        );
        Ok(gazetteer)
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Cities of one country, in catalog order.
    pub fn cities_by_country<'a>(&'a self, code: &str) -> impl Iterator<Item = &'a City> + 'a {
        let code = code.to_ascii_uppercase();
        self.cities
            .iter()
            .filter(move |c| c.country_code.eq_ignore_ascii_case(&code))
    }

    /// Country by name (case-insensitive, trimmed) or by ISO code.
    pub fn find_country(&self, query: &str) -> Option<&Country> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let lowered = query.to_lowercase();
        self.countries
            .iter()
            .find(|c| c.name.to_lowercase() == lowered)
            .or_else(|| {
                self.countries
                    .iter()
                    .find(|c| c.code.eq_ignore_ascii_case(query))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTRY_INFO: &str = "#ISO\tISO3\tISO-Numeric\tfips\tCountry\tCapital\n\
        JO\tJOR\t400\tJO\tJordan\tAmman\t92300\t9702353\tAS\t.jo\tJOD\n\
        IR\tIRN\t364\tIR\tIran\tTehran\t1648000\t81800269\tAS\t.ir\tIRR\n";

    const CITY_DUMP: &str = "250441\tAmman\tAmman\t\t31.95522\t35.94503\tP\tPPLC\tJO\t\t16\t\t\t\t1275857\t\t779\tAsia/Amman\t2019-10-14\n\
        250258\tSalt\tSalt\tAs Salt\t32.03917\t35.72722\tP\tPPLA\tJO\t\t02\t\t\t\t80189\t\t796\tAsia/Amman\t2019-10-14\n\
        250000\tTiny\tTiny\t\t32.0\t35.8\tP\tPPL\tJO\t\t02\t\t\t\t900\t\t700\tAsia/Amman\t2019-10-14\n\
        113646\tTabriz\tTabriz\t\t38.08\t46.2919\tP\tPPLA\tIR\t\t26\t\t\t\t1424641\t\t1364\tAsia/Tehran\t2022-01-01\n";

    #[test]
    fn test_embedded_catalog_loads() {
        let g = Gazetteer::embedded(DEFAULT_MIN_POPULATION).unwrap();
        assert!(g.countries().len() >= 240);
        assert!(g.cities().len() > 2000);
        assert!(g.cities_by_country("JO").any(|c| c.name == "Amman"));
    }

    #[test]
    fn test_embedded_catalog_has_every_country_with_cities() {
        let g = global();
        for code in ["AF", "SO", "PE", "KZ", "MN", "NP", "CD", "BO", "IS", "FJ"] {
            assert!(g.find_country(code).is_some(), "{code}");
            assert!(g.cities_by_country(code).next().is_some(), "{code}");
        }
        assert!(g.cities().iter().all(|c| !c.timezone.is_empty()));
    }

    #[test]
    fn test_geonames_dumps() {
        let g = Gazetteer::from_geonames(COUNTRY_INFO, CITY_DUMP, DEFAULT_MIN_POPULATION).unwrap();
        assert_eq!(g.countries().len(), 2);
        assert_eq!(g.find_country("iran").unwrap().code, "IR");
        let salt = g.cities_by_country("JO").find(|c| c.name == "Salt").unwrap();
        assert_eq!(salt.population, 80189);
        assert_eq!(salt.timezone, "Asia/Amman");
        assert!((salt.latitude - 32.03917).abs() < 1e-9);
        assert!(!g.cities().iter().any(|c| c.name == "Tiny"));
    }

    #[test]
    fn test_geonames_malformed_row() {
        let err = Gazetteer::from_geonames(COUNTRY_INFO, "1\tShort\tShort\n", 0).unwrap_err();
        assert!(matches!(err, GazetteerError::Malformed { line: 1, .. }));
        let bad_lat = CITY_DUMP.replacen("31.95522", "north", 1);
        let err = Gazetteer::from_geonames(COUNTRY_INFO, &bad_lat, 0).unwrap_err();
        assert!(matches!(err, GazetteerError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_load_geonames_directory() {
        let dir = std::env::temp_dir().join(format!("urania-geonames-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("countryInfo.txt"), COUNTRY_INFO).unwrap();
        assert!(matches!(
            Gazetteer::load(&dir, 0),
            Err(GazetteerError::Io { .. })
        ));
        std::fs::write(dir.join("cities15000.txt"), CITY_DUMP).unwrap();
        let g = Gazetteer::load(&dir, 0).unwrap();
        assert_eq!(g.cities().len(), 4);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_min_population_filter() {
        let all = Gazetteer::embedded(0).unwrap();
        let filtered = Gazetteer::embedded(DEFAULT_MIN_POPULATION).unwrap();
        assert!(all.cities().iter().any(|c| c.name == "Lord Howe Island"));
        assert!(!filtered.cities().iter().any(|c| c.name == "Lord Howe Island"));
    }

    #[test]
    fn test_find_country_by_name_and_code() {
        let g = global();
        assert_eq!(g.find_country("  jordan ").unwrap().code, "JO");
        assert_eq!(g.find_country("sa").unwrap().name, "Saudi Arabia");
        assert!(g.find_country("Wakanda").is_none());
        assert!(g.find_country("").is_none());
    }

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        let countries = r#"[{"code": "XX", "name": "Nowhere"}]"#;
        let cities = r#"[{"name": "Void", "countrycode": "XX", "latitude": 91.0,
            "longitude": 0.0, "population": 100000, "timezone": "UTC"}]"#;
        let err = Gazetteer::from_json(countries, cities, 0).unwrap_err();
        assert!(matches!(err, GazetteerError::ValidationError(_)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Gazetteer::from_json("[", "[]", 0),
            Err(GazetteerError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Gazetteer::load(Path::new("/nonexistent/catalog.json"), 0).unwrap_err();
        assert!(matches!(err, GazetteerError::Io { .. }));
    }
}
