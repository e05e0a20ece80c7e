use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{City, Country};

/// Errors that can occur when loading a catalog
#[derive(Error, Debug)]
pub enum GazetteerError {
    #[error("Failed to read catalog {path}: {message}")]
    Io { path: String, message: String },
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Malformed geonames record at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

pub(crate) const GEONAMES_COUNTRY_FILE: &str = "countryInfo.txt";

/// Geonames city dumps, most selective first.
pub(crate) const GEONAMES_CITY_FILES: [&str; 4] = [
    "cities15000.txt",
    "cities5000.txt",
    "cities1000.txt",
    "cities500.txt",
];

// Column positions in the geonames `geoname` table
const COL_NAME: usize = 1;
const COL_LATITUDE: usize = 4;
const COL_LONGITUDE: usize = 5;
const COL_COUNTRY_CODE: usize = 8;
const COL_POPULATION: usize = 14;
const COL_TIMEZONE: usize = 17;

/// Combined on-disk catalog: `{"countries": [...], "cities": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogFile {
    pub countries: Vec<Country>,
    pub cities: Vec<City>,
}

pub(crate) fn parse_countries(json: &str) -> Result<Vec<Country>, GazetteerError> {
    serde_json::from_str(json).map_err(|e| GazetteerError::InvalidJson(e.to_string()))
}

pub(crate) fn parse_cities(json: &str) -> Result<Vec<City>, GazetteerError> {
    serde_json::from_str(json).map_err(|e| GazetteerError::InvalidJson(e.to_string()))
}

pub(crate) fn read_text(path: &Path) -> Result<String, GazetteerError> {
    fs::read_to_string(path).map_err(|e| GazetteerError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn read_catalog_file(path: &Path) -> Result<CatalogFile, GazetteerError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| GazetteerError::InvalidJson(e.to_string()))
}

/// First geonames city dump present in `dir`.
pub(crate) fn find_city_dump(dir: &Path) -> Result<PathBuf, GazetteerError> {
    GEONAMES_CITY_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| GazetteerError::Io {
            path: dir.display().to_string(),
            message: format!("none of {} found", GEONAMES_CITY_FILES.join(", ")),
        })
}

fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn field<'a>(fields: &[&'a str], index: usize, line: usize) -> Result<&'a str, GazetteerError> {
    fields.get(index).copied().ok_or_else(|| GazetteerError::Malformed {
        line,
        message: format!("expected at least {} columns, got {}", index + 1, fields.len()),
    })
}

fn number<T: std::str::FromStr>(raw: &str, what: &str, line: usize) -> Result<T, GazetteerError> {
    raw.trim().parse().map_err(|_| GazetteerError::Malformed {
        line,
        message: format!("{what} {raw:?} is not a number"),
    })
}

/// Parse geonames `countryInfo.txt` (ISO code in column 0, name in column 4).
pub(crate) fn parse_geonames_countries(text: &str) -> Result<Vec<Country>, GazetteerError> {
    data_lines(text)
        .map(|(line, row)| {
            let fields: Vec<&str> = row.split('\t').collect();
            Ok(Country {
                code: field(&fields, 0, line)?.trim().to_string(),
                name: field(&fields, 4, line)?.trim().to_string(),
            })
        })
        .collect()
}

/// Parse a geonames `citiesNNN.txt` dump.
pub(crate) fn parse_geonames_cities(text: &str) -> Result<Vec<City>, GazetteerError> {
    data_lines(text)
        .map(|(line, row)| {
            let fields: Vec<&str> = row.split('\t').collect();
            let population = match field(&fields, COL_POPULATION, line)?.trim() {
                "" => 0,
                raw => number(raw, "population", line)?,
            };
            Ok(City {
                name: field(&fields, COL_NAME, line)?.trim().to_string(),
                country_code: field(&fields, COL_COUNTRY_CODE, line)?.trim().to_string(),
                latitude: number(field(&fields, COL_LATITUDE, line)?, "latitude", line)?,
                longitude: number(field(&fields, COL_LONGITUDE, line)?, "longitude", line)?,
                population,
                timezone: fields
                    .get(COL_TIMEZONE)
                    .map(|tz| tz.trim().to_string())
                    .unwrap_or_default(),
            })
        })
        .collect()
}

pub(crate) fn validate_country(country: &Country) -> Result<(), GazetteerError> {
    if country.code.len() != 2 || !country.code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(GazetteerError::ValidationError(format!(
            "country code {:?} must be two uppercase letters",
            country.code
        )));
    }
    if country.name.trim().is_empty() {
        return Err(GazetteerError::ValidationError(format!(
            "country {} has an empty name",
            country.code
        )));
    }
    Ok(())
}

pub(crate) fn validate_city(city: &City) -> Result<(), GazetteerError> {
    if city.name.trim().is_empty() {
        return Err(GazetteerError::ValidationError(
            "city name must be non-empty".to_string(),
        ));
    }
    if !(-90.0..=90.0).contains(&city.latitude) || !(-180.0..=180.0).contains(&city.longitude) {
        return Err(GazetteerError::ValidationError(format!(
            "{} has coordinates out of range ({}, {})",
            city.name, city.latitude, city.longitude
        )));
    }
    Ok(())
}
