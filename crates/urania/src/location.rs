//! City/country text to coordinates and timezone.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ChartError;
use crate::gazetteer::{City, Country, Gazetteer};
use crate::time::{is_valid_timezone, UTC_ZONE};

const EARTH_RADIUS_KM: f64 = 6_371.0;
pub const DEFAULT_TIMEZONE_MAX_DISTANCE_KM: f64 = 300.0;

/// Jordan is always resolved to its own zone, whatever the coordinate
/// lookup says.
const JORDAN_CODE: &str = "JO";
const JORDAN_TIMEZONE: &str = "Asia/Amman";

/// (city, country, code, latitude, longitude, timezone)
const FALLBACK_LOCATIONS: &[(&str, &str, &str, f64, f64, &str)] = &[
    ("Amman", "Jordan", "JO", 31.95, 35.93, "Asia/Amman"),
    ("Riyadh", "Saudi Arabia", "SA", 24.71, 46.68, "Asia/Riyadh"),
    ("Dubai", "United Arab Emirates", "AE", 25.20, 55.27, "Asia/Dubai"),
    ("Cairo", "Egypt", "EG", 30.04, 31.24, "Africa/Cairo"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Catalog,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone_id: String,
    pub country_code: String,
    pub matched_name: String,
    pub source: LocationSource,
}

/// Maps coordinates to an IANA zone id.
pub trait TimezoneLookup: Send + Sync {
    fn timezone_at(&self, latitude: f64, longitude: f64) -> Option<String>;
}

/// Zone of the nearest catalog city within `max_distance_km`.
#[derive(Debug, Clone)]
pub struct NearestCityTimezones {
    gazetteer: Arc<Gazetteer>,
    max_distance_km: f64,
}

impl NearestCityTimezones {
    pub fn new(gazetteer: Arc<Gazetteer>, max_distance_km: f64) -> Self {
        Self {
            gazetteer,
            max_distance_km,
        }
    }
}

impl TimezoneLookup for NearestCityTimezones {
    fn timezone_at(&self, latitude: f64, longitude: f64) -> Option<String> {
        let mut nearest: Option<(&City, f64)> = None;
        for city in self.gazetteer.cities() {
            if city.timezone.is_empty() {
                continue;
            }
            let d = haversine_km(latitude, longitude, city.latitude, city.longitude);
            if d <= self.max_distance_km && nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((city, d));
            }
        }
        nearest.map(|(city, _)| city.timezone.clone())
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

pub struct LocationResolver {
    gazetteer: Arc<Gazetteer>,
    timezones: Arc<dyn TimezoneLookup>,
}

impl LocationResolver {
    pub fn new(gazetteer: Arc<Gazetteer>, timezones: Arc<dyn TimezoneLookup>) -> Self {
        Self {
            gazetteer,
            timezones,
        }
    }

    pub fn resolve(&self, city: &str, country: &str) -> Result<ResolvedLocation, ChartError> {
        let matched_country = self.gazetteer.find_country(country);

        if let Some(c) = matched_country {
            if let Some(found) = self.best_city(&c.code, city) {
                return Ok(self.from_catalog(found, c));
            }
        }

        if let Some(location) = fallback_location(city, country) {
            debug!("Using built-in coordinates for {city}, {country}");
            return Ok(location);
        }

        match matched_country {
            None => Err(ChartError::CountryNotFound {
                country: country.trim().to_string(),
            }),
            Some(c) => Err(ChartError::CityNotFound {
                city: city.trim().to_string(),
                country: c.name.clone(),
            }),
        }
    }

    /// Exact name matches first, then substring matches; the most populous
    /// wins and ties keep catalog order.
    fn best_city(&self, code: &str, query: &str) -> Option<&City> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        let exact = most_populous(
            self.gazetteer
                .cities_by_country(code)
                .filter(|c| c.name.to_lowercase() == query),
        );
        exact.or_else(|| {
            most_populous(
                self.gazetteer
                    .cities_by_country(code)
                    .filter(|c| c.name.to_lowercase().contains(&query)),
            )
        })
    }

    fn from_catalog(&self, city: &City, country: &Country) -> ResolvedLocation {
        let timezone_id = if country.code == JORDAN_CODE {
            JORDAN_TIMEZONE.to_string()
        } else {
            self.timezone_for(city)
        };
        debug!(
            "Resolved {} ({}) to {:.4}, {:.4} in {}",
            city.name, country.code, city.latitude, city.longitude, timezone_id
        );
        ResolvedLocation {
            latitude: city.latitude,
            longitude: city.longitude,
            timezone_id,
            country_code: country.code.clone(),
            matched_name: city.name.clone(),
            source: LocationSource::Catalog,
        }
    }

    fn timezone_for(&self, city: &City) -> String {
        match self.timezones.timezone_at(city.latitude, city.longitude) {
            Some(tz) if is_valid_timezone(&tz) => tz,
            Some(tz) => {
                warn!("Timezone {tz:?} for {} is not a known zone, using UTC", city.name);
                UTC_ZONE.to_string()
            }
            None => {
                warn!("No timezone found for {}, using UTC", city.name);
                UTC_ZONE.to_string()
            }
        }
    }
}

fn most_populous<'a>(cities: impl Iterator<Item = &'a City>) -> Option<&'a City> {
    cities.fold(None, |best: Option<&City>, c| match best {
        Some(b) if b.population >= c.population => Some(b),
        _ => Some(c),
    })
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn fallback_location(city: &str, country: &str) -> Option<ResolvedLocation> {
    let (city, country) = (title_case(city), title_case(country));
    FALLBACK_LOCATIONS
        .iter()
        .find(|(c, n, ..)| *c == city && *n == country)
        .map(|&(name, _, code, latitude, longitude, tz)| ResolvedLocation {
            latitude,
            longitude,
            timezone_id: tz.to_string(),
            country_code: code.to_string(),
            matched_name: name.to_string(),
            source: LocationSource::Fallback,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer;

    struct FixedZone(Option<&'static str>);

    impl TimezoneLookup for FixedZone {
        fn timezone_at(&self, _latitude: f64, _longitude: f64) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn resolver_with(zone: Option<&'static str>) -> LocationResolver {
        LocationResolver::new(gazetteer::shared(), Arc::new(FixedZone(zone)))
    }

    #[test]
    fn test_jordan_override_ignores_lookup() {
        let loc = resolver_with(Some("Asia/Jerusalem")).resolve("Amman", "Jordan").unwrap();
        assert_eq!(loc.timezone_id, "Asia/Amman");
        assert_eq!(loc.source, LocationSource::Catalog);
    }

    #[test]
    fn test_lookup_failure_falls_back_to_utc() {
        let loc = resolver_with(None).resolve("Paris", "France").unwrap();
        assert_eq!(loc.timezone_id, "UTC");
        let loc = resolver_with(Some("Not/AZone")).resolve("Paris", "France").unwrap();
        assert_eq!(loc.timezone_id, "UTC");
    }

    #[test]
    fn test_exact_match_beats_bigger_substring_match() {
        let g = Arc::new(
            Gazetteer::from_json(
                r#"[{"code": "US", "name": "United States"}]"#,
                r#"[
                {"name": "South Portland", "countrycode": "US", "latitude": 43.6, "longitude": -70.2, "population": 900000, "timezone": "America/New_York"},
                {"name": "Portland", "countrycode": "US", "latitude": 45.5, "longitude": -122.7, "population": 600000, "timezone": "America/Los_Angeles"}
            ]"#,
                0,
            )
            .unwrap(),
        );
        let resolver = LocationResolver::new(g, Arc::new(FixedZone(Some("America/Los_Angeles"))));
        let loc = resolver.resolve("portland", "united states").unwrap();
        assert_eq!(loc.matched_name, "Portland");
    }

    #[test]
    fn test_population_tie_keeps_catalog_order() {
        let g = Arc::new(
            Gazetteer::from_json(
                r#"[{"code": "US", "name": "United States"}]"#,
                r#"[
                {"name": "Springfield", "countrycode": "US", "latitude": 39.8, "longitude": -89.6, "population": 100000, "timezone": "America/Chicago"},
                {"name": "Springfield", "countrycode": "US", "latitude": 37.2, "longitude": -93.3, "population": 100000, "timezone": "America/Chicago"}
            ]"#,
                0,
            )
            .unwrap(),
        );
        let resolver = LocationResolver::new(g, Arc::new(FixedZone(Some("America/Chicago"))));
        let loc = resolver.resolve("Springfield", "US").unwrap();
        assert_eq!(loc.latitude, 39.8);
    }

    #[test]
    fn test_fallback_table_when_country_unknown_to_catalog() {
        let resolver = LocationResolver::new(
            Arc::new(Gazetteer::default()),
            Arc::new(FixedZone(None)),
        );
        let loc = resolver.resolve("riyadh", "saudi arabia").unwrap();
        assert_eq!(loc.source, LocationSource::Fallback);
        assert_eq!(loc.timezone_id, "Asia/Riyadh");
        assert_eq!(loc.country_code, "SA");
    }

    #[test]
    fn test_not_found_errors() {
        let resolver = resolver_with(Some("UTC"));
        assert!(matches!(
            resolver.resolve("Birnin Zana", "Wakanda"),
            Err(ChartError::CountryNotFound { .. })
        ));
        assert!(matches!(
            resolver.resolve("Atlantis", "Jordan"),
            Err(ChartError::CityNotFound { .. })
        ));
        assert!(matches!(
            resolver.resolve("  ", "Jordan"),
            Err(ChartError::CityNotFound { .. })
        ));
    }

    #[test]
    fn test_nearest_city_lookup() {
        let lookup = NearestCityTimezones::new(gazetteer::shared(), DEFAULT_TIMEZONE_MAX_DISTANCE_KM);
        assert_eq!(lookup.timezone_at(48.85, 2.35).as_deref(), Some("Europe/Paris"));
        // Middle of the South Pacific
        assert_eq!(lookup.timezone_at(-40.0, -130.0), None);
    }

    #[test]
    fn test_haversine() {
        // Amman to Riyadh is roughly 1320 km
        let d = haversine_km(31.95, 35.93, 24.71, 46.68);
        assert!((1250.0..1400.0).contains(&d), "{d}");
        assert_eq!(haversine_km(10.0, 10.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("united ARAB emirates"), "United Arab Emirates");
    }
}
