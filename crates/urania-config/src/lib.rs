use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use urania::ephemeris::{house_system_byte, DEFAULT_HOUSE_SYSTEM};
use urania::gazetteer::DEFAULT_MIN_POPULATION;
use urania::location::DEFAULT_TIMEZONE_MAX_DISTANCE_KM;
use urania::LocalTimePolicy;

/// Relative locations tried when no explicit config path is given.
pub const CONFIG_PATHS: [&str; 2] = ["configs/urania.toml", "../../configs/urania.toml"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Analytic,
    Swiss,
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "analytic" => Ok(ProviderKind::Analytic),
            "swiss" | "swisseph" => Ok(ProviderKind::Swiss),
            other => anyhow::bail!("Unknown ephemeris provider {other:?} (expected analytic or swiss)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSettings {
    pub provider: ProviderKind,
    pub path: Option<PathBuf>,
    pub house_system: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GazetteerSettings {
    pub path: Option<PathBuf>,
    pub min_population: u64,
    pub timezone_max_distance_km: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UraniaSettings {
    pub ephemeris: EphemerisSettings,
    pub gazetteer: GazetteerSettings,
    pub time_policy: LocalTimePolicy,
}

impl Default for UraniaSettings {
    fn default() -> Self {
        Self {
            ephemeris: EphemerisSettings {
                provider: ProviderKind::default(),
                path: None,
                house_system: DEFAULT_HOUSE_SYSTEM.to_string(),
            },
            gazetteer: GazetteerSettings {
                path: None,
                min_population: DEFAULT_MIN_POPULATION,
                timezone_max_distance_km: DEFAULT_TIMEZONE_MAX_DISTANCE_KM,
            },
            time_policy: LocalTimePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EphemerisToml {
    #[serde(default)]
    provider: Option<ProviderKind>,
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    house_system: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GazetteerToml {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    min_population: Option<u64>,
    #[serde(default)]
    timezone_max_distance_km: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeToml {
    #[serde(default)]
    policy: Option<LocalTimePolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    ephemeris: EphemerisToml,
    #[serde(default)]
    gazetteer: GazetteerToml,
    #[serde(default)]
    time: TimeToml,
}

/// First of [`CONFIG_PATHS`] that exists.
pub fn find_config_path() -> Option<PathBuf> {
    CONFIG_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Settings from `explicit`, else from the first of [`CONFIG_PATHS`] found,
/// else defaults. An explicit path that cannot be read is an error.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<UraniaSettings> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match find_config_path() {
            Some(p) => p,
            None => return Ok(UraniaSettings::default()),
        },
    };
    let text = fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", path.display()))?;
    parse_settings(&text)
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))
}

pub fn parse_settings(text: &str) -> anyhow::Result<UraniaSettings> {
    let root: RootConfigToml =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse urania.toml: {e}"))?;
    let defaults = UraniaSettings::default();

    let settings = UraniaSettings {
        ephemeris: EphemerisSettings {
            provider: root.ephemeris.provider.unwrap_or(defaults.ephemeris.provider),
            path: root.ephemeris.path,
            house_system: root
                .ephemeris
                .house_system
                .unwrap_or(defaults.ephemeris.house_system),
        },
        gazetteer: GazetteerSettings {
            path: root.gazetteer.path,
            min_population: root
                .gazetteer
                .min_population
                .unwrap_or(defaults.gazetteer.min_population),
            timezone_max_distance_km: root
                .gazetteer
                .timezone_max_distance_km
                .unwrap_or(defaults.gazetteer.timezone_max_distance_km),
        },
        time_policy: root.time.policy.unwrap_or(defaults.time_policy),
    };
    validate_settings(&settings)?;
    Ok(settings)
}

pub fn validate_settings(settings: &UraniaSettings) -> anyhow::Result<()> {
    house_system_byte(&settings.ephemeris.house_system)?;
    let km = settings.gazetteer.timezone_max_distance_km;
    if !km.is_finite() || km <= 0.0 {
        anyhow::bail!("gazetteer.timezone_max_distance_km must be positive, got {km}");
    }
    if let Some(path) = &settings.gazetteer.path {
        if !path.exists() {
            anyhow::bail!("gazetteer.path does not exist: {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings, UraniaSettings::default());
        assert_eq!(settings.ephemeris.provider, ProviderKind::Analytic);
        assert_eq!(settings.ephemeris.house_system, "placidus");
        assert_eq!(settings.gazetteer.min_population, 15_000);
        assert_eq!(settings.time_policy, LocalTimePolicy::PreferLater);
    }

    #[test]
    fn test_full_file() {
        let text = r#"
            [ephemeris]
            provider = "swiss"
            path = "/opt/ephe"
            house_system = "whole_sign"

            [gazetteer]
            min_population = 500
            timezone_max_distance_km = 120.5

            [time]
            policy = "strict"
        "#;
        let settings = parse_settings(text).unwrap();
        assert_eq!(settings.ephemeris.provider, ProviderKind::Swiss);
        assert_eq!(settings.ephemeris.path, Some(PathBuf::from("/opt/ephe")));
        assert_eq!(settings.ephemeris.house_system, "whole_sign");
        assert_eq!(settings.gazetteer.min_population, 500);
        assert_eq!(settings.gazetteer.timezone_max_distance_km, 120.5);
        assert_eq!(settings.time_policy, LocalTimePolicy::Strict);
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(parse_settings("[ephemeris]\nprovider = \"jpl\"").is_err());
        assert!(parse_settings("[time]\npolicy = \"prefer_earlier\"").is_err());
        assert!(parse_settings("[ephemeris]\nhouse_system = \"topocentric\"").is_err());
        assert!(parse_settings("[gazetteer]\ntimezone_max_distance_km = 0.0").is_err());
        assert!(parse_settings("[gazetteer]\npath = \"/nonexistent/catalog.json\"").is_err());
        assert!(parse_settings("[ephemeris]\nflavour = \"x\"").is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        assert!(load_settings(Some(Path::new("/nonexistent/urania.toml"))).is_err());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Swiss".parse::<ProviderKind>().unwrap(), ProviderKind::Swiss);
        assert_eq!("analytic".parse::<ProviderKind>().unwrap(), ProviderKind::Analytic);
        assert!("moon".parse::<ProviderKind>().is_err());
    }
}
