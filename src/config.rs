//! Engine configuration.
//!
//! Loaded from a TOML file given explicitly, or from the path in
//! `SOLALENDAR_CONFIG`; with neither, every field takes its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::temporal::{DayCountMode, DEFAULT_REFERENCE_OFFSET_HOURS};
use crate::Location;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Location used when a caller gives no coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationDefaults {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// IANA timezone identifier.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_latitude() -> f64 {
    Location::tokyo().latitude
}

fn default_longitude() -> f64 {
    Location::tokyo().longitude
}

fn default_timezone() -> String {
    "Asia/Tokyo".to_string()
}

impl Default for LocationDefaults {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

impl LocationDefaults {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub location: LocationDefaults,

    /// How the layer-0 day count treats the birth timezone.
    #[serde(default)]
    pub day_count: DayCountMode,

    /// Hours subtracted from civil time in `fixed_offset` mode.
    #[serde(default = "default_reference_offset_hours")]
    pub reference_offset_hours: f64,
}

fn default_reference_offset_hours() -> f64 {
    DEFAULT_REFERENCE_OFFSET_HOURS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            location: LocationDefaults::default(),
            day_count: DayCountMode::default(),
            reference_offset_hours: default_reference_offset_hours(),
        }
    }
}

impl EngineConfig {
    pub const ENV_CONFIG_PATH: &'static str = "SOLALENDAR_CONFIG";

    /// Explicit path first, then `SOLALENDAR_CONFIG`, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match std::env::var_os(Self::ENV_CONFIG_PATH) {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => {
                debug!("no config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let offset = self.reference_offset_hours;
        if !offset.is_finite() || !(-14.0..=14.0).contains(&offset) {
            return Err(ConfigError::Invalid(format!(
                "reference_offset_hours {offset} is outside -14..=14"
            )));
        }
        let LocationDefaults { latitude, longitude, timezone } = &self.location;
        if !latitude.is_finite() || !(-90.0..=90.0).contains(latitude) {
            return Err(ConfigError::Invalid(format!("location.latitude {latitude} is outside -90..=90")));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(longitude) {
            return Err(ConfigError::Invalid(format!(
                "location.longitude {longitude} is outside -180..=180"
            )));
        }
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::Invalid(format!("location.timezone {timezone:?} is not an IANA zone")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.day_count, DayCountMode::FixedOffset);
        assert_eq!(config.reference_offset_hours, 9.0);
        assert_eq!(config.location.timezone, "Asia/Tokyo");
        assert_eq!(config.location.location(), Location::tokyo());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_parse_full_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            day_count = "resolved"
            reference_offset_hours = 8.0

            [location]
            latitude = 40.7128
            longitude = -74.006
            timezone = "America/New_York"
            "#,
        )
        .unwrap();
        assert_eq!(config.day_count, DayCountMode::Resolved);
        assert_eq!(config.reference_offset_hours, 8.0);
        assert_eq!(config.location.location(), Location::new_york());
        assert_eq!(config.location.timezone, "America/New_York");
    }

    #[test]
    fn test_partial_location_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str("[location]\ntimezone = \"Asia/Seoul\"\n").unwrap();
        assert_eq!(config.location.timezone, "Asia/Seoul");
        assert_eq!(config.location.latitude, 35.6895);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_values() {
        assert!(matches!(EngineConfig::from_toml_str("colour = 1"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            EngineConfig::from_toml_str("day_count = \"lunar\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("reference_offset_hours = 15.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[location]\nlatitude = 95.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[location]\ntimezone = \"Nowhere/Atlantis\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "day_count = \"resolved\"").unwrap();
        let config = EngineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.day_count, DayCountMode::Resolved);
    }

    #[test]
    fn test_load_falls_back_to_env_then_defaults() {
        // One test only: the variable is process-global.
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "reference_offset_hours = 8.0").unwrap();

        let mut explicit = NamedTempFile::new().unwrap();
        writeln!(explicit, "day_count = \"resolved\"").unwrap();

        std::env::set_var(EngineConfig::ENV_CONFIG_PATH, file.path());
        let from_env = EngineConfig::load(None);
        let from_explicit = EngineConfig::load(Some(explicit.path()));

        std::env::set_var(EngineConfig::ENV_CONFIG_PATH, "");
        let from_empty = EngineConfig::load(None);

        std::env::remove_var(EngineConfig::ENV_CONFIG_PATH);
        let from_unset = EngineConfig::load(None);

        assert_eq!(from_env.unwrap().reference_offset_hours, 8.0);
        let from_explicit = from_explicit.unwrap();
        assert_eq!(from_explicit.day_count, DayCountMode::Resolved);
        assert_eq!(from_explicit.reference_offset_hours, 9.0);
        assert_eq!(from_empty.unwrap(), EngineConfig::default());
        assert_eq!(from_unset.unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = EngineConfig::from_file(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}
