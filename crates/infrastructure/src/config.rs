//! Application configuration
//!
//! Values are layered: built-in defaults, then an optional `betax.toml`
//! (or an explicit file), then `BETAX_` environment variables using `__`
//! between nested keys, e.g. `BETAX_BACKEND__BASE_URL`.

use std::path::Path;
use std::time::Duration;

use application::{ApplicationError, MapSettings, WatchOptions};
use domain::Timezone;
use integration_betax::BetaxConfig;
use serde::{Deserialize, Serialize};

/// Map section of the configuration
pub type MapConfig = MapSettings;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Betax backend connection
    #[serde(default)]
    pub backend: BetaxConfig,

    /// Viewport and polling behavior
    #[serde(default)]
    pub map: MapConfig,

    /// Driver location forwarding
    #[serde(default)]
    pub driver: DriverConfig,

    /// Trip history display
    #[serde(default)]
    pub history: HistoryConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Driver location thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Forward a fix at least this often, in seconds
    #[serde(default = "default_time_interval_secs")]
    pub time_interval_secs: u64,

    /// Forward a fix once the vehicle moved this far, in meters
    #[serde(default = "default_distance_interval_m")]
    pub distance_interval_m: f64,
}

const fn default_time_interval_secs() -> u64 {
    5
}

const fn default_distance_interval_m() -> f64 {
    30.0
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            time_interval_secs: default_time_interval_secs(),
            distance_interval_m: default_distance_interval_m(),
        }
    }
}

impl DriverConfig {
    /// Options handed to the location provider
    #[must_use]
    pub const fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            time_interval: Duration::from_secs(self.time_interval_secs),
            distance_interval_m: self.distance_interval_m,
        }
    }
}

/// History screen settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Timezone used for the week and month windows
    #[serde(default)]
    pub timezone: Timezone,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,

    /// `EnvFilter` directive used when `RUST_LOG` is not set
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_filter(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `betax.toml` (if present) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of `betax.toml` when given
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("betax").required(false),
        };

        let builder = config::Config::builder()
            .set_default("logging.filter", default_filter())?
            .add_source(file)
            // Override with environment variables (e.g., BETAX_MAP__RADIUS_KM)
            .add_source(
                config::Environment::with_prefix("BETAX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Check cross-field constraints the deserializer cannot express
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.backend
            .validate()
            .map_err(|e| ApplicationError::Configuration(format!("backend: {e}")))?;
        self.map.validate()?;

        if self.driver.time_interval_secs == 0 {
            return Err(ApplicationError::Configuration(
                "driver.time_interval_secs must be greater than zero".to_string(),
            ));
        }
        if !self.driver.distance_interval_m.is_finite() || self.driver.distance_interval_m < 0.0 {
            return Err(ApplicationError::Configuration(
                "driver.distance_interval_m must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:3000/radarbus");
        assert!(config.backend.timeout_secs.is_none());
        assert!((config.map.radius_km - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.map.poll_interval_secs, 5);
        assert_eq!(config.driver.time_interval_secs, 5);
        assert_eq!(config.history.timezone.as_str(), "Indian/Antananarivo");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn watch_options_from_driver_config() {
        let driver = DriverConfig {
            time_interval_secs: 10,
            distance_interval_m: 50.0,
        };
        let options = driver.watch_options();
        assert_eq!(options.time_interval, Duration::from_secs(10));
        assert!((options.distance_interval_m - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_from_file_overrides_defaults() {
        let file = write_config(
            r#"
[backend]
base_url = "https://betax.example.mg/radarbus"
timeout_secs = 15

[map]
radius_km = 5.0

[history]
timezone = "UTC"

[logging]
format = "json"
"#,
        );

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.backend.base_url, "https://betax.example.mg/radarbus");
        assert_eq!(config.backend.timeout_secs, Some(15));
        assert!((config.map.radius_km - 5.0).abs() < f64::EPSILON);
        assert!((config.map.focus_span - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.history.timezone.as_str(), "UTC");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn load_from_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::load_from(Some(&missing)).is_err());
    }

    #[test]
    fn invalid_timezone_is_rejected_at_load() {
        let file = write_config("[history]\ntimezone = \"Nowhere/Land\"\n");
        assert!(AppConfig::load_from(Some(file.path())).is_err());
    }

    #[test]
    fn validate_rejects_zero_time_interval() {
        let mut config = AppConfig::default();
        config.driver.time_interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ApplicationError::Configuration(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_backend_url() {
        let mut config = AppConfig::default();
        config.backend.base_url = "ftp://betax.mg".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backend"));
    }

    #[test]
    fn log_format_deserialize() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
