use anyhow::{Context, Result};
use chrono::{Locale, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides `weather.api_key`.
pub const WEATHER_API_KEY_ENV: &str = "VEJR_WEATHER_API_KEY";
/// Environment variable that overrides `geolocation.token`.
pub const IPINFO_TOKEN_ENV: &str = "VEJR_IPINFO_TOKEN";

/// Format accepted for `forecast.target_hour`.
pub const TARGET_HOUR_FORMAT: &str = "%H:%M";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Remote weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// IP geolocation provider settings
    #[serde(default)]
    pub geolocation: GeolocationConfig,

    /// Daily forecast selection and labelling
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Local persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Saved-city batch behaviour
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the OpenWeatherMap 2.5 API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// API key sent as `appid` (can be set via environment)
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            api_key: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Base URL of the ipinfo service
    #[serde(default = "default_geolocation_base_url")]
    pub base_url: String,

    /// Access token (can be set via environment)
    #[serde(default)]
    pub token: String,
}

fn default_geolocation_base_url() -> String {
    "https://ipinfo.io".to_string()
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            base_url: default_geolocation_base_url(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Time of day whose sample represents the whole day, `HH:MM`
    #[serde(default = "default_target_hour")]
    pub target_hour: String,

    /// Locale used for the long date label (e.g. `da_DK`, `en_US`)
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_target_hour() -> String {
    "12:00".to_string()
}

fn default_locale() -> String {
    "da_DK".to_string()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            target_hour: default_target_hour(),
            locale: default_locale(),
        }
    }
}

impl ForecastConfig {
    /// Parse `target_hour` into a time of day.
    pub fn parsed_target_hour(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.target_hour, TARGET_HOUR_FORMAT)
            .with_context(|| format!("Invalid target hour: {}", self.target_hour))
    }

    /// Parse `locale` into a chrono locale.
    pub fn parsed_locale(&self) -> Result<Locale> {
        Locale::try_from(self.locale.as_str())
            .map_err(|_| anyhow::anyhow!("Unknown locale: {}", self.locale))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database holding the key-value table
    pub database_path: PathBuf,
}

impl StorageConfig {
    fn in_dir(config_dir: &Path) -> Self {
        Self {
            database_path: config_dir.join("vejr.db"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::in_dir(&default_config_dir())
    }
}

/// How a saved-city batch reacts to a failing member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Each city succeeds or fails on its own
    #[default]
    Isolated,
    /// Any failing city fails the whole batch
    AllOrNothing,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchConfig {
    #[serde(default)]
    pub mode: BatchMode,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vejr")
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = default_config_dir();
        let storage = StorageConfig::in_dir(&config_dir);

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            geolocation: GeolocationConfig::default(),
            forecast: ForecastConfig::default(),
            storage,
            batch: BatchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating default if it doesn't exist.
    ///
    /// Environment secrets are applied to the returned value only; the file
    /// written for a first run never contains them.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context("Failed to read config file")?;
            Self::parse(&contents)?
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a TOML document into a config without touching the environment
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Secrets from the environment win over the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(WEATHER_API_KEY_ENV) {
            self.weather.api_key = key;
        }
        if let Ok(token) = std::env::var(IPINFO_TOKEN_ENV) {
            self.geolocation.token = token;
        }
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(
            &self.geolocation.base_url,
            "geolocation.base_url",
            &mut result,
        );

        if self.weather.api_key.trim().is_empty() {
            result.add_warning(
                "weather.api_key",
                format!("Weather API key not set (config or {})", WEATHER_API_KEY_ENV),
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.geolocation.token.trim().is_empty() {
            result.add_warning(
                "geolocation.token",
                format!(
                    "Geolocation token not set (config or {}) - default city lookup may be rejected",
                    IPINFO_TOKEN_ENV
                ),
            );
        }

        match self.forecast.parsed_target_hour() {
            Ok(hour) => {
                // The feed is sampled every three hours starting at midnight
                if hour.minute() != 0 || hour.hour() % 3 != 0 {
                    result.add_warning(
                        "forecast.target_hour",
                        format!(
                            "{} is not a three-hour boundary; no forecast sample will match",
                            self.forecast.target_hour
                        ),
                    );
                }
            }
            Err(e) => result.add_error("forecast.target_hour", e.to_string()),
        }

        if let Err(e) = self.forecast.parsed_locale() {
            result.add_error("forecast.locale", e.to_string());
        }

        if self.storage.database_path.as_os_str().is_empty() {
            result.add_error("storage.database_path", "Database path cannot be empty");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                // Check scheme
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                // Check host
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("vejr");

        Ok(config_dir.join("config.toml"))
    }
}
