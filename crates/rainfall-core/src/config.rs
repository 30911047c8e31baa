use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

const APP_DIR: &str = "rainfall";
const CACHE_FILE_NAME: &str = "weather_results.json";
const CONFIG_FILE_NAME: &str = "config.toml";

/// One problem found in a config key, e.g. `weather.base_url`.
#[derive(Debug, Clone)]
pub struct SettingIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for SettingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Findings from [`Config::validate`].
///
/// Errors stop startup before the cache file or either HTTP client is
/// touched. Warnings are logged and the session goes ahead.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<SettingIssue>,
    pub warnings: Vec<SettingIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(SettingIssue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn warning(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.push(SettingIssue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// All errors on one line, as carried by `ConfigError::Invalid`.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(SettingIssue::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Forecast cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Place-name lookup service
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Precipitation provider
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Backoff for transient HTTP failures
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// JSON file holding the date -> precipitation mapping
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

fn default_cache_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CACHE_FILE_NAME)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Nominatim-compatible base URL
    pub base_url: String,

    /// Nominatim's usage policy rejects requests without an identifying agent
    pub user_agent: String,

    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("rainfall/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Open-Meteo-compatible base URL
    pub base_url: String,

    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    5000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Load `config.toml` from the per-user config directory (created with
    /// defaults on first run), then [`Config::validate`] it.
    ///
    /// Warnings are logged and returned with the config; any error becomes
    /// `ConfigError::Invalid`.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        Self::load_validated_from(&Self::config_path()?)
    }

    pub fn load_validated_from(path: &Path) -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load_from(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.cache.path.as_os_str().is_empty() {
            result.error("cache.path", "Cache path must not be empty");
        } else if self.cache.path.is_dir() {
            result.error(
                "cache.path",
                format!("Path is a directory: {}", self.cache.path.display()),
            );
        }

        self.validate_url(&self.geocoding.base_url, "geocoding.base_url", &mut result);
        if self.geocoding.user_agent.trim().is_empty() {
            result.error(
                "geocoding.user_agent",
                "A User-Agent is required by the geocoding service",
            );
        }
        validate_timeout(self.geocoding.timeout_secs, "geocoding.timeout_secs", &mut result);

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        validate_timeout(self.weather.timeout_secs, "weather.timeout_secs", &mut result);

        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            result.warning(
                "retry.initial_delay_ms",
                "Initial delay exceeds max delay; every retry will wait max_delay_ms",
            );
        }
        if self.retry.max_retries > 10 {
            result.warning("retry.max_retries", "More than 10 retries per request");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |e: std::io::Error| {
            ConfigError::Io(format!("failed to write {}: {}", path.display(), e))
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        std::fs::write(path, contents).map_err(io_err)
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE_NAME))
    }
}

fn validate_timeout(secs: u64, field_name: &str, result: &mut ValidationResult) {
    if secs == 0 {
        result.error(field_name, "Timeout must be greater than 0");
    } else if secs > 120 {
        result.warning(field_name, "Timeout is unusually long (>120 seconds)");
    }
}
