use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::retry::RetryPolicy;

/// Environment variable consulted when no weather API key is configured
pub const OPENWEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

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
    /// Directory for application data (tracker database)
    pub data_dir: PathBuf,

    /// Temperature analysis settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Live weather settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Health tracker settings
    #[serde(default)]
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Moving-average window in days
    #[serde(default = "default_window")]
    pub window: usize,

    /// Residual threshold in standard deviations
    #[serde(default = "default_threshold_std")]
    pub threshold_std: f64,

    /// Worker threads for multi-city analysis (0 = one per CPU)
    #[serde(default)]
    pub workers: usize,
}

fn default_window() -> usize {
    30
}

fn default_threshold_std() -> f64 {
    2.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            threshold_std: default_threshold_std(),
            workers: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the OpenWeatherMap API
    #[serde(default = "default_weather_api_url")]
    pub api_url: String,

    /// API key; falls back to the `OPENWEATHER_API_KEY` environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff pause in milliseconds; doubles per retry
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_weather_api_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    200
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: default_weather_api_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl WeatherConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_settings(self.max_retries, self.retry_base_delay_ms)
    }

    /// The configured API key, or the one from the environment.
    /// Empty strings count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(OPENWEATHER_API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// SQLite database file; relative paths resolve against `data_dir`
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Base URL of the Open Food Facts API
    #[serde(default = "default_food_api_url")]
    pub food_api_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff pause in milliseconds; doubles per retry
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("tracker.db")
}

fn default_food_api_url() -> String {
    "https://world.openfoodfacts.org".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            food_api_url: default_food_api_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl TrackerConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_settings(self.max_retries, self.retry_base_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tempscope");

        Self {
            data_dir,
            analysis: AnalysisConfig::default(),
            weather: WeatherConfig::default(),
            tracker: TrackerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!(path = %path.display(), "Created default config");
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.analysis.window == 0 {
            result.add_error("analysis.window", "Window must be at least 1 day");
        } else if self.analysis.window > 365 {
            result.add_warning(
                "analysis.window",
                "Window is longer than a year; most readings will have no moving average",
            );
        }

        if !self.analysis.threshold_std.is_finite() || self.analysis.threshold_std < 0.0 {
            result.add_error(
                "analysis.threshold_std",
                "Threshold must be a non-negative number",
            );
        } else if self.analysis.threshold_std == 0.0 {
            result.add_warning(
                "analysis.threshold_std",
                "Threshold of 0 flags every non-zero residual",
            );
        }

        Self::validate_url(&self.weather.api_url, "weather.api_url", &mut result);
        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        }
        if self.weather.resolved_api_key().is_none() {
            result.add_warning(
                "weather.api_key",
                "OpenWeatherMap API key not configured - live temperature checks unavailable",
            );
        }

        Self::validate_url(&self.tracker.food_api_url, "tracker.food_api_url", &mut result);
        if self.tracker.timeout_secs == 0 {
            result.add_error("tracker.timeout_secs", "Timeout must be greater than 0");
        }

        if self.data_dir.exists() && !self.data_dir.is_dir() {
            result.add_error(
                "data_dir",
                format!("Path is not a directory: {}", self.data_dir.display()),
            );
        }

        result
    }

    /// Absolute path of the tracker database
    pub fn database_path(&self) -> PathBuf {
        if self.tracker.database_path.is_absolute() {
            self.tracker.database_path.clone()
        } else {
            self.data_dir.join(&self.tracker.database_path)
        }
    }

    /// Validate a URL field
    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
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

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("tempscope");

        Ok(config_dir.join("config.toml"))
    }
}
