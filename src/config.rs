//! Console configuration
//!
//! - TOML file (`leadconsole.toml`, or the path in `LEADCONSOLE_CONFIG`)
//! - Defaults for every missing section
//! - Environment variable overrides
//!
//! Rocket's own server settings stay in `Rocket.toml` / `ROCKET_*`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "leadconsole.toml";

/// Poll intervals must stay within this range (seconds).
pub const MIN_POLL_SECS: u64 = 10;
pub const MAX_POLL_SECS: u64 = 60;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    pub data: DataConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Serve built-in categories/locations when the backend is unreachable
    pub fallback_defaults: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/v1".to_string(),
            timeout_secs: 15,
            fallback_defaults: true,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Built-in fixtures
    #[default]
    Static,
    /// Backend REST API
    Http,
}

impl std::str::FromStr for DataSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(DataSource::Static),
            "http" => Ok(DataSource::Http),
            other => Err(ConfigError::ValidationError(format!(
                "unknown data source '{other}' (expected static or http)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DataConfig {
    pub source: DataSource,
}

/// Poll intervals for the live views, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub lead_stats_secs: u64,
    pub webhooks_secs: u64,
    pub approvals_secs: u64,
    pub executions_secs: u64,
    pub ai_gym_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            lead_stats_secs: 30,
            webhooks_secs: 10,
            approvals_secs: 15,
            executions_secs: 10,
            ai_gym_secs: 60,
        }
    }
}

impl PollingConfig {
    fn intervals(&self) -> [(&'static str, u64); 5] {
        [
            ("lead_stats_secs", self.lead_stats_secs),
            ("webhooks_secs", self.webhooks_secs),
            ("approvals_secs", self.approvals_secs),
            ("executions_secs", self.executions_secs),
            ("ai_gym_secs", self.ai_gym_secs),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl ConsoleConfig {
    /// Load from `LEADCONSOLE_CONFIG` or `leadconsole.toml`, falling back to
    /// defaults when the file does not exist, then apply env overrides.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or validated.
    pub fn discover() -> Result<Self, ConfigError> {
        let path = std::env::var("LEADCONSOLE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            info!(path = %path.display(), "Loading console config");
            Self::parse(&std::fs::read_to_string(&path)?)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("LEADCONSOLE_API_URL") {
            self.api.base_url = val;
        }
        if let Ok(val) = std::env::var("LEADCONSOLE_DATA_SOURCE") {
            self.data.source = val.parse()?;
        }
        if let Ok(val) = std::env::var("LEADCONSOLE_LOG") {
            self.logging.level = val;
        }
        Ok(())
    }

    /// # Errors
    /// Returns a [`ConfigError`] when validation rules are violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        for (name, secs) in self.polling.intervals() {
            if !(MIN_POLL_SECS..=MAX_POLL_SECS).contains(&secs) {
                return Err(ConfigError::ValidationError(format!(
                    "polling.{name} must be between {MIN_POLL_SECS} and {MAX_POLL_SECS}, got {secs}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.data.source, DataSource::Static);
        assert!(config.api.fallback_defaults);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConsoleConfig::parse(
            r#"
            [api]
            base_url = "https://leads.example.com/api"

            [data]
            source = "http"

            [polling]
            webhooks_secs = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://leads.example.com/api");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.data.source, DataSource::Http);
        assert_eq!(config.polling.webhooks_secs, 20);
        assert_eq!(config.polling.ai_gym_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_poll_interval_out_of_range() {
        let mut config = ConsoleConfig::default();
        config.polling.approvals_secs = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("polling.approvals_secs"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = ConsoleConfig::default();
        config.api.base_url = "ftp://backend".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = ConsoleConfig::parse("[api\nbase_url=").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn data_source_parses_case_insensitively() {
        assert_eq!("HTTP".parse::<DataSource>().unwrap(), DataSource::Http);
        assert!("sqlite".parse::<DataSource>().is_err());
    }
}
