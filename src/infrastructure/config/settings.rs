//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file, with a small set of environment
//! variable overrides applied once at load time. After that the value is
//! immutable and handed to each component's constructor.
//!
//! # Example
//!
//! ```no_run
//! use ordercache::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use super::cache::CacheConfig;
use super::database::DatabaseConfig;
use super::http::HttpConfig;
use super::logging::LoggingConfig;
use super::stream::StreamConfig;
use crate::domain::AppKey;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::app_key`].
pub const ENV_APP_KEY: &str = "ORDERCACHE_APP_KEY";
/// Environment variable overriding [`DatabaseConfig::url`].
pub const ENV_DATABASE_URL: &str = "ORDERCACHE_DATABASE_URL";
/// Environment variable overriding [`CacheConfig::capacity`].
pub const ENV_CACHE_CAPACITY: &str = "ORDERCACHE_CACHE_CAPACITY";
/// Environment variable overriding [`StreamConfig::url`].
pub const ENV_STREAM_URL: &str = "ORDERCACHE_STREAM_URL";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Partition label scoping the persisted cache index.
    #[serde(default = "default_app_key")]
    pub app_key: String,

    /// Relational store connection and pool settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Durable stream subscription settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// In-memory cache sizing and recovery behavior.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Read endpoint listener.
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_app_key() -> String {
    "WB-1".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_key: default_app_key(),
            database: DatabaseConfig::default(),
            stream: StreamConfig::default(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Applies `ORDERCACHE_*` environment overrides before validating.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - An override holds an unparseable value
    /// - Validation fails
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Apply overrides looked up by environment variable name.
    ///
    /// # Errors
    /// Returns an error when an override cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_APP_KEY) {
            self.app_key = key;
        }
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database.url = url;
        }
        if let Some(url) = lookup(ENV_STREAM_URL) {
            self.stream.url = url;
        }
        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            self.cache.capacity = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "cache.capacity",
                reason: format!("{ENV_CACHE_CAPACITY}={raw} is not a positive integer"),
            })?;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns the first field that is missing or out of range.
    pub fn validate(&self) -> Result<()> {
        if self.app_key.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "app_key" }.into());
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.url",
            }
            .into());
        }
        if self.database.pool_max_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.pool_max_size",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.database.connection_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.connection_timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.stream.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "stream.url",
            }
            .into());
        }
        if !is_stream_name(&self.stream.cluster_id) {
            return Err(ConfigError::InvalidValue {
                field: "stream.cluster_id",
                reason: format!("{:?} is not a valid stream name", self.stream.cluster_id),
            }
            .into());
        }
        if self.stream.client_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "stream.client_id",
            }
            .into());
        }
        if self.stream.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.connect_timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.stream.ping_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.ping_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.stream.subject.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "stream.subject",
            }
            .into());
        }
        if self.stream.durable_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "stream.durable_name",
            }
            .into());
        }
        if self.stream.ack_wait_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.ack_wait_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.stream.max_in_flight == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.max_in_flight",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        self.http_addr()?;
        Ok(())
    }

    /// The application key as a domain value.
    #[must_use]
    pub fn app_key(&self) -> AppKey {
        AppKey::new(self.app_key.clone())
    }

    /// Parsed bind address of the read endpoint.
    ///
    /// # Errors
    /// Returns an error when `http.bind` is not a socket address.
    pub fn http_addr(&self) -> Result<SocketAddr> {
        self.http.bind.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::InvalidValue {
                field: "http.bind",
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

/// JetStream stream names may not contain whitespace, subject tokens or
/// path separators.
fn is_stream_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '.' | '*' | '>' | '/' | '\\'))
}
