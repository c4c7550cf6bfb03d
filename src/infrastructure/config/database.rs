//! Relational store connection and pool settings.

use serde::Deserialize;

/// SQLite connection pool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path (or `sqlite://` URL) of the database file.
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
    /// How long a caller waits for a free connection before giving up.
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
    /// SQLite busy timeout applied to every connection (milliseconds).
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

fn default_url() -> String {
    "ordercache.db".to_string()
}

const fn default_pool_max_size() -> u32 {
    5
}

const fn default_connection_timeout_secs() -> u64 {
    30
}

const fn default_busy_timeout_ms() -> u32 {
    5000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            pool_max_size: default_pool_max_size(),
            connection_timeout_secs: default_connection_timeout_secs(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}
