//! In-memory order cache settings.

use serde::Deserialize;

/// Cache sizing and recovery behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached orders.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Populate the cache when a lookup misses and the store has the order.
    #[serde(default = "default_true")]
    pub read_through: bool,
    /// Remove index entries whose aggregate could not be read during recovery.
    #[serde(default = "default_true")]
    pub prune_unrecoverable: bool,
}

const fn default_capacity() -> usize {
    10
}

const fn default_true() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            read_through: true,
            prune_unrecoverable: true,
        }
    }
}
