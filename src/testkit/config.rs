//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use std::time::Duration;

use crate::infrastructure::config::settings::Config;
use crate::port::outbound::stream::SubscribeOptions;

/// Service config against `database_url` with a small cache and an
/// ephemeral HTTP port.
pub fn service(database_url: &str, capacity: usize) -> Config {
    let mut config = Config::default();
    config.database.url = database_url.to_string();
    config.database.connection_timeout_secs = 5;
    config.cache.capacity = capacity;
    config.stream.ack_wait_secs = 1;
    config.http.bind = "127.0.0.1:0".to_string();
    config
}

/// Subscription options with a short ack wait so redelivery tests run fast.
pub fn fast_redelivery(ack_wait: Duration) -> SubscribeOptions {
    SubscribeOptions {
        ack_wait,
        max_in_flight: 16,
    }
}
