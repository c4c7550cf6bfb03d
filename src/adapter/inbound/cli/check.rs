//! Handler for the `check-config` command.

use std::path::Path;

use super::{load_config, output};
use crate::error::Result;

/// Validate configuration without starting the service.
pub fn execute(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;

    output::section("Configuration Check");
    match path {
        Some(path) => output::field("Config", path.display()),
        None => output::field("Config", "defaults"),
    }
    output::success("Configuration is valid");

    output::section("Summary");
    output::field("App key", &config.app_key);
    output::field("Database", &config.database.url);
    output::field("Pool size", config.database.pool_max_size);
    output::field("Stream", &config.stream.url);
    output::field("Cluster", &config.stream.cluster_id);
    output::field("Subject", &config.stream.subject);
    output::field("Durable", &config.stream.durable_name);
    output::field("Ack wait", format!("{}s", config.stream.ack_wait_secs));
    output::field("Cache", config.cache.capacity);
    output::field("Read-through", config.cache.read_through);
    output::field("Listen", &config.http.bind);

    if !config.cache.prune_unrecoverable {
        output::warning("Unrecoverable cache index entries will be kept");
    }
    Ok(())
}
