//! Handler for the `clear-cache-index` command.

use std::path::Path;

use super::{load_config, output};
use crate::application::runtime::open_store;
use crate::error::Result;
use crate::port::outbound::store::OrderStore;

/// Delete every cache index row for the configured app key.
///
/// Stored orders are untouched; the next start simply begins with an empty
/// cache.
pub async fn execute_clear(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    let app_key = config.app_key();
    let database = config.database.clone();

    let deleted = {
        let app_key = app_key.clone();
        tokio::task::spawn_blocking(move || open_store(&database)?.clear_cache_index(&app_key))
            .await??
    };

    output::field("App key", &app_key);
    output::success(&format!("Removed {deleted} cache index entries"));
    Ok(())
}
