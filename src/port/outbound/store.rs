//! Persistence port for order aggregates and the cache index.
//!
//! Calls are synchronous and may block on the connection pool; async callers
//! run them on `tokio::task::spawn_blocking`.

use crate::domain::{AppKey, Order, OrderId};
use crate::error::Result;

/// Storage operations for order aggregates.
pub trait OrderStore: Send + Sync {
    /// Persist a full aggregate atomically and return its store identifier.
    ///
    /// Fails with `DuplicateOrder` when the UID is already stored; nothing is
    /// written in that case or on any other failure.
    fn write_order(&self, order: &Order) -> Result<OrderId>;

    /// Reconstruct a full aggregate.
    ///
    /// Fails with `NotFound` when the order row is absent and with
    /// `DependentRow` when any owned row is missing.
    fn read_order(&self, id: OrderId) -> Result<Order>;

    /// Append an identifier to the cache index for `app_key`.
    fn append_cache_index(&self, id: OrderId, app_key: &AppKey) -> Result<()>;

    /// Up to `limit` most recently indexed distinct identifiers, oldest first.
    ///
    /// Fails with `EmptyCacheIndex` when the key has no rows.
    fn load_cache_index(&self, app_key: &AppKey, limit: usize) -> Result<Vec<OrderId>>;

    /// Delete every index row for `app_key`. Returns rows removed.
    fn clear_cache_index(&self, app_key: &AppKey) -> Result<usize>;

    /// Delete index rows for the given identifiers. Returns rows removed.
    fn remove_cache_index_entries(&self, app_key: &AppKey, ids: &[OrderId]) -> Result<usize>;
}
