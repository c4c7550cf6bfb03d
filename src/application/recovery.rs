//! Cache recovery from the persisted index.
//!
//! Runs once at startup, before reads are served or messages consumed.

use std::collections::HashMap;

use tracing::{info, warn};

use super::cache::OrderCache;
use crate::domain::{AppKey, OrderId};
use crate::error::{Error, Result};
use crate::port::outbound::store::OrderStore;

/// Outcome of a recovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Distinct ids found in the index (at most the cache capacity).
    pub indexed: usize,
    /// Orders loaded into the cache.
    pub restored: usize,
    /// Ids whose aggregate could not be read.
    pub skipped: usize,
    /// Index rows removed for skipped ids.
    pub pruned: usize,
}

/// Rebuild `cache` from the index rows recorded under `app_key`.
///
/// An empty index is not an error; it yields an empty report. Ids that fail
/// to load are logged and skipped, and their index rows are removed when
/// `prune_unrecoverable` is set.
///
/// # Errors
/// Returns an error if the index itself cannot be queried.
pub fn recover(
    store: &dyn OrderStore,
    cache: &OrderCache,
    app_key: &AppKey,
    prune_unrecoverable: bool,
) -> Result<RecoveryReport> {
    let ids = match store.load_cache_index(app_key, cache.capacity()) {
        Ok(ids) => ids,
        Err(Error::EmptyCacheIndex { .. }) => {
            info!(app_key = %app_key, "Cache index empty, starting cold");
            return Ok(RecoveryReport::default());
        }
        Err(e) => return Err(e),
    };

    let mut entries = HashMap::with_capacity(ids.len());
    let mut unrecoverable: Vec<OrderId> = Vec::new();

    for id in &ids {
        match store.read_order(*id) {
            Ok(order) => {
                entries.insert(*id, order);
            }
            Err(e) => {
                warn!(order_id = %id, error = %e, "Skipping unrecoverable cache entry");
                unrecoverable.push(*id);
            }
        }
    }

    let restored = entries.len();
    cache.load(entries, &ids);

    let pruned = if prune_unrecoverable && !unrecoverable.is_empty() {
        match store.remove_cache_index_entries(app_key, &unrecoverable) {
            Ok(n) => n,
            Err(e) => {
                warn!(app_key = %app_key, error = %e, "Failed to prune cache index");
                0
            }
        }
    } else {
        0
    };

    let report = RecoveryReport {
        indexed: ids.len(),
        restored,
        skipped: unrecoverable.len(),
        pruned,
    };
    info!(
        app_key = %app_key,
        indexed = report.indexed,
        restored = report.restored,
        skipped = report.skipped,
        pruned = report.pruned,
        "Cache recovered"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::db::TempDb;
    use crate::testkit::domain::order_with_uid;
    use diesel::prelude::*;

    fn seed(store: &dyn OrderStore, key: &AppKey, n: usize) -> Vec<OrderId> {
        (0..n)
            .map(|i| {
                let id = store.write_order(&order_with_uid(&format!("r{i}"))).unwrap();
                store.append_cache_index(id, key).unwrap();
                id
            })
            .collect()
    }

    fn drop_order_row(db: &TempDb, id: OrderId) {
        let mut conn = db.pool().get().unwrap();
        diesel::sql_query("PRAGMA foreign_keys = OFF")
            .execute(&mut conn)
            .unwrap();
        diesel::sql_query("DELETE FROM orders WHERE id = ?")
            .bind::<diesel::sql_types::BigInt, _>(id.get())
            .execute(&mut conn)
            .unwrap();
        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(&mut conn)
            .unwrap();
    }

    #[test]
    fn empty_index_yields_empty_report() {
        let db = TempDb::create("recover-empty");
        let cache = OrderCache::new(3);

        let report = recover(&db.store(), &cache, &AppKey::from("WB-1"), true).unwrap();

        assert_eq!(report, RecoveryReport::default());
        assert!(cache.is_empty());
    }

    #[test]
    fn restores_newest_ids_up_to_capacity() {
        let db = TempDb::create("recover-capacity");
        let store = db.store();
        let key = AppKey::from("WB-1");
        let ids = seed(&store, &key, 5);
        let cache = OrderCache::new(3);

        let report = recover(&store, &cache, &key, true).unwrap();

        assert_eq!(report.indexed, 3);
        assert_eq!(report.restored, 3);
        assert_eq!(cache.queue_snapshot(), ids[2..].to_vec());
        assert_eq!(cache.get(ids[4]).unwrap(), store.read_order(ids[4]).unwrap());
    }

    #[test]
    fn unreadable_ids_are_skipped_and_pruned() {
        let db = TempDb::create("recover-prune");
        let store = db.store();
        let key = AppKey::from("WB-1");
        let ids = seed(&store, &key, 2);
        drop_order_row(&db, ids[0]);
        let cache = OrderCache::new(5);

        let report = recover(&store, &cache, &key, true).unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.pruned, 1);
        assert_eq!(cache.queue_snapshot(), vec![ids[1]]);
        assert_eq!(store.load_cache_index(&key, 5).unwrap(), vec![ids[1]]);
    }

    #[test]
    fn pruning_can_be_disabled() {
        let db = TempDb::create("recover-no-prune");
        let store = db.store();
        let key = AppKey::from("WB-1");
        let ids = seed(&store, &key, 2);
        drop_order_row(&db, ids[0]);
        let cache = OrderCache::new(5);

        let report = recover(&store, &cache, &key, false).unwrap();

        assert_eq!(report.restored, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.pruned, 0);
        assert_eq!(store.load_cache_index(&key, 5).unwrap(), ids);
    }
}
