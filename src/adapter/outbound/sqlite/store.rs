//! SQLite order store implementation.
//!
//! Persists order aggregates across the normalized schema and maintains the
//! per-application cache index used to rebuild the in-memory cache.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::{BigInt, Text};
use diesel::SqliteConnection;
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{
    DeliveryRow, ItemRow, NewCacheIndexRow, NewDeliveryRow, NewItemRow, NewOrderItemRow,
    NewOrderRow, NewPaymentRow, OrderRow, PaymentRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    cache_index, deliveries, items, order_items, orders, payments,
};
use crate::domain::{AppKey, Item, Order, OrderId};
use crate::error::{AggregatePart, Error, Result};
use crate::port::outbound::store::OrderStore;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    #[diesel(column_name = "id")]
    id: i64,
}

#[derive(QueryableByName)]
struct IndexedOrder {
    #[diesel(sql_type = BigInt)]
    order_id: i64,
}

fn last_insert_rowid(conn: &mut SqliteConnection) -> QueryResult<i64> {
    diesel::sql_query("SELECT last_insert_rowid() AS id")
        .get_result::<LastInsertRowId>(conn)
        .map(|row| row.id)
}

fn persist(step: &'static str) -> impl Fn(diesel::result::Error) -> Error {
    move |e| Error::Persistence(format!("{step}: {e}"))
}

/// SQLite-backed order store.
///
/// Implements the [`OrderStore`] trait. Every call checks a connection out
/// of the pool and blocks while the pool is exhausted.
pub struct SqliteOrderStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteOrderStore {
    /// Create a new SQLite order store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))
    }

    /// Write an aggregate, running `before_order_row` after the owned rows
    /// are inserted and before the order row itself.
    fn write_order_with<F>(&self, order: &Order, before_order_row: F) -> Result<OrderId>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<()>,
    {
        let mut conn = self.conn()?;

        // IMMEDIATE takes the write lock up front so concurrent writers wait
        // on the busy timeout instead of failing a lock upgrade.
        let written = conn.immediate_transaction(|conn| {
            let existing: Option<i64> = orders::table
                .filter(orders::order_uid.eq(&order.order_uid))
                .select(orders::id)
                .first(conn)
                .optional()
                .map_err(persist("check order uid"))?;
            if let Some(id) = existing {
                return Err(Error::DuplicateOrder {
                    uid: order.order_uid.clone(),
                    id: OrderId::new(id),
                });
            }

            let mut item_ids = Vec::with_capacity(order.items.len());
            for item in &order.items {
                diesel::insert_into(items::table)
                    .values(NewItemRow::from(item))
                    .execute(conn)
                    .map_err(persist("insert item"))?;
                item_ids.push(last_insert_rowid(conn).map_err(persist("insert item"))?);
            }

            diesel::insert_into(payments::table)
                .values(NewPaymentRow::from(&order.payment))
                .execute(conn)
                .map_err(persist("insert payment"))?;
            let payment_id = last_insert_rowid(conn).map_err(persist("insert payment"))?;

            diesel::insert_into(deliveries::table)
                .values(NewDeliveryRow::from(&order.delivery))
                .execute(conn)
                .map_err(persist("insert delivery"))?;
            let delivery_id = last_insert_rowid(conn).map_err(persist("insert delivery"))?;

            before_order_row(conn)?;

            diesel::insert_into(orders::table)
                .values(NewOrderRow::new(order, payment_id, delivery_id))
                .execute(conn)
                .map_err(persist("insert order"))?;
            let order_id = last_insert_rowid(conn).map_err(persist("insert order"))?;

            for item_id in item_ids {
                diesel::insert_into(order_items::table)
                    .values(NewOrderItemRow { order_id, item_id })
                    .execute(conn)
                    .map_err(persist("insert order item"))?;
            }

            Ok(OrderId::new(order_id))
        });

        // Begin/commit failures surface as Database; for a write they are
        // persistence failures like any other step.
        let id = written.map_err(|e| match e {
            Error::Database(msg) => Error::Persistence(msg),
            other => other,
        })?;

        debug!(
            order_id = %id,
            order_uid = %order.order_uid,
            items = order.items.len(),
            "Order persisted"
        );
        Ok(id)
    }

    fn load_aggregate(conn: &mut SqliteConnection, id: OrderId) -> Result<Order> {
        let row: OrderRow = orders::table
            .find(id.get())
            .select(OrderRow::as_select())
            .first(conn)
            .optional()?
            .ok_or(Error::NotFound(id))?;

        let payment: PaymentRow = payments::table
            .find(row.payment_id)
            .select(PaymentRow::as_select())
            .first(conn)
            .optional()?
            .ok_or(Error::DependentRow {
                order_id: id,
                part: AggregatePart::Payment,
            })?;

        let delivery: DeliveryRow = deliveries::table
            .find(row.delivery_id)
            .select(DeliveryRow::as_select())
            .first(conn)
            .optional()?
            .ok_or(Error::DependentRow {
                order_id: id,
                part: AggregatePart::Delivery,
            })?;

        let item_ids: Vec<i64> = order_items::table
            .filter(order_items::order_id.eq(id.get()))
            .order(order_items::id.asc())
            .select(order_items::item_id)
            .load(conn)?;

        let rows: HashMap<i64, ItemRow> = items::table
            .filter(items::id.eq_any(&item_ids))
            .select(ItemRow::as_select())
            .load(conn)?
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

        let items = item_ids
            .iter()
            .map(|item_id| {
                rows.get(item_id)
                    .cloned()
                    .map(Item::from)
                    .ok_or(Error::DependentRow {
                        order_id: id,
                        part: AggregatePart::Item,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let date_created: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.date_created)
            .map_err(|e| Error::Database(format!("order {id} has malformed date_created: {e}")))?
            .with_timezone(&Utc);

        Ok(Order {
            order_uid: row.order_uid,
            track_number: row.track_number,
            entry: row.entry,
            delivery: delivery.into(),
            payment: payment.into(),
            items,
            locale: row.locale,
            internal_signature: row.internal_signature,
            customer_id: row.customer_id,
            delivery_service: row.delivery_service,
            shardkey: row.shardkey,
            sm_id: row.sm_id,
            date_created,
            oof_shard: row.oof_shard,
        })
    }
}

/// Lookups used by tests to inspect what ingestion wrote.
#[cfg(any(test, feature = "testkit"))]
impl SqliteOrderStore {
    /// Store identifier for an external UID, if stored.
    pub fn find_by_uid(&self, uid: &str) -> Result<Option<OrderId>> {
        let mut conn = self.conn()?;
        let id: Option<i64> = orders::table
            .filter(orders::order_uid.eq(uid))
            .select(orders::id)
            .first(&mut conn)
            .optional()?;
        Ok(id.map(OrderId::new))
    }

    /// Number of stored orders.
    pub fn count_orders(&self) -> Result<i64> {
        let mut conn = self.conn()?;
        Ok(orders::table.count().get_result(&mut conn)?)
    }
}

impl OrderStore for SqliteOrderStore {
    fn write_order(&self, order: &Order) -> Result<OrderId> {
        self.write_order_with(order, |_| Ok(()))
    }

    fn read_order(&self, id: OrderId) -> Result<Order> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| Self::load_aggregate(conn, id))
    }

    fn append_cache_index(&self, id: OrderId, app_key: &AppKey) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(cache_index::table)
            .values(NewCacheIndexRow {
                order_id: id.get(),
                app_key: app_key.as_str(),
            })
            .execute(&mut conn)?;
        Ok(())
    }

    fn load_cache_index(&self, app_key: &AppKey, limit: usize) -> Result<Vec<OrderId>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;

        // Recency of an id is its latest append, so a re-indexed id counts once.
        let mut ids: Vec<OrderId> = diesel::sql_query(
            "SELECT order_id FROM cache_index WHERE app_key = ? \
             GROUP BY order_id ORDER BY MAX(id) DESC LIMIT ?",
        )
        .bind::<Text, _>(app_key.as_str())
        .bind::<BigInt, _>(i64::try_from(limit).unwrap_or(i64::MAX))
        .load::<IndexedOrder>(&mut conn)?
        .into_iter()
        .map(|row| OrderId::new(row.order_id))
        .collect();

        if ids.is_empty() {
            return Err(Error::EmptyCacheIndex {
                app_key: app_key.to_string(),
            });
        }

        ids.reverse();
        Ok(ids)
    }

    fn clear_cache_index(&self, app_key: &AppKey) -> Result<usize> {
        let mut conn = self.conn()?;
        let deleted =
            diesel::delete(cache_index::table.filter(cache_index::app_key.eq(app_key.as_str())))
                .execute(&mut conn)?;
        Ok(deleted)
    }

    fn remove_cache_index_entries(&self, app_key: &AppKey, ids: &[OrderId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            cache_index::table
                .filter(cache_index::app_key.eq(app_key.as_str()))
                .filter(cache_index::order_id.eq_any(&raw)),
        )
        .execute(&mut conn)?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::db::TempDb;
    use crate::testkit::domain::{order_with_uid, sample_order};

    fn setup(name: &str) -> (TempDb, SqliteOrderStore) {
        let db = TempDb::create(name);
        let store = SqliteOrderStore::new(db.pool().clone());
        (db, store)
    }

    #[derive(Debug, PartialEq, Eq)]
    struct RowCounts {
        orders: i64,
        items: i64,
        payments: i64,
        deliveries: i64,
        order_items: i64,
    }

    fn row_counts(db: &TempDb) -> RowCounts {
        let mut conn = db.pool().get().unwrap();
        RowCounts {
            orders: orders::table.count().get_result(&mut conn).unwrap(),
            items: items::table.count().get_result(&mut conn).unwrap(),
            payments: payments::table.count().get_result(&mut conn).unwrap(),
            deliveries: deliveries::table.count().get_result(&mut conn).unwrap(),
            order_items: order_items::table.count().get_result(&mut conn).unwrap(),
        }
    }

    fn without_foreign_keys(db: &TempDb, statement: &str) {
        let mut conn = db.pool().get().unwrap();
        diesel::sql_query("PRAGMA foreign_keys = OFF")
            .execute(&mut conn)
            .unwrap();
        diesel::sql_query(statement).execute(&mut conn).unwrap();
        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(&mut conn)
            .unwrap();
    }

    // -------------------------------------------------------------------------
    // Aggregate persistence
    // -------------------------------------------------------------------------

    #[test]
    fn write_then_read_returns_the_same_aggregate() {
        let (_db, store) = setup("roundtrip");
        let order = sample_order();

        let id = store.write_order(&order).unwrap();
        let loaded = store.read_order(id).unwrap();

        assert_eq!(loaded, order);
    }

    #[test]
    fn item_order_is_preserved() {
        let (_db, store) = setup("item-order");
        let mut order = sample_order();
        order.items.reverse();

        let id = store.write_order(&order).unwrap();
        let names: Vec<String> = store
            .read_order(id)
            .unwrap()
            .items
            .into_iter()
            .map(|i| i.name)
            .collect();

        let expected: Vec<String> = order.items.iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn order_without_items_roundtrips() {
        let (_db, store) = setup("no-items");
        let mut order = order_with_uid("empty-cart");
        order.items.clear();

        let id = store.write_order(&order).unwrap();
        assert!(store.read_order(id).unwrap().items.is_empty());
    }

    #[test]
    fn identifiers_are_distinct_and_increasing() {
        let (_db, store) = setup("ids");
        let a = store.write_order(&order_with_uid("a")).unwrap();
        let b = store.write_order(&order_with_uid("b")).unwrap();
        assert!(b > a);
    }

    #[test]
    fn read_of_unknown_id_is_not_found() {
        let (_db, store) = setup("not-found");
        let err = store.read_order(OrderId::new(404)).unwrap_err();
        assert!(matches!(err, Error::NotFound(id) if id == OrderId::new(404)));
    }

    #[test]
    fn missing_payment_is_a_dependent_row_error() {
        let (db, store) = setup("missing-payment");
        let id = store.write_order(&sample_order()).unwrap();
        without_foreign_keys(&db, "DELETE FROM payments");

        let err = store.read_order(id).unwrap_err();
        assert!(matches!(
            err,
            Error::DependentRow {
                part: AggregatePart::Payment,
                ..
            }
        ));
    }

    #[test]
    fn missing_delivery_is_a_dependent_row_error() {
        let (db, store) = setup("missing-delivery");
        let id = store.write_order(&sample_order()).unwrap();
        without_foreign_keys(&db, "DELETE FROM deliveries");

        let err = store.read_order(id).unwrap_err();
        assert!(matches!(
            err,
            Error::DependentRow {
                part: AggregatePart::Delivery,
                ..
            }
        ));
    }

    #[test]
    fn missing_item_is_a_dependent_row_error() {
        let (db, store) = setup("missing-item");
        let id = store.write_order(&sample_order()).unwrap();
        without_foreign_keys(&db, "DELETE FROM items WHERE id = (SELECT MIN(id) FROM items)");

        let err = store.read_order(id).unwrap_err();
        assert!(matches!(
            err,
            Error::DependentRow {
                part: AggregatePart::Item,
                ..
            }
        ));
    }

    #[test]
    fn failure_before_order_row_leaves_no_rows() {
        let (db, store) = setup("atomicity");
        store.write_order(&order_with_uid("kept")).unwrap();
        let before = row_counts(&db);

        let result = store.write_order_with(&order_with_uid("doomed"), |_| {
            Err(Error::Persistence("injected failure".into()))
        });

        assert!(matches!(result, Err(Error::Persistence(_))));
        assert_eq!(row_counts(&db), before);
        assert_eq!(store.find_by_uid("doomed").unwrap(), None);
    }

    #[test]
    fn duplicate_uid_is_rejected_without_writing() {
        let (db, store) = setup("duplicate");
        let order = order_with_uid("same-uid");
        let first = store.write_order(&order).unwrap();
        let before = row_counts(&db);

        let err = store.write_order(&order).unwrap_err();

        assert!(matches!(
            err,
            Error::DuplicateOrder { ref uid, id } if uid == "same-uid" && id == first
        ));
        assert_eq!(row_counts(&db), before);
    }

    #[test]
    fn find_by_uid_returns_store_identifier() {
        let (_db, store) = setup("find-uid");
        let id = store.write_order(&order_with_uid("lookup")).unwrap();
        assert_eq!(store.find_by_uid("lookup").unwrap(), Some(id));
        assert_eq!(store.find_by_uid("absent").unwrap(), None);
        assert_eq!(store.count_orders().unwrap(), 1);
    }

    // -------------------------------------------------------------------------
    // Cache index
    // -------------------------------------------------------------------------

    #[test]
    fn empty_index_is_reported_explicitly() {
        let (_db, store) = setup("index-empty");
        let err = store.load_cache_index(&AppKey::from("WB-1"), 10).unwrap_err();
        assert!(matches!(err, Error::EmptyCacheIndex { ref app_key } if app_key == "WB-1"));
    }

    #[test]
    fn index_returns_most_recent_ids_oldest_first() {
        let (_db, store) = setup("index-order");
        let key = AppKey::from("WB-1");
        let ids: Vec<OrderId> = (0..5)
            .map(|i| store.write_order(&order_with_uid(&format!("o{i}"))).unwrap())
            .collect();
        for id in &ids {
            store.append_cache_index(*id, &key).unwrap();
        }

        let loaded = store.load_cache_index(&key, 3).unwrap();
        assert_eq!(loaded, ids[2..].to_vec());
    }

    #[test]
    fn reindexed_id_counts_once_at_its_latest_position() {
        let (_db, store) = setup("index-dedup");
        let key = AppKey::from("WB-1");
        let a = store.write_order(&order_with_uid("a")).unwrap();
        let b = store.write_order(&order_with_uid("b")).unwrap();
        store.append_cache_index(a, &key).unwrap();
        store.append_cache_index(b, &key).unwrap();
        store.append_cache_index(a, &key).unwrap();

        assert_eq!(store.load_cache_index(&key, 10).unwrap(), vec![b, a]);
    }

    #[test]
    fn index_is_scoped_by_app_key() {
        let (_db, store) = setup("index-scope");
        let mine = AppKey::from("WB-1");
        let theirs = AppKey::from("WB-2");
        let a = store.write_order(&order_with_uid("a")).unwrap();
        let b = store.write_order(&order_with_uid("b")).unwrap();
        store.append_cache_index(a, &mine).unwrap();
        store.append_cache_index(b, &theirs).unwrap();

        assert_eq!(store.load_cache_index(&mine, 10).unwrap(), vec![a]);
        assert_eq!(store.clear_cache_index(&mine).unwrap(), 1);
        assert!(matches!(
            store.load_cache_index(&mine, 10),
            Err(Error::EmptyCacheIndex { .. })
        ));
        assert_eq!(store.load_cache_index(&theirs, 10).unwrap(), vec![b]);
    }

    #[test]
    fn clearing_index_keeps_aggregates() {
        let (_db, store) = setup("index-clear");
        let key = AppKey::from("WB-1");
        let id = store.write_order(&sample_order()).unwrap();
        store.append_cache_index(id, &key).unwrap();

        store.clear_cache_index(&key).unwrap();

        assert!(store.read_order(id).is_ok());
    }

    #[test]
    fn app_key_is_bound_not_interpolated() {
        let (_db, store) = setup("index-binding");
        let hostile = AppKey::from("WB-1' OR '1'='1");
        let honest = AppKey::from("WB-1");
        let id = store.write_order(&sample_order()).unwrap();
        store.append_cache_index(id, &honest).unwrap();

        assert!(matches!(
            store.load_cache_index(&hostile, 10),
            Err(Error::EmptyCacheIndex { .. })
        ));
        store.append_cache_index(id, &hostile).unwrap();
        assert_eq!(store.load_cache_index(&hostile, 10).unwrap(), vec![id]);
    }

    #[test]
    fn remove_entries_only_touches_given_ids() {
        let (_db, store) = setup("index-remove");
        let key = AppKey::from("WB-1");
        let a = store.write_order(&order_with_uid("a")).unwrap();
        let b = store.write_order(&order_with_uid("b")).unwrap();
        store.append_cache_index(a, &key).unwrap();
        store.append_cache_index(b, &key).unwrap();
        store.append_cache_index(a, &key).unwrap();

        assert_eq!(store.remove_cache_index_entries(&key, &[a]).unwrap(), 2);
        assert_eq!(store.remove_cache_index_entries(&key, &[]).unwrap(), 0);
        assert_eq!(store.load_cache_index(&key, 10).unwrap(), vec![b]);
    }
}
