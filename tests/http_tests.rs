//! Read endpoint status mapping and read-through behavior.

mod support;

use std::sync::Arc;

use axum::http::StatusCode;
use ordercache::adapter::inbound::http::router;
use ordercache::application::cache::OrderCache;
use ordercache::application::query::OrderQuery;
use ordercache::domain::{AppKey, Order, OrderId};
use ordercache::error::{Error, Result};
use ordercache::port::outbound::store::OrderStore;
use ordercache::testkit::domain::sample_order;
use serde_json::Value;

use support::{get, TempDb};

fn app(store: Arc<dyn OrderStore>, cache: Arc<OrderCache>) -> axum::Router {
    router(Arc::new(OrderQuery::new(store, cache, true)))
}

/// Store whose reads fail with a database fault.
struct FaultyStore;

impl OrderStore for FaultyStore {
    fn write_order(&self, _: &Order) -> Result<OrderId> {
        Err(Error::Persistence("read-only".into()))
    }
    fn read_order(&self, _: OrderId) -> Result<Order> {
        Err(Error::Database("disk I/O error".into()))
    }
    fn append_cache_index(&self, _: OrderId, _: &AppKey) -> Result<()> {
        Ok(())
    }
    fn load_cache_index(&self, app_key: &AppKey, _: usize) -> Result<Vec<OrderId>> {
        Err(Error::EmptyCacheIndex {
            app_key: app_key.to_string(),
        })
    }
    fn clear_cache_index(&self, _: &AppKey) -> Result<usize> {
        Ok(0)
    }
    fn remove_cache_index_entries(&self, _: &AppKey, _: &[OrderId]) -> Result<usize> {
        Ok(0)
    }
}

#[tokio::test]
async fn stored_order_is_returned_as_json() {
    let db = TempDb::create("it-http-ok");
    let store = db.store();
    let id = store.write_order(&sample_order()).unwrap();
    let cache = Arc::new(OrderCache::new(4));
    let app = app(Arc::new(store), Arc::clone(&cache));

    let (status, headers, body) = get(&app, &format!("/orders/{id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["access-control-allow-origin"], "*");
    let order: Order = serde_json::from_slice(&body).unwrap();
    assert_eq!(order, sample_order());
    assert!(cache.contains(id), "miss should populate the cache");
}

#[tokio::test]
async fn wire_names_are_preserved() {
    let db = TempDb::create("it-http-wire");
    let store = db.store();
    let id = store.write_order(&sample_order()).unwrap();
    let app = app(Arc::new(store), Arc::new(OrderCache::new(4)));

    let (_, _, body) = get(&app, &format!("/orders/{id}")).await;
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["order_uid"], "b563feb7b2b84b6test");
    assert_eq!(json["payment"]["transaction"], "b563feb7b2b84b6test");
    assert_eq!(json["items"][0]["chrt_id"], 9_934_930);
    assert_eq!(json["date_created"], "2021-11-26T06:22:19Z");
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let db = TempDb::create("it-http-400");
    let app = app(Arc::new(db.store()), Arc::new(OrderCache::new(4)));

    let (status, _, body) = get(&app, "/orders/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let db = TempDb::create("it-http-404");
    let app = app(Arc::new(db.store()), Arc::new(OrderCache::new(4)));

    let (status, _, _) = get(&app, "/orders/123").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_fault_is_internal_error_without_details() {
    let app = app(Arc::new(FaultyStore), Arc::new(OrderCache::new(4)));

    let (status, _, body) = get(&app, "/orders/5").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body).unwrap();
    assert!(!text.contains("disk I/O"));
}

#[tokio::test]
async fn cached_order_is_served_without_store() {
    let cache = Arc::new(OrderCache::new(4));
    cache.put(OrderId::new(5), sample_order());
    let app = app(Arc::new(FaultyStore), Arc::clone(&cache));

    let (status, _, _) = get(&app, "/orders/5").await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_reports_cache_occupancy() {
    let cache = Arc::new(OrderCache::new(4));
    cache.put(OrderId::new(1), sample_order());
    let app = app(Arc::new(FaultyStore), cache);

    let (status, _, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["cached"], 1);
    assert_eq!(json["capacity"], 4);
}
