#![allow(dead_code)]

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::NamedTempFile;
use tower::ServiceExt;

pub use ordercache::testkit::db::TempDb;

/// Poll `check` every 10ms until it holds, failing after `timeout`.
pub async fn wait_until<F>(timeout: Duration, mut check: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(timeout, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met before timeout");
}

/// Await `fut`, failing the test if it takes longer than `timeout`.
pub async fn within<T>(timeout: Duration, fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(timeout, fut)
        .await
        .expect("future did not complete before timeout")
}

/// Write `contents` to a temp `.toml` file that lives as long as the guard.
pub fn temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("ordercache-config-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

/// Issue a GET against `router` and return status, headers and raw body.
pub async fn get(router: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .header("origin", "http://example.com")
        .body(Body::empty())
        .expect("build request");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes()
        .to_vec();
    (status, headers, body)
}
