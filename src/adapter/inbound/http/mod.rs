//! HTTP read endpoint.
//!
//! - `GET /orders/{id}` returns the order aggregate as JSON.
//! - `GET /health` reports cache occupancy.
//!
//! Responses allow any origin.

pub mod error;
pub mod handler;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::application::query::OrderQuery;
use crate::error::Result;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct HttpState {
    pub query: Arc<OrderQuery>,
}

/// Build the read router.
pub fn router(query: Arc<OrderQuery>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/orders/{id}", get(handler::get_order))
        .route("/health", get(handler::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(HttpState { query })
}

/// Serve `router` on `listener` until `shutdown` flips to true.
///
/// In-flight requests finish before this returns.
///
/// # Errors
/// Returns an error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;
    info!("HTTP server stopped");
    Ok(())
}
