//! Route handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use super::HttpState;
use crate::application::query::QueryError;
use crate::domain::Order;

/// `GET /orders/{id}`
pub async fn get_order(
    State(state): State<HttpState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Order>, QueryError> {
    state.query.lookup(&raw_id).await.map(Json)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cached: usize,
    pub capacity: usize,
}

/// `GET /health`
pub async fn health(State(state): State<HttpState>) -> Json<HealthResponse> {
    let cache = state.query.cache();
    Json(HealthResponse {
        status: "ok",
        cached: cache.len(),
        capacity: cache.capacity(),
    })
}
