//! Point lookups: cache first, store on a miss.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::cache::OrderCache;
use crate::domain::{Order, OrderId};
use crate::error::Error;
use crate::port::outbound::store::OrderStore;

/// Why a lookup produced no order.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid order id: {0:?}")]
    InvalidId(String),

    #[error("order {0} not found")]
    NotFound(OrderId),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Read side of the service.
pub struct OrderQuery {
    store: Arc<dyn OrderStore>,
    cache: Arc<OrderCache>,
    read_through: bool,
}

impl OrderQuery {
    pub fn new(store: Arc<dyn OrderStore>, cache: Arc<OrderCache>, read_through: bool) -> Self {
        Self {
            store,
            cache,
            read_through,
        }
    }

    /// Look up an order by its textual identifier.
    ///
    /// # Errors
    /// `InvalidId` when `raw_id` is not an integer, `NotFound` when neither
    /// the cache nor the store has it, `Internal` for store faults.
    pub async fn lookup(&self, raw_id: &str) -> Result<Order, QueryError> {
        let id: OrderId = raw_id
            .parse()
            .map_err(|_| QueryError::InvalidId(raw_id.to_string()))?;
        self.find(id).await
    }

    /// Look up an order by store identifier.
    ///
    /// # Errors
    /// See [`OrderQuery::lookup`].
    pub async fn find(&self, id: OrderId) -> Result<Order, QueryError> {
        if let Some(order) = self.cache.get(id) {
            debug!(order_id = %id, "Cache hit");
            return Ok(order);
        }

        let store = Arc::clone(&self.store);
        let loaded = tokio::task::spawn_blocking(move || store.read_order(id))
            .await
            .map_err(|e| QueryError::Internal(e.to_string()))?;

        match loaded {
            Ok(order) => {
                debug!(
                    order_id = %id,
                    read_through = self.read_through,
                    "Cache miss served from store"
                );
                if self.read_through {
                    self.cache.put(id, order.clone());
                }
                Ok(order)
            }
            Err(Error::NotFound(_)) => Err(QueryError::NotFound(id)),
            Err(e) => Err(QueryError::Internal(e.to_string())),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &OrderCache {
        &self.cache
    }
}
