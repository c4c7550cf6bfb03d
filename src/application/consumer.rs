//! Stream consumer: turns deliveries into durable, cached orders.
//!
//! A delivery is acknowledged only after the aggregate is persisted, its id
//! appended to the cache index and the cache updated. Anything else leaves
//! the message unacknowledged and the broker redelivers it after the ack
//! wait.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::cache::OrderCache;
use crate::domain::{AppKey, Order, OrderId};
use crate::error::{Error, Result};
use crate::port::outbound::store::OrderStore;
use crate::port::outbound::stream::{StreamMessage, Subscription};

/// Outcome of a handled delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// A new aggregate was written.
    Stored(OrderId),
    /// The UID was already stored under this id; nothing new was written.
    Duplicate(OrderId),
}

impl Ingested {
    #[must_use]
    pub fn id(self) -> OrderId {
        match self {
            Self::Stored(id) | Self::Duplicate(id) => id,
        }
    }
}

/// Ingests order deliveries into the store and cache.
pub struct OrderConsumer {
    store: Arc<dyn OrderStore>,
    cache: Arc<OrderCache>,
    app_key: AppKey,
}

impl OrderConsumer {
    pub fn new(store: Arc<dyn OrderStore>, cache: Arc<OrderCache>, app_key: AppKey) -> Self {
        Self {
            store,
            cache,
            app_key,
        }
    }

    /// Handle one delivery and acknowledge it on success.
    ///
    /// # Errors
    /// Returns the first failing stage. The message is left unacknowledged.
    pub async fn handle(&self, message: &StreamMessage) -> Result<Ingested> {
        let order = Order::from_json(message.payload())?;
        debug!(sequence = message.sequence(), order_uid = %order.order_uid, "Order decoded");

        let store = Arc::clone(&self.store);
        let cache = Arc::clone(&self.cache);
        let app_key = self.app_key.clone();
        let outcome = tokio::task::spawn_blocking(move || ingest(&*store, &cache, &app_key, order))
            .await
            .map_err(|e| Error::Persistence(format!("ingest task failed: {e}")))??;

        message.ack().await?;
        debug!(sequence = message.sequence(), order_id = %outcome.id(), "Delivery acknowledged");
        Ok(outcome)
    }

    /// Consume `subscription` until shutdown or the stream ends.
    ///
    /// Deliveries are handled one at a time. The subscription is closed on
    /// exit so the durable position survives a restart.
    ///
    /// # Errors
    /// Returns an error only if the subscription fails to close.
    pub async fn run(
        &self,
        mut subscription: Box<dyn Subscription>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        info!(
            subject = subscription.subject(),
            durable_name = subscription.durable_name(),
            "Consumer started"
        );

        while !*shutdown.borrow() {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                message = subscription.next_message() => {
                    let Some(message) = message else {
                        info!("Stream ended");
                        break;
                    };
                    self.process(&message).await;
                }
            }
        }

        subscription.close().await?;
        info!("Consumer stopped");
        Ok(())
    }

    async fn process(&self, message: &StreamMessage) {
        match self.handle(message).await {
            Ok(Ingested::Stored(id)) => {
                info!(order_id = %id, sequence = message.sequence(), "Order ingested");
            }
            Ok(Ingested::Duplicate(id)) => {
                info!(
                    order_id = %id,
                    sequence = message.sequence(),
                    redelivered = message.redelivered(),
                    "Duplicate order acknowledged"
                );
            }
            Err(e) => {
                warn!(
                    sequence = message.sequence(),
                    error = %e,
                    "Delivery not acknowledged, awaiting redelivery"
                );
            }
        }
    }
}

fn ingest(
    store: &dyn OrderStore,
    cache: &OrderCache,
    app_key: &AppKey,
    order: Order,
) -> Result<Ingested> {
    match store.write_order(&order) {
        Ok(id) => {
            store.append_cache_index(id, app_key)?;
            if let Some(evicted) = cache.put(id, order) {
                debug!(order_id = %id, evicted = %evicted, "Cache evicted oldest order");
            }
            Ok(Ingested::Stored(id))
        }
        Err(Error::DuplicateOrder { uid, id }) => {
            if !cache.contains(id) {
                store.append_cache_index(id, app_key)?;
                let stored = store.read_order(id)?;
                cache.put(id, stored);
                debug!(order_id = %id, order_uid = %uid, "Duplicate order re-cached");
            }
            Ok(Ingested::Duplicate(id))
        }
        Err(e) => Err(e),
    }
}
