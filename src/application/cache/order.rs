//! Bounded order cache with insertion-order eviction.

use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};

use crate::domain::{Order, OrderId};

struct Inner {
    entries: HashMap<OrderId, Order>,
    /// Keys in insertion order, oldest at the front.
    queue: VecDeque<OrderId>,
}

/// Thread-safe cache of at most `capacity` orders.
///
/// When a new key would exceed capacity the oldest inserted key is evicted.
/// Overwriting a key keeps its position and lookups never reorder, so this
/// is FIFO rather than LRU. One lock guards both the map and the queue,
/// which keeps them in step.
pub struct OrderCache {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl OrderCache {
    /// Create an empty cache. A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::with_capacity(capacity),
                queue: VecDeque::with_capacity(capacity),
            }),
            capacity,
        }
    }

    /// Insert or overwrite `id`.
    ///
    /// Returns the key evicted to make room, if any.
    pub fn put(&self, id: OrderId, order: Order) -> Option<OrderId> {
        let mut inner = self.inner.write();

        if let Some(slot) = inner.entries.get_mut(&id) {
            *slot = order;
            return None;
        }

        let evicted = if inner.entries.len() >= self.capacity {
            let oldest = inner.queue.pop_front();
            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
            }
            oldest
        } else {
            None
        };

        inner.entries.insert(id, order);
        inner.queue.push_back(id);
        evicted
    }

    /// Get a snapshot of a cached order.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.inner.read().entries.get(&id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.inner.read().entries.contains_key(&id)
    }

    /// Replace the contents with recovered orders.
    ///
    /// `ordered_ids` runs oldest first. Ids without an entry are skipped,
    /// repeated ids keep their first position, and only the newest
    /// `capacity` ids survive.
    pub fn load(&self, mut entries: HashMap<OrderId, Order>, ordered_ids: &[OrderId]) {
        let mut kept: Vec<(OrderId, Order)> = Vec::with_capacity(ordered_ids.len());
        for id in ordered_ids {
            if let Some(order) = entries.remove(id) {
                kept.push((*id, order));
            }
        }
        let skip = kept.len().saturating_sub(self.capacity);

        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.queue.clear();
        for (id, order) in kept.into_iter().skip(skip) {
            inner.entries.insert(id, order);
            inner.queue.push_back(id);
        }
    }

    /// Number of cached orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Returns true if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached keys, oldest first.
    #[must_use]
    pub fn queue_snapshot(&self) -> Vec<OrderId> {
        self.inner.read().queue.iter().copied().collect()
    }
}
