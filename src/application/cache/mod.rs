//! In-memory caches.

pub mod order;

pub use order::OrderCache;
