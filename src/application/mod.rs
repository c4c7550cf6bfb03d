//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod cache;
pub mod consumer;
pub mod publisher;
pub mod query;
pub mod recovery;
pub mod runtime;
