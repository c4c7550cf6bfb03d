//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (relational store, message stream).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Cache / Consumer /     ├──────────────┐
//!     │              │  Query / Recovery       │              │
//!     │              └─────────────────────────┘              │
//!     ▼                                                       ▼
//! ┌─────────────┐                                     ┌─────────────┐
//! │   Store     │                                     │   Stream    │
//! │  (SQLite)   │                                     │   (NATS)    │
//! └─────────────┘                                     └─────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`OrderStore`] - Aggregate persistence and the persisted cache index
//! - [`MessageStream`], [`Subscription`], [`MessagePublisher`] - Durable stream

pub mod outbound;

pub use outbound::store::OrderStore;
pub use outbound::stream::{
    Acknowledger, MessagePublisher, MessageStream, StreamMessage, SubscribeOptions, Subscription,
};
