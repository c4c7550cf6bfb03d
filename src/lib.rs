//! Ordercache - durable order ingestion with a restart-safe lookup cache.
//!
//! Orders arrive as JSON documents on a durable publish/subscribe subject.
//! Each one is written atomically across a normalized SQLite schema, its id
//! is appended to a persisted cache index, and the aggregate is placed in a
//! bounded in-memory cache that serves `GET /orders/{id}`.
//!
//! # Architecture
//!
//! - **`domain`** - The order aggregate and identifier types
//! - **`port`** - Store and stream traits
//! - **`application`** - Cache, recovery, consumer, query and runtime
//! - **`adapter`** - SQLite store, NATS JetStream broker, HTTP endpoint, CLI
//! - **`infrastructure`** - Configuration loading and logging setup
//!
//! # Example
//!
//! ```no_run
//! use ordercache::application::runtime;
//! use ordercache::infrastructure::config::settings::Config;
//!
//! # async fn example() -> ordercache::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! config.init_logging();
//! runtime::run(config, runtime::RunOptions::default()).await
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
