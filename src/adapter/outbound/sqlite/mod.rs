//! SQLite persistence adapters.
//!
//! Provides the SQLite-backed order store, including the persisted cache
//! index used for recovery, using Diesel ORM.

pub mod database;
pub mod store;

pub use database::connection::{create_pool, run_migrations, DbPool};
pub use store::SqliteOrderStore;
