//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Order fixtures with a fixed timestamp.
//! - [`db`] - `TempDb`, a migrated file-backed SQLite database.
//! - [`config`] - Canonical test configurations.
//! - [`stream`] - Acknowledgement recorders and hand-built deliveries.

pub mod config;
pub mod db;
pub mod domain;
pub mod stream;
