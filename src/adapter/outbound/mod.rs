//! Outbound adapters (driven side).

pub mod broker;
pub mod sqlite;
