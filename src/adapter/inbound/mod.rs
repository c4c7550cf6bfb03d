//! Inbound adapters (driving side): the HTTP read endpoint and the CLI.

pub mod cli;
pub mod http;
