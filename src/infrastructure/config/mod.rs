//! Infrastructure configuration modules.

pub mod cache;
pub mod database;
pub mod http;
pub mod logging;
pub mod settings;
pub mod stream;
