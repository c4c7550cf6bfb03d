//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: the relational
//! order store and the durable message stream.

pub mod store;
pub mod stream;
