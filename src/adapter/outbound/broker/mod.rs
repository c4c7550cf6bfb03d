//! Stream broker adapters.
//!
//! [`JetStreamBroker`] talks to a NATS server and is what the service runs
//! against. `MemoryBroker` keeps the same delivery contract in process
//! memory for tests.

pub mod jetstream;
#[cfg(any(test, feature = "testkit"))]
pub mod memory;

pub use jetstream::JetStreamBroker;
#[cfg(any(test, feature = "testkit"))]
pub use memory::MemoryBroker;
