//! Hand-built stream deliveries for consumer tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::port::outbound::stream::{Acknowledger, StreamMessage};

/// Records every acknowledged sequence.
#[derive(Default)]
pub struct RecordingAcker {
    acked: Mutex<Vec<u64>>,
    fail: bool,
}

impl RecordingAcker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// An acker whose every acknowledgement fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            acked: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn acked(&self) -> Vec<u64> {
        self.acked.lock().clone()
    }

    pub fn was_acked(&self, sequence: u64) -> bool {
        self.acked.lock().contains(&sequence)
    }
}

#[async_trait]
impl Acknowledger for RecordingAcker {
    async fn ack(&self, sequence: u64) -> Result<()> {
        if self.fail {
            return Err(Error::Stream("ack rejected".to_string()));
        }
        self.acked.lock().push(sequence);
        Ok(())
    }
}

/// A first delivery of `payload` on subject `orders`.
pub fn message(sequence: u64, payload: Vec<u8>, acker: Arc<RecordingAcker>) -> StreamMessage {
    StreamMessage::new(sequence, "orders", payload, false, acker)
}
