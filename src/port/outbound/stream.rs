//! Durable publish/subscribe stream port.
//!
//! Delivery is at-least-once: a message that is not acknowledged within the
//! subscription's ack wait is delivered again. Subscriptions are named
//! (durable), so closing and re-subscribing resumes from the first
//! unacknowledged message instead of the start of the subject.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Per-subscription delivery settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Time allowed between delivery and acknowledgement.
    pub ack_wait: Duration,
    /// Maximum outstanding unacknowledged deliveries.
    pub max_in_flight: usize,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            ack_wait: Duration::from_secs(30),
            max_in_flight: 1024,
        }
    }
}

/// Acknowledges deliveries on behalf of a subscription.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    /// Mark `sequence` as processed so it is never delivered again.
    async fn ack(&self, sequence: u64) -> Result<()>;
}

/// A single delivery from a subscription.
pub struct StreamMessage {
    sequence: u64,
    subject: String,
    payload: Vec<u8>,
    redelivered: bool,
    acker: Arc<dyn Acknowledger>,
}

impl StreamMessage {
    pub fn new(
        sequence: u64,
        subject: impl Into<String>,
        payload: Vec<u8>,
        redelivered: bool,
        acker: Arc<dyn Acknowledger>,
    ) -> Self {
        Self {
            sequence,
            subject: subject.into(),
            payload,
            redelivered,
            acker,
        }
    }

    /// Position of the message in its subject.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// True when this message was delivered before and not acknowledged.
    #[must_use]
    pub fn redelivered(&self) -> bool {
        self.redelivered
    }

    /// Acknowledge this delivery.
    ///
    /// # Errors
    /// Returns an error if the broker cannot record the acknowledgement.
    pub async fn ack(&self) -> Result<()> {
        self.acker.ack(self.sequence).await
    }
}

impl fmt::Debug for StreamMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamMessage")
            .field("sequence", &self.sequence)
            .field("subject", &self.subject)
            .field("payload_len", &self.payload.len())
            .field("redelivered", &self.redelivered)
            .finish()
    }
}

/// An open durable subscription.
#[async_trait]
pub trait Subscription: Send {
    /// Receive the next delivery.
    ///
    /// Waits until a message is due. Returns `None` once the stream is shut
    /// down.
    async fn next_message(&mut self) -> Option<StreamMessage>;

    /// Subject this subscription reads.
    fn subject(&self) -> &str;

    /// Durable name this subscription resumes under.
    fn durable_name(&self) -> &str;

    /// Release the subscription but keep the durable position.
    async fn close(self: Box<Self>) -> Result<()>;

    /// Release the subscription and forget the durable position.
    async fn unsubscribe(self: Box<Self>) -> Result<()>;
}

/// Opens durable subscriptions.
#[async_trait]
pub trait MessageStream: Send + Sync {
    /// Subscribe to `subject` under `durable_name`.
    async fn subscribe(
        &self,
        subject: &str,
        durable_name: &str,
        options: SubscribeOptions,
    ) -> Result<Box<dyn Subscription>>;
}

/// Publishes messages to a subject.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Append `payload` to `subject` and return its sequence.
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<u64>;
}
