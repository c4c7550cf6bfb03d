//! In-process durable broker used as a test double.
//!
//! Each subject is an append-only log with 1-based sequences. Each
//! `(subject, durable_name)` pair owns a cursor: the next sequence to hand
//! out plus the deliveries still awaiting acknowledgement. A cursor outlives
//! the subscription that created it until it is explicitly unsubscribed.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};
use crate::port::outbound::stream::{
    Acknowledger, MessagePublisher, MessageStream, StreamMessage, SubscribeOptions, Subscription,
};

type CursorKey = (String, String);

#[derive(Default)]
struct Cursor {
    /// Next never-delivered sequence.
    next: u64,
    /// Delivered but unacknowledged sequences and their redelivery deadlines.
    pending: BTreeMap<u64, Instant>,
    active: bool,
}

#[derive(Default)]
struct State {
    subjects: HashMap<String, Vec<Arc<Vec<u8>>>>,
    cursors: HashMap<CursorKey, Cursor>,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    notify: Notify,
}

impl Shared {
    fn wake(&self) {
        self.notify.notify_waiters();
    }
}

/// Durable at-least-once broker living in process memory.
///
/// Cloning yields another handle to the same broker.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    shared: Arc<Shared>,
}

impl MemoryBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// End every subscription; pending `next_message` calls return `None`.
    pub fn shutdown(&self) {
        self.shared.state.lock().closed = true;
        self.shared.wake();
        debug!("Broker shut down");
    }

    /// Number of messages ever published to `subject`.
    #[must_use]
    pub fn published(&self, subject: &str) -> usize {
        self.shared
            .state
            .lock()
            .subjects
            .get(subject)
            .map_or(0, Vec::len)
    }

    /// Unacknowledged deliveries held by a durable cursor.
    #[must_use]
    pub fn pending(&self, subject: &str, durable_name: &str) -> usize {
        let key = (subject.to_string(), durable_name.to_string());
        self.shared
            .state
            .lock()
            .cursors
            .get(&key)
            .map_or(0, |cursor| cursor.pending.len())
    }
}

#[async_trait]
impl MessagePublisher for MemoryBroker {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<u64> {
        let sequence = {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(Error::Stream("broker is shut down".to_string()));
            }
            let log = state.subjects.entry(subject.to_string()).or_default();
            log.push(Arc::new(payload));
            log.len() as u64
        };
        self.shared.wake();
        debug!(subject, sequence, "Message published");
        Ok(sequence)
    }
}

#[async_trait]
impl MessageStream for MemoryBroker {
    async fn subscribe(
        &self,
        subject: &str,
        durable_name: &str,
        options: SubscribeOptions,
    ) -> Result<Box<dyn Subscription>> {
        let key = (subject.to_string(), durable_name.to_string());
        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(Error::Stream("broker is shut down".to_string()));
            }
            let cursor = state.cursors.entry(key.clone()).or_insert_with(|| Cursor {
                next: 1,
                ..Cursor::default()
            });
            if cursor.active {
                return Err(Error::Stream(format!(
                    "durable {durable_name} on {subject} is already subscribed"
                )));
            }
            cursor.active = true;

            // Whatever the previous holder left unacknowledged is due now.
            let now = Instant::now();
            for deadline in cursor.pending.values_mut() {
                *deadline = now;
            }
            debug!(
                subject,
                durable_name,
                next = cursor.next,
                pending = cursor.pending.len(),
                "Durable subscription opened"
            );
        }

        let acker = Arc::new(CursorAcker {
            shared: Arc::clone(&self.shared),
            key: key.clone(),
        });
        Ok(Box::new(MemorySubscription {
            shared: Arc::clone(&self.shared),
            key,
            options,
            acker,
        }))
    }
}

struct CursorAcker {
    shared: Arc<Shared>,
    key: CursorKey,
}

#[async_trait]
impl Acknowledger for CursorAcker {
    async fn ack(&self, sequence: u64) -> Result<()> {
        {
            let mut state = self.shared.state.lock();
            let cursor = state.cursors.get_mut(&self.key).ok_or_else(|| {
                Error::Stream(format!("durable {} no longer exists", self.key.1))
            })?;
            cursor.pending.remove(&sequence);
        }
        self.shared.wake();
        Ok(())
    }
}

enum Next {
    Ready(StreamMessage),
    Wait(Option<Instant>),
    Ended,
}

struct MemorySubscription {
    shared: Arc<Shared>,
    key: CursorKey,
    options: SubscribeOptions,
    acker: Arc<CursorAcker>,
}

impl MemorySubscription {
    fn poll_cursor(&self) -> Next {
        let mut guard = self.shared.state.lock();
        let State {
            subjects,
            cursors,
            closed,
        } = &mut *guard;
        if *closed {
            return Next::Ended;
        }
        let Some(cursor) = cursors.get_mut(&self.key) else {
            return Next::Ended;
        };
        let log = subjects.get(&self.key.0).map_or(&[][..], Vec::as_slice);
        let now = Instant::now();

        let expired = cursor
            .pending
            .iter()
            .find(|(_, deadline)| **deadline <= now)
            .map(|(sequence, _)| *sequence);
        if let Some(sequence) = expired {
            cursor.pending.insert(sequence, now + self.options.ack_wait);
            return Next::Ready(self.message(sequence, log, true));
        }

        if cursor.pending.len() < self.options.max_in_flight && cursor.next <= log.len() as u64 {
            let sequence = cursor.next;
            cursor.next += 1;
            cursor.pending.insert(sequence, now + self.options.ack_wait);
            return Next::Ready(self.message(sequence, log, false));
        }

        Next::Wait(cursor.pending.values().min().copied())
    }

    fn message(&self, sequence: u64, log: &[Arc<Vec<u8>>], redelivered: bool) -> StreamMessage {
        let payload = usize::try_from(sequence - 1)
            .ok()
            .and_then(|index| log.get(index))
            .map(|payload| payload.as_ref().clone())
            .unwrap_or_default();
        StreamMessage::new(
            sequence,
            self.key.0.clone(),
            payload,
            redelivered,
            Arc::clone(&self.acker) as Arc<dyn Acknowledger>,
        )
    }
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn next_message(&mut self) -> Option<StreamMessage> {
        loop {
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.poll_cursor() {
                Next::Ready(message) => return Some(message),
                Next::Ended => return None,
                Next::Wait(Some(deadline)) => {
                    tokio::select! {
                        () = &mut notified => {}
                        () = tokio::time::sleep_until(deadline) => {}
                    }
                }
                Next::Wait(None) => notified.await,
            }
        }
    }

    fn subject(&self) -> &str {
        &self.key.0
    }

    fn durable_name(&self) -> &str {
        &self.key.1
    }

    async fn close(self: Box<Self>) -> Result<()> {
        debug!(subject = %self.key.0, durable_name = %self.key.1, "Durable subscription closed");
        Ok(())
    }

    async fn unsubscribe(self: Box<Self>) -> Result<()> {
        self.shared.state.lock().cursors.remove(&self.key);
        debug!(subject = %self.key.0, durable_name = %self.key.1, "Durable subscription removed");
        Ok(())
    }
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        if let Some(cursor) = self.shared.state.lock().cursors.get_mut(&self.key) {
            cursor.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);

    fn options(ack_wait_ms: u64, max_in_flight: usize) -> SubscribeOptions {
        SubscribeOptions {
            ack_wait: Duration::from_millis(ack_wait_ms),
            max_in_flight,
        }
    }

    async fn next(sub: &mut Box<dyn Subscription>) -> StreamMessage {
        timeout(WAIT, sub.next_message())
            .await
            .expect("delivery within timeout")
            .expect("subscription open")
    }

    #[tokio::test]
    async fn delivers_in_publish_order() {
        let broker = MemoryBroker::new();
        broker.publish("orders", b"one".to_vec()).await.unwrap();
        broker.publish("orders", b"two".to_vec()).await.unwrap();

        let mut sub = broker
            .subscribe("orders", "d", options(10_000, 16))
            .await
            .unwrap();

        let first = next(&mut sub).await;
        let second = next(&mut sub).await;
        assert_eq!((first.sequence(), first.payload()), (1, &b"one"[..]));
        assert_eq!((second.sequence(), second.payload()), (2, &b"two"[..]));
        assert!(!first.redelivered());
    }

    #[tokio::test]
    async fn waiting_subscriber_wakes_on_publish() {
        let broker = MemoryBroker::new();
        let mut sub = broker
            .subscribe("orders", "d", options(10_000, 16))
            .await
            .unwrap();

        let publisher = broker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            publisher.publish("orders", b"late".to_vec()).await.unwrap();
        });

        assert_eq!(next(&mut sub).await.payload(), b"late");
    }

    #[tokio::test]
    async fn unacked_message_is_redelivered_after_ack_wait() {
        let broker = MemoryBroker::new();
        broker.publish("orders", b"x".to_vec()).await.unwrap();
        let mut sub = broker
            .subscribe("orders", "d", options(50, 16))
            .await
            .unwrap();

        let first = next(&mut sub).await;
        let again = next(&mut sub).await;

        assert_eq!(again.sequence(), first.sequence());
        assert!(again.redelivered());
        again.ack().await.unwrap();
        assert_eq!(broker.pending("orders", "d"), 0);
    }

    #[tokio::test]
    async fn acked_message_is_not_redelivered() {
        let broker = MemoryBroker::new();
        broker.publish("orders", b"x".to_vec()).await.unwrap();
        let mut sub = broker
            .subscribe("orders", "d", options(30, 16))
            .await
            .unwrap();

        next(&mut sub).await.ack().await.unwrap();

        let idle = timeout(Duration::from_millis(150), sub.next_message()).await;
        assert!(idle.is_err());
    }

    #[tokio::test]
    async fn resubscribe_resumes_from_first_unacked() {
        let broker = MemoryBroker::new();
        for payload in [b"a", b"b", b"c"] {
            broker.publish("orders", payload.to_vec()).await.unwrap();
        }

        let mut sub = broker
            .subscribe("orders", "d", options(10_000, 16))
            .await
            .unwrap();
        next(&mut sub).await.ack().await.unwrap();
        let unacked = next(&mut sub).await;
        sub.close().await.unwrap();

        let mut sub = broker
            .subscribe("orders", "d", options(10_000, 16))
            .await
            .unwrap();
        let resumed = next(&mut sub).await;
        assert_eq!(resumed.sequence(), unacked.sequence());
        assert!(resumed.redelivered());
        assert_eq!(next(&mut sub).await.payload(), b"c");
    }

    #[tokio::test]
    async fn unsubscribe_forgets_the_position() {
        let broker = MemoryBroker::new();
        broker.publish("orders", b"a".to_vec()).await.unwrap();

        let mut sub = broker
            .subscribe("orders", "d", options(10_000, 16))
            .await
            .unwrap();
        next(&mut sub).await.ack().await.unwrap();
        sub.unsubscribe().await.unwrap();

        let mut sub = broker
            .subscribe("orders", "d", options(10_000, 16))
            .await
            .unwrap();
        assert_eq!(next(&mut sub).await.sequence(), 1);
    }

    #[tokio::test]
    async fn durable_cannot_be_held_twice() {
        let broker = MemoryBroker::new();
        let _held = broker
            .subscribe("orders", "d", options(10_000, 16))
            .await
            .unwrap();

        let second = broker.subscribe("orders", "d", options(10_000, 16)).await;
        assert!(matches!(second, Err(Error::Stream(_))));
    }

    #[tokio::test]
    async fn max_in_flight_bounds_outstanding_deliveries() {
        let broker = MemoryBroker::new();
        broker.publish("orders", b"a".to_vec()).await.unwrap();
        broker.publish("orders", b"b".to_vec()).await.unwrap();
        let mut sub = broker
            .subscribe("orders", "d", options(10_000, 1))
            .await
            .unwrap();

        let first = next(&mut sub).await;
        let blocked = timeout(Duration::from_millis(100), sub.next_message()).await;
        assert!(blocked.is_err());

        first.ack().await.unwrap();
        assert_eq!(next(&mut sub).await.sequence(), 2);
    }

    #[tokio::test]
    async fn shutdown_ends_subscriptions() {
        let broker = MemoryBroker::new();
        let mut sub = broker
            .subscribe("orders", "d", options(10_000, 16))
            .await
            .unwrap();

        let handle = broker.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.shutdown();
        });

        let ended = timeout(WAIT, sub.next_message()).await.unwrap();
        assert!(ended.is_none());
        assert!(broker.publish("orders", Vec::new()).await.is_err());
    }
}
