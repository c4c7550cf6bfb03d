//! NATS JetStream broker.
//!
//! `cluster_id` names the JetStream stream that stores the order subject and
//! `client_id` is the connection name reported to the server. Subscriptions
//! are durable pull consumers with explicit acknowledgement, so their
//! position lives on the server and survives a restart of this process.

use std::fmt::Display;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_nats::jetstream::consumer::{pull, AckPolicy, DeliverPolicy, PullConsumer};
use async_nats::jetstream::{self, stream};
use async_nats::{ConnectOptions, Event};
use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::infrastructure::config::stream::StreamConfig;
use crate::port::outbound::stream::{
    Acknowledger, MessagePublisher, MessageStream, StreamMessage, SubscribeOptions, Subscription,
};

fn stream_err<E: Display>(step: &'static str) -> impl Fn(E) -> Error {
    move |e| Error::Stream(format!("{step}: {e}"))
}

fn connect_options(config: &StreamConfig) -> ConnectOptions {
    let reconnect_wait = Duration::from_secs(config.reconnect_wait_secs);
    ConnectOptions::new()
        .name(&config.client_id)
        .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
        .ping_interval(Duration::from_secs(config.ping_interval_secs))
        .reconnect_delay_callback(move |_attempts| reconnect_wait)
        .event_callback(|event| async move {
            match event {
                Event::Disconnected => warn!("Stream connection lost"),
                Event::Connected => info!("Stream connection established"),
                other => debug!(event = ?other, "Stream client event"),
            }
        })
}

/// Stream definition backing the configured subject.
pub(crate) fn stream_config(config: &StreamConfig) -> stream::Config {
    stream::Config {
        name: config.cluster_id.clone(),
        subjects: vec![config.subject.clone()],
        ..Default::default()
    }
}

/// Durable pull consumer for `subject`.
///
/// A durable seen for the first time starts at the beginning of the stream.
pub(crate) fn consumer_config(
    subject: &str,
    durable_name: &str,
    options: SubscribeOptions,
) -> pull::Config {
    pull::Config {
        durable_name: Some(durable_name.to_string()),
        filter_subject: subject.to_string(),
        deliver_policy: DeliverPolicy::All,
        ack_policy: AckPolicy::Explicit,
        ack_wait: options.ack_wait,
        max_ack_pending: i64::try_from(options.max_in_flight).unwrap_or(i64::MAX),
        ..Default::default()
    }
}

/// Broker client for a NATS server with JetStream enabled.
pub struct JetStreamBroker {
    context: jetstream::Context,
    stream: stream::Stream,
}

impl JetStreamBroker {
    /// Connect to `config.url` and make sure the stream for the configured
    /// subject exists.
    ///
    /// # Errors
    /// Returns `Error::Stream` if the server is unreachable or refuses the
    /// stream definition.
    pub async fn connect(config: &StreamConfig) -> Result<Self> {
        let client = connect_options(config)
            .connect(config.url.as_str())
            .await
            .map_err(stream_err("connect"))?;
        let context = jetstream::new(client);
        let stream = context
            .get_or_create_stream(stream_config(config))
            .await
            .map_err(stream_err("create stream"))?;

        info!(
            url = %config.url,
            cluster_id = %config.cluster_id,
            client_id = %config.client_id,
            subject = %config.subject,
            "Connected to order stream"
        );
        Ok(Self { context, stream })
    }
}

#[async_trait]
impl MessagePublisher for JetStreamBroker {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<u64> {
        let ack = self
            .context
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(stream_err("publish"))?
            .await
            .map_err(stream_err("publish ack"))?;
        debug!(subject, sequence = ack.sequence, "Message published");
        Ok(ack.sequence)
    }
}

#[async_trait]
impl MessageStream for JetStreamBroker {
    async fn subscribe(
        &self,
        subject: &str,
        durable_name: &str,
        options: SubscribeOptions,
    ) -> Result<Box<dyn Subscription>> {
        let consumer: PullConsumer = self
            .stream
            .get_or_create_consumer(durable_name, consumer_config(subject, durable_name, options))
            .await
            .map_err(stream_err("create consumer"))?;
        let messages = consumer
            .messages()
            .await
            .map_err(stream_err("open consumer"))?;

        Ok(Box::new(JetStreamSubscription {
            subject: subject.to_string(),
            durable_name: durable_name.to_string(),
            stream: self.stream.clone(),
            messages: Box::pin(messages),
        }))
    }
}

struct JetStreamAcker {
    message: jetstream::Message,
}

#[async_trait]
impl Acknowledger for JetStreamAcker {
    async fn ack(&self, _sequence: u64) -> Result<()> {
        self.message.ack().await.map_err(stream_err("ack"))
    }
}

struct JetStreamSubscription {
    subject: String,
    durable_name: String,
    stream: stream::Stream,
    messages: Pin<Box<pull::Stream>>,
}

#[async_trait]
impl Subscription for JetStreamSubscription {
    async fn next_message(&mut self) -> Option<StreamMessage> {
        loop {
            let message = match self.messages.next().await? {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, durable_name = %self.durable_name, "Stream pull failed");
                    continue;
                }
            };
            let (sequence, redelivered) = match message.info() {
                Ok(info) => (info.stream_sequence, info.delivered > 1),
                Err(e) => {
                    warn!(error = %e, "Delivery without stream metadata skipped");
                    continue;
                }
            };
            let subject = message.message.subject.to_string();
            let payload = message.message.payload.to_vec();
            return Some(StreamMessage::new(
                sequence,
                subject,
                payload,
                redelivered,
                Arc::new(JetStreamAcker { message }),
            ));
        }
    }

    fn subject(&self) -> &str {
        &self.subject
    }

    fn durable_name(&self) -> &str {
        &self.durable_name
    }

    async fn close(self: Box<Self>) -> Result<()> {
        debug!(durable_name = %self.durable_name, "Subscription closed");
        Ok(())
    }

    async fn unsubscribe(self: Box<Self>) -> Result<()> {
        self.stream
            .delete_consumer(&self.durable_name)
            .await
            .map_err(stream_err("delete consumer"))?;
        debug!(durable_name = %self.durable_name, "Durable consumer deleted");
        Ok(())
    }
}
