//! Stream endpoint and durable subscription settings.

use std::time::Duration;

use serde::Deserialize;

use crate::port::outbound::stream::SubscribeOptions;

/// Stream endpoint and durable subscription configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// NATS server URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// JetStream stream holding the order subject.
    #[serde(default = "default_cluster_id")]
    pub cluster_id: String,
    /// Connection name presented to the server.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Subject carrying order documents.
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Durable name; restarts resume from the first unacknowledged message.
    #[serde(default = "default_durable_name")]
    pub durable_name: String,
    /// Seconds before an unacknowledged delivery is redelivered.
    #[serde(default = "default_ack_wait_secs")]
    pub ack_wait_secs: u64,
    /// Maximum outstanding unacknowledged deliveries.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Delay between reconnect attempts after the connection drops.
    #[serde(default = "default_reconnect_wait_secs")]
    pub reconnect_wait_secs: u64,
    /// Interval between keepalive pings.
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}

fn default_cluster_id() -> String {
    "test-cluster".to_string()
}

fn default_client_id() -> String {
    "ordercache".to_string()
}

fn default_subject() -> String {
    "orders".to_string()
}

fn default_durable_name() -> String {
    "ordercache-durable".to_string()
}

const fn default_ack_wait_secs() -> u64 {
    30
}

const fn default_max_in_flight() -> usize {
    1024
}

const fn default_connect_timeout_secs() -> u64 {
    4
}

const fn default_reconnect_wait_secs() -> u64 {
    4
}

const fn default_ping_interval_secs() -> u64 {
    5
}

impl StreamConfig {
    /// Subscription options derived from this configuration.
    #[must_use]
    pub fn subscribe_options(&self) -> SubscribeOptions {
        SubscribeOptions {
            ack_wait: Duration::from_secs(self.ack_wait_secs),
            max_in_flight: self.max_in_flight,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            cluster_id: default_cluster_id(),
            client_id: default_client_id(),
            subject: default_subject(),
            durable_name: default_durable_name(),
            ack_wait_secs: default_ack_wait_secs(),
            max_in_flight: default_max_in_flight(),
            connect_timeout_secs: default_connect_timeout_secs(),
            reconnect_wait_secs: default_reconnect_wait_secs(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}
