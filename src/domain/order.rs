//! The order aggregate as carried on the stream and returned to readers.
//!
//! Field names double as the wire format: an inbound stream payload is a JSON
//! document with exactly these keys, and the read endpoint returns the same
//! shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root of the aggregate: scalar attributes plus the owned delivery, payment
/// and item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<Item>,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: DateTime<Utc>,
    pub oof_shard: String,
}

/// Recipient and address; exactly one per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment record; exactly one per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    /// Unix seconds.
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

/// A single line of the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    pub sale: i64,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i64,
}

impl Order {
    /// Decode an order from a stream payload.
    ///
    /// # Errors
    /// Returns [`Error::Decode`](crate::error::Error::Decode) when the payload
    /// is not a complete order document.
    pub fn from_json(payload: &[u8]) -> crate::error::Result<Self> {
        serde_json::from_slice(payload).map_err(crate::error::Error::Decode)
    }

    /// Encode the order as a stream payload.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
