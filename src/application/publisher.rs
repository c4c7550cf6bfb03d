//! Demonstration publisher.
//!
//! Emits one fixed order so a fresh deployment has something to serve.

use chrono::Utc;
use tracing::info;

use crate::domain::{Delivery, Item, Order, Payment};
use crate::error::Result;
use crate::port::outbound::stream::MessagePublisher;

/// The demonstration order: three items, a USD PayPal payment and a New
/// York delivery, stamped with the current time.
#[must_use]
pub fn sample_order() -> Order {
    Order {
        order_uid: "123456".to_string(),
        track_number: "ABC123".to_string(),
        entry: "Test".to_string(),
        delivery: Delivery {
            name: "John Doe".to_string(),
            phone: "1234567890".to_string(),
            zip: "12345".to_string(),
            city: "New York".to_string(),
            address: "123 Main St".to_string(),
            region: "NY".to_string(),
            email: "johndoe@example.com".to_string(),
        },
        payment: Payment {
            transaction: "ABCDEF".to_string(),
            request_id: "123456789".to_string(),
            currency: "USD".to_string(),
            provider: "PayPal".to_string(),
            amount: 100,
            payment_dt: 1_630_000_000,
            bank: "Bank of America".to_string(),
            delivery_cost: 10,
            goods_total: 90,
            custom_fee: 5,
        },
        items: vec![
            item(1, "ABC123", 50, "abc123", "M"),
            item(2, "DEF456", 30, "def456", "L"),
            item(3, "GHI789", 20, "ghi789", "S"),
        ],
        locale: "en_US".to_string(),
        internal_signature: "abcdef123456".to_string(),
        customer_id: "987654321".to_string(),
        delivery_service: "UPS".to_string(),
        shardkey: "shard1".to_string(),
        sm_id: 123,
        date_created: Utc::now(),
        oof_shard: "shard2".to_string(),
    }
}

fn item(n: i64, track_number: &str, price: i64, rid: &str, size: &str) -> Item {
    Item {
        chrt_id: n,
        track_number: track_number.to_string(),
        price,
        rid: rid.to_string(),
        name: format!("Item {n}"),
        sale: 0,
        size: size.to_string(),
        total_price: price,
        nm_id: n,
        brand: format!("Brand {n}"),
        status: 1,
    }
}

/// Publish [`sample_order`] to `subject`, returning its sequence.
///
/// # Errors
/// Returns an error if encoding or publishing fails.
pub async fn publish_sample(publisher: &dyn MessagePublisher, subject: &str) -> Result<u64> {
    let order = sample_order();
    let sequence = publisher.publish(subject, order.to_json()?).await?;
    info!(subject, sequence, order_uid = %order.order_uid, "Sample order published");
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::broker::MemoryBroker;
    use crate::port::outbound::stream::{MessageStream, SubscribeOptions};

    #[test]
    fn sample_has_three_items_and_paypal_payment() {
        let order = sample_order();
        assert_eq!(order.items.len(), 3);
        assert_eq!(order.payment.provider, "PayPal");
        assert_eq!(order.payment.currency, "USD");
        assert_eq!(order.delivery.city, "New York");
        let total: i64 = order.items.iter().map(|i| i.total_price).sum();
        assert_eq!(total, order.payment.amount);
    }

    #[tokio::test]
    async fn published_sample_decodes_on_the_subject() {
        let broker = MemoryBroker::new();

        let sequence = publish_sample(&broker, "orders").await.unwrap();

        let mut sub = broker
            .subscribe("orders", "check", SubscribeOptions::default())
            .await
            .unwrap();
        let message = sub.next_message().await.unwrap();
        assert_eq!(message.sequence(), sequence);
        let decoded = Order::from_json(message.payload()).unwrap();
        assert_eq!(decoded.order_uid, "123456");
    }
}
