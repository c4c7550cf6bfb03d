//! Order fixtures used across tests.
//!
//! The timestamp is fixed at whole seconds so aggregates compare equal after
//! a trip through the store.

use chrono::{TimeZone, Utc};

use crate::domain::{Delivery, Item, Order, Payment};

/// A complete order with two items.
pub fn sample_order() -> Order {
    Order {
        order_uid: "b563feb7b2b84b6test".to_string(),
        track_number: "WBILMTESTTRACK".to_string(),
        entry: "WBIL".to_string(),
        delivery: Delivery {
            name: "Test Testov".to_string(),
            phone: "+9720000000".to_string(),
            zip: "2639809".to_string(),
            city: "Kiryat Mozkin".to_string(),
            address: "Ploshad Mira 15".to_string(),
            region: "Kraiot".to_string(),
            email: "test@gmail.com".to_string(),
        },
        payment: Payment {
            transaction: "b563feb7b2b84b6test".to_string(),
            request_id: String::new(),
            currency: "USD".to_string(),
            provider: "wbpay".to_string(),
            amount: 1817,
            payment_dt: 1_637_907_727,
            bank: "alpha".to_string(),
            delivery_cost: 1500,
            goods_total: 317,
            custom_fee: 0,
        },
        items: vec![
            item(9_934_930, "Mascaras", "Vivienne Sabo", 453),
            item(9_934_931, "Lipstick", "Divage", 210),
        ],
        locale: "en".to_string(),
        internal_signature: String::new(),
        customer_id: "test".to_string(),
        delivery_service: "meest".to_string(),
        shardkey: "9".to_string(),
        sm_id: 99,
        date_created: Utc
            .with_ymd_and_hms(2021, 11, 26, 6, 22, 19)
            .single()
            .unwrap_or_default(),
        oof_shard: "1".to_string(),
    }
}

/// [`sample_order`] under a different UID.
pub fn order_with_uid(uid: &str) -> Order {
    let mut order = sample_order();
    order.order_uid = uid.to_string();
    order.payment.transaction = uid.to_string();
    order
}

fn item(chrt_id: i64, name: &str, brand: &str, price: i64) -> Item {
    Item {
        chrt_id,
        track_number: "WBILMTESTTRACK".to_string(),
        price,
        rid: format!("rid-{chrt_id}"),
        name: name.to_string(),
        sale: 30,
        size: "0".to_string(),
        total_price: price * 7 / 10,
        nm_id: 2_389_212,
        brand: brand.to_string(),
        status: 202,
    }
}
