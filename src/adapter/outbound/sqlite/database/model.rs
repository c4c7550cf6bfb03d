//! Database model types for Diesel ORM.
//!
//! `New*Row` types borrow from the domain aggregate for inserts; the plain
//! `*Row` types are what reads load back.

use diesel::prelude::*;

use super::schema::{cache_index, deliveries, items, order_items, orders, payments};
use crate::domain::{Delivery, Item, Order, Payment};

/// Database row for an item (insertable).
#[derive(Insertable, Debug)]
#[diesel(table_name = items)]
pub struct NewItemRow<'a> {
    pub chrt_id: i64,
    pub track_number: &'a str,
    pub price: i64,
    pub rid: &'a str,
    pub name: &'a str,
    pub sale: i64,
    pub size: &'a str,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: &'a str,
    pub status: i64,
}

impl<'a> From<&'a Item> for NewItemRow<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            chrt_id: item.chrt_id,
            track_number: &item.track_number,
            price: item.price,
            rid: &item.rid,
            name: &item.name,
            sale: item.sale,
            size: &item.size,
            total_price: item.total_price,
            nm_id: item.nm_id,
            brand: &item.brand,
            status: item.status,
        }
    }
}

/// Database row for an item (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ItemRow {
    pub id: i64,
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

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            chrt_id: row.chrt_id,
            track_number: row.track_number,
            price: row.price,
            rid: row.rid,
            name: row.name,
            sale: row.sale,
            size: row.size,
            total_price: row.total_price,
            nm_id: row.nm_id,
            brand: row.brand,
            status: row.status,
        }
    }
}

/// Database row for a payment (insertable).
#[derive(Insertable, Debug)]
#[diesel(table_name = payments)]
pub struct NewPaymentRow<'a> {
    pub transaction: &'a str,
    pub request_id: &'a str,
    pub currency: &'a str,
    pub provider: &'a str,
    pub amount: i64,
    pub payment_dt: i64,
    pub bank: &'a str,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

impl<'a> From<&'a Payment> for NewPaymentRow<'a> {
    fn from(payment: &'a Payment) -> Self {
        Self {
            transaction: &payment.transaction,
            request_id: &payment.request_id,
            currency: &payment.currency,
            provider: &payment.provider,
            amount: payment.amount,
            payment_dt: payment.payment_dt,
            bank: &payment.bank,
            delivery_cost: payment.delivery_cost,
            goods_total: payment.goods_total,
            custom_fee: payment.custom_fee,
        }
    }
}

/// Database row for a payment (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentRow {
    pub id: i64,
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            transaction: row.transaction,
            request_id: row.request_id,
            currency: row.currency,
            provider: row.provider,
            amount: row.amount,
            payment_dt: row.payment_dt,
            bank: row.bank,
            delivery_cost: row.delivery_cost,
            goods_total: row.goods_total,
            custom_fee: row.custom_fee,
        }
    }
}

/// Database row for a delivery (insertable).
#[derive(Insertable, Debug)]
#[diesel(table_name = deliveries)]
pub struct NewDeliveryRow<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub zip: &'a str,
    pub city: &'a str,
    pub address: &'a str,
    pub region: &'a str,
    pub email: &'a str,
}

impl<'a> From<&'a Delivery> for NewDeliveryRow<'a> {
    fn from(delivery: &'a Delivery) -> Self {
        Self {
            name: &delivery.name,
            phone: &delivery.phone,
            zip: &delivery.zip,
            city: &delivery.city,
            address: &delivery.address,
            region: &delivery.region,
            email: &delivery.email,
        }
    }
}

/// Database row for a delivery (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = deliveries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DeliveryRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

impl From<DeliveryRow> for Delivery {
    fn from(row: DeliveryRow) -> Self {
        Self {
            name: row.name,
            phone: row.phone,
            zip: row.zip,
            city: row.city,
            address: row.address,
            region: row.region,
            email: row.email,
        }
    }
}

/// Database row for an order (insertable).
#[derive(Insertable, Debug)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub order_uid: &'a str,
    pub track_number: &'a str,
    pub entry: &'a str,
    pub delivery_id: i64,
    pub payment_id: i64,
    pub locale: &'a str,
    pub internal_signature: &'a str,
    pub customer_id: &'a str,
    pub delivery_service: &'a str,
    pub shardkey: &'a str,
    pub sm_id: i64,
    pub date_created: String,
    pub oof_shard: &'a str,
}

impl<'a> NewOrderRow<'a> {
    /// Build the order row once the owned payment and delivery rows exist.
    pub fn new(order: &'a Order, payment_id: i64, delivery_id: i64) -> Self {
        Self {
            order_uid: &order.order_uid,
            track_number: &order.track_number,
            entry: &order.entry,
            delivery_id,
            payment_id,
            locale: &order.locale,
            internal_signature: &order.internal_signature,
            customer_id: &order.customer_id,
            delivery_service: &order.delivery_service,
            shardkey: &order.shardkey,
            sm_id: order.sm_id,
            date_created: order.date_created.to_rfc3339(),
            oof_shard: &order.oof_shard,
        }
    }
}

/// Database row for an order (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub id: i64,
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery_id: i64,
    pub payment_id: i64,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: String,
    pub oof_shard: String,
}

/// Junction row linking an item to its order.
#[derive(Insertable, Debug, Clone, Copy)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_id: i64,
    pub item_id: i64,
}

/// Cache index row (insertable).
#[derive(Insertable, Debug)]
#[diesel(table_name = cache_index)]
pub struct NewCacheIndexRow<'a> {
    pub order_id: i64,
    pub app_key: &'a str,
}
