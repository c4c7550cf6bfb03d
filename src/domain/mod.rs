//! Order aggregate and identifier types.

pub mod id;
pub mod order;

pub use id::{AppKey, OrderId};
pub use order::{Delivery, Item, Order, Payment};
