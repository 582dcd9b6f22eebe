// apps/exbuy_app/src/models/mod.rs

//! Row types as read from PostgreSQL, converted into the core's domain types.

pub mod order;
pub mod order_item;
pub mod product;

pub use order::OrderRow;
pub use order_item::{OrderItemRow, OrderLineRow};
pub use product::ProductRow;
