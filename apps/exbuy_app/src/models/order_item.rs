// apps/exbuy_app/src/models/order_item.rs

use exbuy::{OrderId, OrderItem, OrderLine, ProductId};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
  pub id: i64,
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub quantity: i32,
  pub unit_price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
  fn from(row: OrderItemRow) -> Self {
    OrderItem {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      quantity: row.quantity,
      unit_price: row.unit_price,
    }
  }
}

/// An item joined with its product's current name.
#[derive(Debug, Clone, FromRow)]
pub struct OrderLineRow {
  #[sqlx(flatten)]
  pub item: OrderItemRow,
  pub product_name: String,
}

impl From<OrderLineRow> for OrderLine {
  fn from(row: OrderLineRow) -> Self {
    OrderLine {
      item: row.item.into(),
      product_name: row.product_name,
    }
  }
}
