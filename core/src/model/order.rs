// core/src/model/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{OrderId, ProductId, UserId};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  #[default]
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = CoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| CoreError::validation(format!("\"{}\" is not a valid order status", s)))
  }
}

/// An order row. `total_price` is fixed at creation time and never re-derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
  pub id: OrderId,
  pub user_id: UserId,
  pub status: OrderStatus,
  pub total_price: Decimal,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A line item. `unit_price` is the product price snapshot taken at order time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
  pub id: i64,
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub quantity: i32,
  pub unit_price: Decimal,
}

impl OrderItem {
  pub fn subtotal(&self) -> Decimal {
    self.unit_price * Decimal::from(self.quantity)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub user_id: UserId,
  pub status: OrderStatus,
  pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub quantity: i32,
  pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
  pub item: OrderItem,
  pub product_name: String,
}

/// An order together with its line items, in line-item id order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
  pub order: Order,
  pub items: Vec<OrderLine>,
}

impl OrderDetail {
  /// Sum of `quantity * unit_price` over the lines.
  pub fn lines_total(&self) -> Decimal {
    self.items.iter().map(|line| line.item.subtotal()).sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_round_trips_through_its_storage_form() {
    for status in OrderStatus::ALL {
      assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
    }
  }

  #[test]
  fn unknown_status_is_a_validation_error() {
    let err = "refunded".parse::<OrderStatus>().unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref m) if m.contains("refunded")));
    assert!("Pending".parse::<OrderStatus>().is_err());
  }

  #[test]
  fn subtotal_is_exact() {
    let item = OrderItem {
      id: 1,
      order_id: 1,
      product_id: 1,
      quantity: 3,
      unit_price: Decimal::new(1999, 2),
    };
    assert_eq!(item.subtotal(), Decimal::new(5997, 2));
  }
}
