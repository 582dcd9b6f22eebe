// apps/exbuy_app/src/models/order.rs

use chrono::{DateTime, Utc};
use exbuy::{CoreError, Order, OrderId, UserId};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// `status` is stored as text and checked by the table constraint.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
  pub id: OrderId,
  pub user_id: UserId,
  pub status: String,
  pub total_price: Decimal,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = CoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    Ok(Order {
      id: row.id,
      user_id: row.user_id,
      status: row.status.parse()?,
      total_price: row.total_price,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use exbuy::OrderStatus;

  fn row(status: &str) -> OrderRow {
    OrderRow {
      id: 1,
      user_id: 2,
      status: status.to_string(),
      total_price: Decimal::new(1050, 2),
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn stored_status_text_is_parsed() {
    let order = Order::try_from(row("shipped")).unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert!(matches!(Order::try_from(row("lost")), Err(CoreError::Validation(_))));
  }
}
