// apps/exbuy_app/src/web/dto.rs

//! Request bodies and response shapes of the HTTP surface.

use chrono::{DateTime, Utc};
use exbuy::{LockStrategy, OrderDetail, OrderId, OrderLine, OrderRequest, OrderStatus, ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `?lock_type=optimistic|pessimistic`; absent means optimistic.
#[derive(Debug, Default, Deserialize)]
pub struct LockQuery {
  pub lock_type: Option<LockStrategy>,
}

impl LockQuery {
  pub fn strategy(&self) -> LockStrategy {
    self.lock_type.unwrap_or_default()
  }
}

#[derive(Debug, Deserialize)]
pub struct BulkOrderBody {
  pub orders: Vec<OrderRequest>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateBody {
  pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct ReserveBody {
  pub product_id: ProductId,
  pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
  pub id: i64,
  pub product: ProductId,
  pub product_name: String,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub subtotal: Decimal,
}

impl From<OrderLine> for OrderItemResponse {
  fn from(line: OrderLine) -> Self {
    Self {
      subtotal: line.item.subtotal(),
      id: line.item.id,
      product: line.item.product_id,
      product_name: line.product_name,
      quantity: line.item.quantity,
      unit_price: line.item.unit_price,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
  pub id: OrderId,
  pub user_id: UserId,
  pub status: OrderStatus,
  pub total_price: Decimal,
  pub items: Vec<OrderItemResponse>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<OrderDetail> for OrderDetailResponse {
  fn from(detail: OrderDetail) -> Self {
    let order = detail.order;
    Self {
      id: order.id,
      user_id: order.user_id,
      status: order.status,
      total_price: order.total_price,
      items: detail.items.into_iter().map(OrderItemResponse::from).collect(),
      created_at: order.created_at,
      updated_at: order.updated_at,
    }
  }
}
