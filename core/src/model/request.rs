// core/src/model/request.rs

use serde::{Deserialize, Serialize};

use super::{OrderId, ProductId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
  pub product_id: ProductId,
  pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
  pub user_id: UserId,
  pub items: Vec<ItemRequest>,
}

impl OrderRequest {
  pub fn new(user_id: UserId) -> Self {
    Self {
      user_id,
      items: Vec::new(),
    }
  }

  pub fn item(mut self, product_id: ProductId, quantity: i32) -> Self {
    self.items.push(ItemRequest { product_id, quantity });
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
  pub created: usize,
  pub order_ids: Vec<OrderId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
  pub product_id: ProductId,
  pub reserved: i32,
  pub remaining_stock: i32,
}
