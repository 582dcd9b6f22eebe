// core/src/model/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A catalog row. `stock` is only ever changed through `crate::inventory::Ledger`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
  pub id: ProductId,
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub stock: i32,
  pub category: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Catalog insert payload, used for seeding stores.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub price: Decimal,
  pub stock: i32,
  pub category: String,
}

impl NewProduct {
  pub fn new(name: impl Into<String>, price: Decimal, stock: i32) -> Self {
    Self {
      name: name.into(),
      description: String::new(),
      price,
      stock,
      category: "electronics".to_string(),
    }
  }

  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = category.into();
    self
  }
}
