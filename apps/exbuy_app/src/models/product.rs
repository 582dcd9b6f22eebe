// apps/exbuy_app/src/models/product.rs

use chrono::{DateTime, Utc};
use exbuy::{Product, ProductId};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
  pub id: ProductId,
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub stock: i32,
  pub category: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      name: row.name,
      description: row.description,
      price: row.price,
      stock: row.stock,
      category: row.category,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}
