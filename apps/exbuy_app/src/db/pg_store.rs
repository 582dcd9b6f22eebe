// apps/exbuy_app/src/db/pg_store.rs

//! PostgreSQL implementation of the core's transactional store.

use async_trait::async_trait;
use exbuy::{
  CoreError, CoreResult, NewOrder, NewOrderItem, Order, OrderDetail, OrderId, OrderItem, OrderStatus, Product,
  ProductId, RowLock, Store, StoreTx,
};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{OrderItemRow, OrderLineRow, OrderRow, ProductRow};

const SELECT_PRODUCT: &str = "SELECT id, name, description, price, stock, category, created_at, updated_at \
   FROM products WHERE id = $1";
const SELECT_PRODUCT_FOR_UPDATE: &str = "SELECT id, name, description, price, stock, category, created_at, updated_at \
   FROM products WHERE id = $1 FOR UPDATE";
const SELECT_PRODUCTS: &str = "SELECT id, name, description, price, stock, category, created_at, updated_at \
   FROM products WHERE id = ANY($1) ORDER BY id";
// Rows are locked in ascending id order.
const SELECT_PRODUCTS_FOR_UPDATE: &str = "SELECT id, name, description, price, stock, category, created_at, updated_at \
   FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE";

const DECREMENT_IF_AVAILABLE: &str = "UPDATE products SET stock = stock - $2, updated_at = NOW() \
   WHERE id = $1 AND stock >= $2 RETURNING stock";
const WRITE_STOCK: &str = "UPDATE products SET stock = $2, updated_at = NOW() WHERE id = $1";
const BULK_DECREMENT: &str = "UPDATE products AS p SET stock = p.stock - d.amount, updated_at = NOW() \
   FROM UNNEST($1::bigint[], $2::int[]) AS d(id, amount) \
   WHERE p.id = d.id AND p.stock >= d.amount \
   RETURNING p.id, p.stock";

const INSERT_ORDERS: &str = "INSERT INTO orders (user_id, status, total_price) \
   SELECT d.user_id, d.status, d.total_price \
   FROM UNNEST($1::bigint[], $2::text[], $3::numeric[]) WITH ORDINALITY AS d(user_id, status, total_price, ord) \
   ORDER BY d.ord \
   RETURNING id, user_id, status, total_price, created_at, updated_at";
const INSERT_ORDER_ITEMS: &str = "INSERT INTO order_items (order_id, product_id, quantity, unit_price) \
   SELECT d.order_id, d.product_id, d.quantity, d.unit_price \
   FROM UNNEST($1::bigint[], $2::bigint[], $3::int[], $4::numeric[]) \
     WITH ORDINALITY AS d(order_id, product_id, quantity, unit_price, ord) \
   ORDER BY d.ord \
   RETURNING id, order_id, product_id, quantity, unit_price";

const SELECT_ORDER: &str = "SELECT id, user_id, status, total_price, created_at, updated_at FROM orders WHERE id = $1";
const SELECT_ORDER_LINES: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.unit_price, \
     p.name AS product_name \
   FROM order_items AS oi JOIN products AS p ON p.id = oi.product_id \
   WHERE oi.order_id = $1 ORDER BY oi.id";
const UPDATE_ORDER_STATUS: &str = "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 \
   RETURNING id, user_id, status, total_price, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Opens the pool described by `config`.
  pub async fn connect(config: &AppConfig) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(config.database_max_connections)
      .connect(&config.database_url)
      .await?;
    info!(
      max_connections = config.database_max_connections,
      "Successfully connected to the database."
    );
    Ok(Self::new(pool))
  }

  pub async fn run_migrations(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    info!("Database migrations applied.");
    Ok(())
  }
}

#[async_trait]
impl Store for PgStore {
  type Tx = PgTx;

  async fn begin(&self) -> CoreResult<PgTx> {
    let tx = self.pool.begin().await.map_err(CoreError::store)?;
    Ok(PgTx { tx })
  }
}

/// One open database transaction. Dropping it without `commit` rolls back.
pub struct PgTx {
  tx: Transaction<'static, Postgres>,
}

/// RETURNING row order is unspecified; ids were assigned in input order.
fn sorted_by_id<T, F>(mut rows: Vec<T>, id: F) -> Vec<T>
where
  F: Fn(&T) -> i64,
{
  rows.sort_by_key(|row| id(row));
  rows
}

#[async_trait]
impl StoreTx for PgTx {
  async fn fetch_product(&mut self, id: ProductId, lock: RowLock) -> CoreResult<Option<Product>> {
    let sql = match lock {
      RowLock::None => SELECT_PRODUCT,
      RowLock::ForUpdate => SELECT_PRODUCT_FOR_UPDATE,
    };
    let row: Option<ProductRow> = sqlx::query_as(sql)
      .bind(id)
      .fetch_optional(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    Ok(row.map(Product::from))
  }

  async fn fetch_products(&mut self, ids: &[ProductId], lock: RowLock) -> CoreResult<Vec<Product>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let sql = match lock {
      RowLock::None => SELECT_PRODUCTS,
      RowLock::ForUpdate => SELECT_PRODUCTS_FOR_UPDATE,
    };
    let rows: Vec<ProductRow> = sqlx::query_as(sql)
      .bind(ids)
      .fetch_all(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn decrement_stock_if_available(&mut self, id: ProductId, amount: i32) -> CoreResult<Option<i32>> {
    let stock: Option<i32> = sqlx::query_scalar(DECREMENT_IF_AVAILABLE)
      .bind(id)
      .bind(amount)
      .fetch_optional(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    Ok(stock)
  }

  async fn write_stock(&mut self, id: ProductId, new_stock: i32) -> CoreResult<()> {
    let result = sqlx::query(WRITE_STOCK)
      .bind(id)
      .bind(new_stock)
      .execute(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    if result.rows_affected() != 1 {
      return Err(CoreError::from(anyhow::anyhow!(
        "stock write for product {} updated {} rows",
        id,
        result.rows_affected()
      )));
    }
    Ok(())
  }

  async fn bulk_decrement_stock(&mut self, deltas: &[(ProductId, i32)]) -> CoreResult<Vec<(ProductId, i32)>> {
    if deltas.is_empty() {
      return Ok(Vec::new());
    }
    let (ids, amounts): (Vec<ProductId>, Vec<i32>) = deltas.iter().copied().unzip();
    let updated: Vec<(ProductId, i32)> = sqlx::query_as(BULK_DECREMENT)
      .bind(ids)
      .bind(amounts)
      .fetch_all(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    debug!(requested = deltas.len(), updated = updated.len(), "bulk stock update");
    Ok(updated)
  }

  async fn insert_orders(&mut self, orders: &[NewOrder]) -> CoreResult<Vec<Order>> {
    if orders.is_empty() {
      return Ok(Vec::new());
    }
    let user_ids: Vec<i64> = orders.iter().map(|o| o.user_id).collect();
    let statuses: Vec<String> = orders.iter().map(|o| o.status.as_str().to_string()).collect();
    let totals: Vec<Decimal> = orders.iter().map(|o| o.total_price).collect();

    let rows: Vec<OrderRow> = sqlx::query_as(INSERT_ORDERS)
      .bind(user_ids)
      .bind(statuses)
      .bind(totals)
      .fetch_all(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    sorted_by_id(rows, |row| row.id)
      .into_iter()
      .map(Order::try_from)
      .collect()
  }

  async fn insert_order_items(&mut self, items: &[NewOrderItem]) -> CoreResult<Vec<OrderItem>> {
    if items.is_empty() {
      return Ok(Vec::new());
    }
    let order_ids: Vec<i64> = items.iter().map(|i| i.order_id).collect();
    let product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
    let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
    let prices: Vec<Decimal> = items.iter().map(|i| i.unit_price).collect();

    let rows: Vec<OrderItemRow> = sqlx::query_as(INSERT_ORDER_ITEMS)
      .bind(order_ids)
      .bind(product_ids)
      .bind(quantities)
      .bind(prices)
      .fetch_all(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    Ok(
      sorted_by_id(rows, |row| row.id)
        .into_iter()
        .map(OrderItem::from)
        .collect(),
    )
  }

  async fn fetch_order_detail(&mut self, id: OrderId) -> CoreResult<Option<OrderDetail>> {
    let order: Option<OrderRow> = sqlx::query_as(SELECT_ORDER)
      .bind(id)
      .fetch_optional(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    let order = match order {
      Some(row) => Order::try_from(row)?,
      None => return Ok(None),
    };

    let lines: Vec<OrderLineRow> = sqlx::query_as(SELECT_ORDER_LINES)
      .bind(id)
      .fetch_all(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    Ok(Some(OrderDetail {
      order,
      items: lines.into_iter().map(Into::into).collect(),
    }))
  }

  async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> CoreResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(UPDATE_ORDER_STATUS)
      .bind(id)
      .bind(status.as_str())
      .fetch_optional(&mut *self.tx)
      .await
      .map_err(CoreError::store)?;
    row.map(Order::try_from).transpose()
  }

  async fn commit(self) -> CoreResult<()> {
    self.tx.commit().await.map_err(CoreError::store)
  }

  async fn rollback(self) -> CoreResult<()> {
    self.tx.rollback().await.map_err(CoreError::store)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn returned_rows_are_restored_to_insert_order() {
    let rows = vec![(12i64, "c"), (10, "a"), (11, "b")];
    let sorted = sorted_by_id(rows, |row| row.0);
    assert_eq!(sorted.iter().map(|r| r.1).collect::<Vec<_>>(), vec!["a", "b", "c"]);
  }
}
