// core/src/store/memory.rs

//! Process-local implementation of the store traits.
//!
//! Visibility is read-committed: a transaction sees committed rows plus its
//! own staged writes. Any write to a product row, and every `ForUpdate` read,
//! takes that row's lock and keeps it until the transaction ends, which is how
//! row-level write locks behave in PostgreSQL. Staged writes are applied under
//! the table guard before the row locks are released.
//!
//! IMPORTANT: the table guard is a blocking `parking_lot` mutex and is never
//! held across an `.await`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex as RowMutex, OwnedMutexGuard};
use tracing::{debug, trace};

use super::{RowLock, Store, StoreTx};
use crate::error::{CoreError, CoreResult};
use crate::model::{
  NewOrder, NewOrderItem, NewProduct, Order, OrderDetail, OrderId, OrderItem, OrderLine, OrderStatus, Product,
  ProductId,
};

/// A write the PostgreSQL schema constraints would reject.
#[derive(Debug, Error)]
#[error("integrity violation: {0}")]
struct IntegrityViolation(String);

fn violation(message: String) -> CoreError {
  CoreError::store(IntegrityViolation(message))
}

#[derive(Default)]
struct Tables {
  products: BTreeMap<ProductId, Product>,
  orders: BTreeMap<OrderId, Order>,
  order_items: BTreeMap<i64, OrderItem>,
  // Sequences are not transactional: ids taken by a rolled-back transaction stay used.
  next_product_id: i64,
  next_order_id: i64,
  next_item_id: i64,
}

impl Tables {
  fn next_order_id(&mut self) -> OrderId {
    self.next_order_id += 1;
    self.next_order_id
  }

  fn next_item_id(&mut self) -> i64 {
    self.next_item_id += 1;
    self.next_item_id
  }
}

#[derive(Default)]
struct Shared {
  tables: Mutex<Tables>,
  row_locks: Mutex<HashMap<ProductId, Arc<RowMutex<()>>>>,
}

impl Shared {
  fn has_product(&self, id: ProductId) -> bool {
    self.tables.lock().products.contains_key(&id)
  }

  /// The subset of `ids` that exist. Products are never deleted, so only
  /// these ever get a row lock entry.
  fn present_products(&self, ids: &[ProductId]) -> Vec<ProductId> {
    let tables = self.tables.lock();
    ids.iter().copied().filter(|id| tables.products.contains_key(id)).collect()
  }

  fn row_lock(&self, id: ProductId) -> Arc<RowMutex<()>> {
    let mut locks = self.row_locks.lock();
    locks.entry(id).or_insert_with(|| Arc::new(RowMutex::new(()))).clone()
  }
}

/// In-memory transactional store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
  shared: Arc<Shared>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts a catalog row outside of any transaction.
  pub fn insert_product(&self, new: NewProduct) -> CoreResult<Product> {
    if new.stock < 0 {
      return Err(violation(format!("product \"{}\" would start with negative stock", new.name)));
    }
    let mut tables = self.shared.tables.lock();
    tables.next_product_id += 1;
    let now = Utc::now();
    let product = Product {
      id: tables.next_product_id,
      name: new.name,
      description: new.description,
      price: new.price,
      stock: new.stock,
      category: new.category,
      created_at: now,
      updated_at: now,
    };
    tables.products.insert(product.id, product.clone());
    Ok(product)
  }

  /// Committed view of a product.
  pub fn product(&self, id: ProductId) -> Option<Product> {
    self.shared.tables.lock().products.get(&id).cloned()
  }

  /// Committed orders, in id order.
  pub fn orders(&self) -> Vec<Order> {
    self.shared.tables.lock().orders.values().cloned().collect()
  }

  /// Committed line items, in id order.
  pub fn order_items(&self) -> Vec<OrderItem> {
    self.shared.tables.lock().order_items.values().cloned().collect()
  }
}

#[async_trait]
impl Store for MemoryStore {
  type Tx = MemoryTx;

  async fn begin(&self) -> CoreResult<MemoryTx> {
    Ok(MemoryTx {
      shared: self.shared.clone(),
      held: HashMap::new(),
      staged_stock: HashMap::new(),
      staged_orders: BTreeMap::new(),
      staged_items: BTreeMap::new(),
    })
  }
}

/// An open in-memory transaction. Dropping it discards staged writes and
/// releases its row locks.
pub struct MemoryTx {
  shared: Arc<Shared>,
  held: HashMap<ProductId, OwnedMutexGuard<()>>,
  staged_stock: HashMap<ProductId, i32>,
  staged_orders: BTreeMap<OrderId, Order>,
  staged_items: BTreeMap<i64, OrderItem>,
}

impl MemoryTx {
  async fn lock_row(&mut self, id: ProductId) {
    if self.held.contains_key(&id) {
      return;
    }
    let row = self.shared.row_lock(id);
    let guard = row.lock_owned().await;
    trace!(product_id = id, "row lock acquired");
    self.held.insert(id, guard);
  }

  /// Locks in ascending id order so two transactions never wait on each other in a cycle.
  async fn lock_rows(&mut self, ids: &[ProductId]) {
    let mut ordered: Vec<ProductId> = ids.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    for id in ordered {
      self.lock_row(id).await;
    }
  }

  fn visible_product(&self, tables: &Tables, id: ProductId) -> Option<Product> {
    tables.products.get(&id).map(|committed| {
      let mut product = committed.clone();
      if let Some(stock) = self.staged_stock.get(&id) {
        product.stock = *stock;
      }
      product
    })
  }

  fn visible_stock(&self, id: ProductId) -> Option<i32> {
    let tables = self.shared.tables.lock();
    self.visible_product(&tables, id).map(|product| product.stock)
  }

  fn visible_order(&self, tables: &Tables, id: OrderId) -> Option<Order> {
    self.staged_orders.get(&id).or_else(|| tables.orders.get(&id)).cloned()
  }

  /// Stages `stock - amount` when the locked row can cover it.
  fn stage_decrement(&mut self, id: ProductId, amount: i32) -> Option<i32> {
    let current = self.visible_stock(id)?;
    if current < amount {
      return None;
    }
    let new_stock = current - amount;
    self.staged_stock.insert(id, new_stock);
    debug!(product_id = id, amount, new_stock, "stock decrement staged");
    Some(new_stock)
  }
}

#[async_trait]
impl StoreTx for MemoryTx {
  async fn fetch_product(&mut self, id: ProductId, lock: RowLock) -> CoreResult<Option<Product>> {
    if lock == RowLock::ForUpdate && self.shared.has_product(id) {
      self.lock_row(id).await;
    }
    let tables = self.shared.tables.lock();
    Ok(self.visible_product(&tables, id))
  }

  async fn fetch_products(&mut self, ids: &[ProductId], lock: RowLock) -> CoreResult<Vec<Product>> {
    if lock == RowLock::ForUpdate {
      let present = self.shared.present_products(ids);
      self.lock_rows(&present).await;
    }
    let mut ordered: Vec<ProductId> = ids.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    let tables = self.shared.tables.lock();
    Ok(ordered.into_iter().filter_map(|id| self.visible_product(&tables, id)).collect())
  }

  async fn decrement_stock_if_available(&mut self, id: ProductId, amount: i32) -> CoreResult<Option<i32>> {
    if self.visible_stock(id).is_none() {
      return Ok(None);
    }
    self.lock_row(id).await;
    Ok(self.stage_decrement(id, amount))
  }

  async fn write_stock(&mut self, id: ProductId, new_stock: i32) -> CoreResult<()> {
    if new_stock < 0 {
      return Err(violation(format!("stock of product {} would become {}", id, new_stock)));
    }
    if self.visible_stock(id).is_none() {
      return Err(violation(format!("product {} does not exist", id)));
    }
    self.lock_row(id).await;
    self.staged_stock.insert(id, new_stock);
    debug!(product_id = id, new_stock, "stock write staged");
    Ok(())
  }

  async fn bulk_decrement_stock(&mut self, deltas: &[(ProductId, i32)]) -> CoreResult<Vec<(ProductId, i32)>> {
    let ids: Vec<ProductId> = deltas
      .iter()
      .map(|(id, _)| *id)
      .filter(|id| self.visible_stock(*id).is_some())
      .collect();
    self.lock_rows(&ids).await;

    let mut updated = Vec::with_capacity(deltas.len());
    for (id, amount) in deltas {
      if let Some(new_stock) = self.stage_decrement(*id, *amount) {
        updated.push((*id, new_stock));
      }
    }
    Ok(updated)
  }

  async fn insert_orders(&mut self, orders: &[NewOrder]) -> CoreResult<Vec<Order>> {
    let now = Utc::now();
    let mut tables = self.shared.tables.lock();
    let mut inserted = Vec::with_capacity(orders.len());
    for new in orders {
      if new.total_price < Decimal::ZERO {
        return Err(violation(format!("order total {} is negative", new.total_price)));
      }
      let order = Order {
        id: tables.next_order_id(),
        user_id: new.user_id,
        status: new.status,
        total_price: new.total_price,
        created_at: now,
        updated_at: now,
      };
      self.staged_orders.insert(order.id, order.clone());
      inserted.push(order);
    }
    Ok(inserted)
  }

  async fn insert_order_items(&mut self, items: &[NewOrderItem]) -> CoreResult<Vec<OrderItem>> {
    let mut tables = self.shared.tables.lock();
    let mut inserted = Vec::with_capacity(items.len());
    for new in items {
      if new.quantity < 1 {
        return Err(violation(format!("order item quantity {} is below 1", new.quantity)));
      }
      if !self.staged_orders.contains_key(&new.order_id) && !tables.orders.contains_key(&new.order_id) {
        return Err(violation(format!("order {} does not exist", new.order_id)));
      }
      if !tables.products.contains_key(&new.product_id) {
        return Err(violation(format!("product {} does not exist", new.product_id)));
      }
      let item = OrderItem {
        id: tables.next_item_id(),
        order_id: new.order_id,
        product_id: new.product_id,
        quantity: new.quantity,
        unit_price: new.unit_price,
      };
      self.staged_items.insert(item.id, item.clone());
      inserted.push(item);
    }
    Ok(inserted)
  }

  async fn fetch_order_detail(&mut self, id: OrderId) -> CoreResult<Option<OrderDetail>> {
    let tables = self.shared.tables.lock();
    let order = match self.visible_order(&tables, id) {
      Some(order) => order,
      None => return Ok(None),
    };

    let mut items: BTreeMap<i64, &OrderItem> = BTreeMap::new();
    for item in tables.order_items.values().chain(self.staged_items.values()) {
      if item.order_id == id {
        items.insert(item.id, item);
      }
    }

    let lines = items
      .into_values()
      .map(|item| OrderLine {
        item: item.clone(),
        product_name: tables
          .products
          .get(&item.product_id)
          .map(|product| product.name.clone())
          .unwrap_or_default(),
      })
      .collect();

    Ok(Some(OrderDetail { order, items: lines }))
  }

  async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> CoreResult<Option<Order>> {
    let tables = self.shared.tables.lock();
    let mut order = match self.visible_order(&tables, id) {
      Some(order) => order,
      None => return Ok(None),
    };
    drop(tables);

    order.status = status;
    order.updated_at = Utc::now();
    self.staged_orders.insert(id, order.clone());
    Ok(Some(order))
  }

  async fn commit(mut self) -> CoreResult<()> {
    {
      let mut tables = self.shared.tables.lock();
      let now = Utc::now();
      for (id, stock) in self.staged_stock.drain() {
        if let Some(product) = tables.products.get_mut(&id) {
          product.stock = stock;
          product.updated_at = now;
        }
      }
      let orders = std::mem::take(&mut self.staged_orders);
      tables.orders.extend(orders);
      let items = std::mem::take(&mut self.staged_items);
      tables.order_items.extend(items);
    }
    debug!(released_locks = self.held.len(), "memory transaction committed");
    // Row guards are released when `self` drops, after the tables were updated.
    Ok(())
  }

  async fn rollback(self) -> CoreResult<()> {
    debug!(released_locks = self.held.len(), "memory transaction rolled back");
    Ok(())
  }
}
