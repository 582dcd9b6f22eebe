// core/src/store/mod.rs

//! The persistence boundary: a transactional relational store.
//!
//! Every core operation runs against one `StoreTx`. A transaction that is
//! dropped without `commit` MUST discard all of its staged writes and release
//! every row lock it holds, so an early return through `?` is a rollback.

pub mod memory;

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::model::{
  NewOrder, NewOrderItem, Order, OrderDetail, OrderId, OrderItem, OrderStatus, Product, ProductId,
};

/// Row-locking mode for product reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLock {
  /// Plain read; the row may change before a later write.
  None,
  /// Exclusive lock held until the transaction ends (`SELECT ... FOR UPDATE`).
  ForUpdate,
}

/// A handle to the store that can open transactions.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
  type Tx: StoreTx;

  async fn begin(&self) -> CoreResult<Self::Tx>;
}

/// One open transaction.
#[async_trait]
pub trait StoreTx: Send {
  async fn fetch_product(&mut self, id: ProductId, lock: RowLock) -> CoreResult<Option<Product>>;

  /// Resolves an id set in one round trip. Missing ids are simply absent from
  /// the result. With `RowLock::ForUpdate` rows are locked in ascending id order.
  async fn fetch_products(&mut self, ids: &[ProductId], lock: RowLock) -> CoreResult<Vec<Product>>;

  /// `stock = stock - amount` evaluated by the store, only where `stock >= amount`.
  /// Returns the new stock, or `None` when the condition failed or the row is missing.
  async fn decrement_stock_if_available(&mut self, id: ProductId, amount: i32) -> CoreResult<Option<i32>>;

  /// Persists a stock value computed from a row this transaction holds locked.
  async fn write_stock(&mut self, id: ProductId, new_stock: i32) -> CoreResult<()>;

  /// Multi-row form of `decrement_stock_if_available`. Rows failing the
  /// condition are left untouched and absent from the returned `(id, stock)` list.
  async fn bulk_decrement_stock(&mut self, deltas: &[(ProductId, i32)]) -> CoreResult<Vec<(ProductId, i32)>>;

  /// Multi-row insert. The returned orders are in input order.
  async fn insert_orders(&mut self, orders: &[NewOrder]) -> CoreResult<Vec<Order>>;

  /// Multi-row insert. The returned items are in input order.
  async fn insert_order_items(&mut self, items: &[NewOrderItem]) -> CoreResult<Vec<OrderItem>>;

  async fn fetch_order_detail(&mut self, id: OrderId) -> CoreResult<Option<OrderDetail>>;

  async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> CoreResult<Option<Order>>;

  async fn commit(self) -> CoreResult<()>;

  async fn rollback(self) -> CoreResult<()>;
}
