// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use exbuy::store::memory::MemoryTx;
use exbuy::{
  CoreResult, MemoryStore, NewOrder, NewOrderItem, NewProduct, Order, OrderDetail, OrderId, OrderItem, OrderStatus,
  Product, ProductId, RowLock, StoreTx,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// A fresh store holding one product per `(name, price, stock)` entry.
pub fn seeded_store(products: &[(&str, Decimal, i32)]) -> (MemoryStore, Vec<Product>) {
  let store = MemoryStore::new();
  let seeded = products
    .iter()
    .map(|(name, price, stock)| {
      store
        .insert_product(NewProduct::new(*name, *price, *stock))
        .expect("seed product")
    })
    .collect();
  (store, seeded)
}

pub fn stock_of(store: &MemoryStore, id: ProductId) -> i32 {
  store.product(id).expect("product exists").stock
}

/// Delegates to a memory transaction but reports one item row fewer than it inserted.
pub struct ShortItemsTx(pub MemoryTx);

#[async_trait]
impl StoreTx for ShortItemsTx {
  async fn fetch_product(&mut self, id: ProductId, lock: RowLock) -> CoreResult<Option<Product>> {
    self.0.fetch_product(id, lock).await
  }

  async fn fetch_products(&mut self, ids: &[ProductId], lock: RowLock) -> CoreResult<Vec<Product>> {
    self.0.fetch_products(ids, lock).await
  }

  async fn decrement_stock_if_available(&mut self, id: ProductId, amount: i32) -> CoreResult<Option<i32>> {
    self.0.decrement_stock_if_available(id, amount).await
  }

  async fn write_stock(&mut self, id: ProductId, new_stock: i32) -> CoreResult<()> {
    self.0.write_stock(id, new_stock).await
  }

  async fn bulk_decrement_stock(&mut self, deltas: &[(ProductId, i32)]) -> CoreResult<Vec<(ProductId, i32)>> {
    self.0.bulk_decrement_stock(deltas).await
  }

  async fn insert_orders(&mut self, orders: &[NewOrder]) -> CoreResult<Vec<Order>> {
    self.0.insert_orders(orders).await
  }

  async fn insert_order_items(&mut self, items: &[NewOrderItem]) -> CoreResult<Vec<OrderItem>> {
    let mut inserted = self.0.insert_order_items(items).await?;
    inserted.pop();
    Ok(inserted)
  }

  async fn fetch_order_detail(&mut self, id: OrderId) -> CoreResult<Option<OrderDetail>> {
    self.0.fetch_order_detail(id).await
  }

  async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> CoreResult<Option<Order>> {
    self.0.update_order_status(id, status).await
  }

  async fn commit(self) -> CoreResult<()> {
    self.0.commit().await
  }

  async fn rollback(self) -> CoreResult<()> {
    self.0.rollback().await
  }
}
