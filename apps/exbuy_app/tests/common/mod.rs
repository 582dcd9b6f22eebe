// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use actix_web::web;
use exbuy::{MemoryStore, NewProduct, Product, ProductId};
use exbuy_app::config::AppConfig;
use exbuy_app::state::AppState;
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

pub fn test_config(max_batch_orders: usize) -> AppConfig {
  let max = max_batch_orders.to_string();
  AppConfig::from_lookup(|name| match name {
    "DATABASE_URL" => Some("postgres://localhost/exbuy_test".to_string()),
    "MAX_BATCH_ORDERS" => Some(max.clone()),
    _ => None,
  })
  .expect("test config")
}

pub fn app_state(store: &MemoryStore, max_batch_orders: usize) -> web::Data<AppState<MemoryStore>> {
  web::Data::new(AppState::new(store.clone(), &test_config(max_batch_orders)))
}

pub fn seeded_store(products: &[(&str, Decimal, i32)]) -> (MemoryStore, Vec<Product>) {
  let store = MemoryStore::new();
  let seeded = products
    .iter()
    .map(|(name, price, stock)| store.insert_product(NewProduct::new(*name, *price, *stock)).expect("seed product"))
    .collect();
  (store, seeded)
}

pub fn stock_of(store: &MemoryStore, id: ProductId) -> i32 {
  store.product(id).expect("product exists").stock
}

/// Builds the service over an in-memory store.
macro_rules! test_app {
  ($store:expr) => {
    test_app!($store, exbuy::DEFAULT_MAX_BATCH_ORDERS)
  };
  ($store:expr, $max_batch:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(crate::common::app_state(&$store, $max_batch))
        .configure(exbuy_app::web::configure_app_routes::<exbuy::MemoryStore>),
    )
    .await
  };
}
