// apps/exbuy_app/src/state.rs
use crate::config::AppConfig;
use exbuy::{BatchOrderProcessor, Store};
use std::sync::Arc;

/// Shared by every worker. `S` is the persistence backend.
#[derive(Clone)]
pub struct AppState<S: Store> {
  pub store: S,
  pub batch: Arc<BatchOrderProcessor>,
}

impl<S: Store> AppState<S> {
  pub fn new(store: S, config: &AppConfig) -> Self {
    Self {
      store,
      batch: Arc::new(BatchOrderProcessor::new(config.max_batch_orders)),
    }
  }
}
