// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::model::{OrderId, ProductId};

#[derive(Debug, Error)]
pub enum CoreError {
  /// Malformed or out-of-range input. Raised before any transaction starts.
  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Product not found: {product_id}")]
  ProductNotFound { product_id: ProductId },

  /// `order_index` is set when the shortfall was detected inside a batch.
  #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
  InsufficientStock {
    product_id: ProductId,
    requested: i64,
    available: i64,
    order_index: Option<usize>,
  },

  #[error("Order not found: {order_id}")]
  OrderNotFound { order_id: OrderId },

  #[error("Store operation failed. Source: {source}")]
  Store {
    #[source]
    source: AnyhowError,
  },
}

impl CoreError {
  /// Wraps an infrastructure error raised by a store implementation.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    CoreError::Store {
      source: AnyhowError::new(err),
    }
  }

  pub fn validation(message: impl Into<String>) -> Self {
    CoreError::Validation(message.into())
  }

  pub(crate) fn insufficient(product_id: ProductId, requested: i64, available: i64) -> Self {
    CoreError::InsufficientStock {
      product_id,
      requested,
      available,
      order_index: None,
    }
  }

  /// Attaches the batch position of the order that triggered a stock shortfall.
  pub(crate) fn in_batch_order(self, index: usize) -> Self {
    match self {
      CoreError::InsufficientStock {
        product_id,
        requested,
        available,
        ..
      } => CoreError::InsufficientStock {
        product_id,
        requested,
        available,
        order_index: Some(index),
      },
      other => other,
    }
  }

  /// True for errors caused by the caller's input rather than by the store.
  pub fn is_client_error(&self) -> bool {
    !matches!(self, CoreError::Store { .. })
  }
}

impl From<AnyhowError> for CoreError {
  fn from(err: AnyhowError) -> Self {
    // Keep an already-typed CoreError instead of nesting it as a store failure.
    match err.downcast::<CoreError>() {
      Ok(core_err) => core_err,
      Err(err) => CoreError::Store { source: err },
    }
  }
}

pub type CoreResult<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn batch_index_is_attached_only_to_stock_errors() {
    let err = CoreError::insufficient(7, 6, 5).in_batch_order(1);
    match err {
      CoreError::InsufficientStock { order_index, .. } => assert_eq!(order_index, Some(1)),
      other => panic!("Expected InsufficientStock, got {:?}", other),
    }

    let err = CoreError::ProductNotFound { product_id: 3 }.in_batch_order(4);
    assert!(matches!(err, CoreError::ProductNotFound { product_id: 3 }));
  }

  #[test]
  fn anyhow_wrapping_keeps_core_errors_typed() {
    let wrapped = AnyhowError::new(CoreError::OrderNotFound { order_id: 9 });
    assert!(matches!(CoreError::from(wrapped), CoreError::OrderNotFound { order_id: 9 }));

    let io = AnyhowError::new(std::io::Error::new(std::io::ErrorKind::Other, "connection reset"));
    let err = CoreError::from(io);
    assert!(matches!(err, CoreError::Store { .. }));
    assert!(!err.is_client_error());
  }
}
