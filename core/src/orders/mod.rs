// core/src/orders/mod.rs

pub mod assembly;
pub mod batch;
mod pricing;

pub use assembly::{assemble_order, place_order};
pub use batch::{BatchOrderProcessor, DEFAULT_MAX_BATCH_ORDERS};

use tracing::{info, instrument};

use crate::error::{CoreError, CoreResult};
use crate::model::{OrderDetail, OrderId, OrderStatus};
use crate::store::{Store, StoreTx};

/// Reads an order with its lines. Read-only; the transaction is rolled back.
pub async fn fetch_order<S: Store>(store: &S, order_id: OrderId) -> CoreResult<OrderDetail> {
  let mut tx = store.begin().await?;
  let detail = tx.fetch_order_detail(order_id).await?;
  tx.rollback().await?;
  detail.ok_or(CoreError::OrderNotFound { order_id })
}

#[instrument(name = "orders::update_status", skip(store), err(Display))]
pub async fn update_status<S: Store>(store: &S, order_id: OrderId, status: OrderStatus) -> CoreResult<OrderDetail> {
  let mut tx = store.begin().await?;
  if tx.update_order_status(order_id, status).await?.is_none() {
    return Err(CoreError::OrderNotFound { order_id });
  }
  let detail = tx
    .fetch_order_detail(order_id)
    .await?
    .ok_or(CoreError::OrderNotFound { order_id })?;
  tx.commit().await?;

  info!(order_id, status = %status, "order status updated");
  Ok(detail)
}
