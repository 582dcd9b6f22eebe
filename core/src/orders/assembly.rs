// core/src/orders/assembly.rs

//! Single-order creation: one batched product fetch, priced lines, one order
//! row, one multi-row item insert and one multi-row stock update.

use std::collections::HashMap;
use tracing::{info, instrument};

use super::pricing::{self, PricedOrder};
use crate::error::{CoreError, CoreResult};
use crate::inventory::{Ledger, LockStrategy, StockDeltas};
use crate::model::{OrderDetail, OrderLine, OrderRequest, Product, ProductId};
use crate::store::{Store, StoreTx};

/// Validates `request`, assembles the order in a fresh transaction and commits it.
#[instrument(
  name = "orders::place_order",
  skip(store, request),
  fields(user_id = request.user_id, lines = request.items.len()),
  err(Display)
)]
pub async fn place_order<S: Store>(store: &S, request: &OrderRequest, strategy: LockStrategy) -> CoreResult<OrderDetail> {
  pricing::validate_request(request)?;

  let mut tx = store.begin().await?;
  let detail = assemble_order(&mut tx, request, strategy).await?;
  tx.commit().await?;

  info!(
    order_id = detail.order.id,
    total_price = %detail.order.total_price,
    "order placed"
  );
  Ok(detail)
}

/// Builds and writes one order inside the caller's transaction.
///
/// Nothing is written before every product is resolved and every line has
/// passed its stock check. An error leaves the caller to drop the transaction.
pub async fn assemble_order<T: StoreTx>(
  tx: &mut T,
  request: &OrderRequest,
  strategy: LockStrategy,
) -> CoreResult<OrderDetail> {
  pricing::validate_request(request)?;

  let ids = pricing::referenced_ids([request]);
  let products = resolve_products(tx, &ids, strategy).await?;
  pricing::ensure_resolved(&ids, &products)?;

  let mut deltas = StockDeltas::new();
  let priced = pricing::price_order(&products, request, &mut deltas)?;

  let detail = write_order(tx, priced).await?;
  Ledger::new(tx).bulk_decrement(&deltas).await?;
  Ok(detail)
}

/// Resolves `ids` with a single store round trip.
pub(crate) async fn resolve_products<T: StoreTx>(
  tx: &mut T,
  ids: &[ProductId],
  strategy: LockStrategy,
) -> CoreResult<HashMap<ProductId, Product>> {
  let rows = tx.fetch_products(ids, strategy.row_lock()).await?;
  Ok(rows.into_iter().map(|product| (product.id, product)).collect())
}

async fn write_order<T: StoreTx>(tx: &mut T, priced: PricedOrder) -> CoreResult<OrderDetail> {
  let order = tx
    .insert_orders(&[priced.new_order()])
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| CoreError::from(anyhow::anyhow!("order insert returned no row")))?;

  let (new_items, names): (Vec<_>, Vec<_>) = priced
    .lines
    .into_iter()
    .map(|line| line.into_new_item(order.id))
    .unzip();
  let items = tx.insert_order_items(&new_items).await?;
  if items.len() != names.len() {
    return Err(CoreError::from(anyhow::anyhow!(
      "order item insert returned {} rows for {} lines",
      items.len(),
      names.len()
    )));
  }

  let items = items
    .into_iter()
    .zip(names)
    .map(|(item, product_name)| OrderLine { item, product_name })
    .collect();
  Ok(OrderDetail { order, items })
}
