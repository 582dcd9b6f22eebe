// core/src/orders/batch.rs

//! Many orders in one transaction with a constant number of store round trips:
//! one product fetch, one order insert, one item insert, one stock update.

use tracing::{debug, info, instrument};

use super::assembly::resolve_products;
use super::pricing::{self, PendingLine};
use crate::error::{CoreError, CoreResult};
use crate::inventory::{Ledger, LockStrategy, StockDeltas};
use crate::model::{BatchOutcome, OrderRequest};
use crate::store::{Store, StoreTx};

pub const DEFAULT_MAX_BATCH_ORDERS: usize = 1000;

#[derive(Debug, Clone)]
pub struct BatchOrderProcessor {
  max_orders: usize,
}

impl Default for BatchOrderProcessor {
  fn default() -> Self {
    Self::new(DEFAULT_MAX_BATCH_ORDERS)
  }
}

impl BatchOrderProcessor {
  /// `max_orders` bounds transaction size and lock duration.
  pub fn new(max_orders: usize) -> Self {
    Self { max_orders }
  }

  pub fn max_orders(&self) -> usize {
    self.max_orders
  }

  /// Input checks that run before any transaction is opened.
  pub fn validate(&self, orders: &[OrderRequest]) -> CoreResult<()> {
    if orders.len() > self.max_orders {
      return Err(CoreError::validation(format!(
        "a batch may contain at most {} orders, got {}",
        self.max_orders,
        orders.len()
      )));
    }
    for (index, order) in orders.iter().enumerate() {
      pricing::validate_request(order).map_err(|err| match err {
        CoreError::Validation(message) => CoreError::Validation(format!("orders[{}]: {}", index, message)),
        other => other,
      })?;
    }
    Ok(())
  }

  /// Validates, processes the whole batch in one transaction and commits.
  /// Any failure leaves no order, item or stock change behind.
  #[instrument(name = "orders::process_batch", skip(self, store, orders), fields(orders = orders.len()), err(Display))]
  pub async fn process<S: Store>(
    &self,
    store: &S,
    orders: &[OrderRequest],
    strategy: LockStrategy,
  ) -> CoreResult<BatchOutcome> {
    self.validate(orders)?;
    if orders.is_empty() {
      return Ok(BatchOutcome {
        created: 0,
        order_ids: Vec::new(),
      });
    }

    let mut tx = store.begin().await?;
    let outcome = self.process_in(&mut tx, orders, strategy).await?;
    tx.commit().await?;

    info!(created = outcome.created, "batch committed");
    Ok(outcome)
  }

  /// Processes the batch inside the caller's transaction.
  pub async fn process_in<T: StoreTx>(
    &self,
    tx: &mut T,
    orders: &[OrderRequest],
    strategy: LockStrategy,
  ) -> CoreResult<BatchOutcome> {
    self.validate(orders)?;

    let ids = pricing::referenced_ids(orders);
    let products = resolve_products(tx, &ids, strategy).await?;
    pricing::ensure_resolved(&ids, &products)?;

    // One running deduction map for the whole batch: order N sees what orders 0..N took.
    let mut deltas = StockDeltas::new();
    let mut new_orders = Vec::with_capacity(orders.len());
    let mut pending_lines: Vec<Vec<PendingLine>> = Vec::with_capacity(orders.len());
    for (index, request) in orders.iter().enumerate() {
      let priced = pricing::price_order(&products, request, &mut deltas).map_err(|err| err.in_batch_order(index))?;
      new_orders.push(priced.new_order());
      pending_lines.push(priced.lines);
    }
    debug!(orders = new_orders.len(), products = deltas.len(), "batch priced");

    let inserted = tx.insert_orders(&new_orders).await?;
    if inserted.len() != new_orders.len() {
      return Err(CoreError::from(anyhow::anyhow!(
        "order insert returned {} rows for {} orders",
        inserted.len(),
        new_orders.len()
      )));
    }

    // Join the side table (batch position -> lines) to the generated ids.
    let new_items: Vec<_> = inserted
      .iter()
      .zip(pending_lines)
      .flat_map(|(order, lines)| {
        lines
          .into_iter()
          .map(move |line| line.into_new_item(order.id).0)
      })
      .collect();
    let items = tx.insert_order_items(&new_items).await?;
    if items.len() != new_items.len() {
      return Err(CoreError::from(anyhow::anyhow!(
        "order item insert returned {} rows for {} lines",
        items.len(),
        new_items.len()
      )));
    }

    Ledger::new(tx).bulk_decrement(&deltas).await?;

    let order_ids: Vec<_> = inserted.iter().map(|order| order.id).collect();
    Ok(BatchOutcome {
      created: order_ids.len(),
      order_ids,
    })
  }
}
