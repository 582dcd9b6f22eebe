// core/src/inventory/ledger.rs

use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::error::{CoreError, CoreResult};
use crate::model::{Product, ProductId};
use crate::store::{RowLock, StoreTx};

/// A product row read under `FOR UPDATE`. Only the ledger hands these out,
/// so a pessimistic decrement cannot be applied to an unlocked row.
#[derive(Debug, Clone)]
pub struct LockedProduct {
  product: Product,
}

impl LockedProduct {
  pub fn stock(&self) -> i32 {
    self.product.stock
  }
}

/// Cumulative per-product stock deductions, kept in ascending product id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockDeltas {
  amounts: BTreeMap<ProductId, i64>,
}

impl StockDeltas {
  pub fn new() -> Self {
    Self::default()
  }

  /// Amount already deducted for `product_id`.
  pub fn deducted(&self, product_id: ProductId) -> i64 {
    self.amounts.get(&product_id).copied().unwrap_or(0)
  }

  /// Adds `amount` and returns the new cumulative deduction for the product.
  pub fn add(&mut self, product_id: ProductId, amount: i32) -> i64 {
    let total = self.amounts.entry(product_id).or_insert(0);
    *total += i64::from(amount);
    *total
  }

  pub fn is_empty(&self) -> bool {
    self.amounts.is_empty()
  }

  pub fn len(&self) -> usize {
    self.amounts.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (ProductId, i64)> + '_ {
    self.amounts.iter().map(|(id, amount)| (*id, *amount))
  }

  fn to_rows(&self) -> CoreResult<Vec<(ProductId, i32)>> {
    self
      .iter()
      .map(|(id, amount)| {
        i32::try_from(amount)
          .map(|amount| (id, amount))
          .map_err(|_| CoreError::validation(format!("cumulative quantity for product {} is out of range", id)))
      })
      .collect()
  }
}

/// Stock operations over one open transaction.
pub struct Ledger<'t, T: StoreTx> {
  tx: &'t mut T,
}

impl<'t, T: StoreTx> Ledger<'t, T> {
  pub fn new(tx: &'t mut T) -> Self {
    Self { tx }
  }

  /// Plain read. The stock may change before a later write.
  pub async fn fetch_for_optimistic_check(&mut self, product_id: ProductId) -> CoreResult<Product> {
    self
      .tx
      .fetch_product(product_id, RowLock::None)
      .await?
      .ok_or(CoreError::ProductNotFound { product_id })
  }

  /// Locked read; concurrent lockers of the row block until this transaction ends.
  pub async fn fetch_for_pessimistic_lock(&mut self, product_id: ProductId) -> CoreResult<LockedProduct> {
    let product = self
      .tx
      .fetch_product(product_id, RowLock::ForUpdate)
      .await?
      .ok_or(CoreError::ProductNotFound { product_id })?;
    Ok(LockedProduct { product })
  }

  /// Store-evaluated `stock = stock - amount`, refused when it would go negative.
  #[instrument(name = "ledger::decrement_optimistic", skip(self), err(Display))]
  pub async fn decrement_optimistic(&mut self, product_id: ProductId, amount: i32) -> CoreResult<i32> {
    ensure_positive(amount)?;
    match self.tx.decrement_stock_if_available(product_id, amount).await? {
      Some(new_stock) => {
        debug!(product_id, amount, new_stock, "optimistic decrement applied");
        Ok(new_stock)
      }
      None => Err(self.explain_refusal(product_id, amount.into()).await),
    }
  }

  /// Decrements the in-hand locked row and persists it.
  #[instrument(name = "ledger::decrement_pessimistic", skip(self, locked), fields(product_id = locked.product.id), err(Display))]
  pub async fn decrement_pessimistic(&mut self, locked: &mut LockedProduct, amount: i32) -> CoreResult<i32> {
    ensure_positive(amount)?;
    let product_id = locked.product.id;
    if locked.product.stock < amount {
      warn!(product_id, requested = amount, available = locked.product.stock, "locked stock insufficient");
      return Err(CoreError::insufficient(product_id, amount.into(), locked.product.stock.into()));
    }
    let new_stock = locked.product.stock - amount;
    self.tx.write_stock(product_id, new_stock).await?;
    locked.product.stock = new_stock;
    debug!(product_id, amount, new_stock, "pessimistic decrement applied");
    Ok(new_stock)
  }

  /// Applies every delta in one multi-row conditional update.
  #[instrument(name = "ledger::bulk_decrement", skip_all, fields(products = deltas.len()), err(Display))]
  pub async fn bulk_decrement(&mut self, deltas: &StockDeltas) -> CoreResult<()> {
    if deltas.is_empty() {
      return Ok(());
    }
    let rows = deltas.to_rows()?;
    let updated = self.tx.bulk_decrement_stock(&rows).await?;
    if updated.len() == rows.len() {
      debug!(products = rows.len(), "bulk decrement applied");
      return Ok(());
    }

    // A row was skipped by the store's `stock >= amount` condition (or is gone).
    let refused = rows
      .iter()
      .find(|(id, _)| !updated.iter().any(|(updated_id, _)| updated_id == id))
      .copied();
    match refused {
      Some((product_id, amount)) => Err(self.explain_refusal(product_id, amount.into()).await),
      None => Err(CoreError::validation("duplicate product ids in stock deltas")),
    }
  }

  async fn explain_refusal(&mut self, product_id: ProductId, requested: i64) -> CoreError {
    match self.tx.fetch_product(product_id, RowLock::None).await {
      Ok(Some(product)) => {
        warn!(product_id, requested, available = product.stock, "conditional decrement refused");
        CoreError::insufficient(product_id, requested, product.stock.into())
      }
      Ok(None) => CoreError::ProductNotFound { product_id },
      Err(err) => err,
    }
  }
}

fn ensure_positive(amount: i32) -> CoreResult<()> {
  if amount < 1 {
    return Err(CoreError::validation(format!("stock decrement must be at least 1, got {}", amount)));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deltas_accumulate_per_product() {
    let mut deltas = StockDeltas::new();
    assert_eq!(deltas.add(2, 3), 3);
    assert_eq!(deltas.add(1, 1), 1);
    assert_eq!(deltas.add(2, 4), 7);
    assert_eq!(deltas.deducted(2), 7);
    assert_eq!(deltas.deducted(9), 0);
    assert_eq!(deltas.iter().collect::<Vec<_>>(), vec![(1, 1), (2, 7)]);
  }

  #[test]
  fn deltas_beyond_i32_are_rejected() {
    let mut deltas = StockDeltas::new();
    deltas.add(1, i32::MAX);
    deltas.add(1, 1);
    assert!(matches!(deltas.to_rows(), Err(CoreError::Validation(_))));
  }
}
