// core/src/inventory/mod.rs

//! Stock ownership: the `Ledger` is the only sanctioned way to change a product's stock.

pub mod ledger;
pub mod strategy;

pub use ledger::{Ledger, LockedProduct, StockDeltas};
pub use strategy::LockStrategy;

use tracing::{info, instrument, warn};

use crate::error::{CoreError, CoreResult};
use crate::model::{ProductId, Reservation};
use crate::store::{Store, StoreTx};

/// Reserves `quantity` units of one product in its own transaction.
///
/// Optimistic: plain read, sufficiency check, then the store-evaluated
/// conditional decrement. Pessimistic: locked read, check, then the in-hand
/// row is decremented and persisted.
#[instrument(name = "inventory::reserve", skip(store), err(Display))]
pub async fn reserve<S: Store>(
  store: &S,
  product_id: ProductId,
  quantity: i32,
  strategy: LockStrategy,
) -> CoreResult<Reservation> {
  if quantity < 1 {
    return Err(CoreError::validation("quantity must be at least 1"));
  }

  let mut tx = store.begin().await?;
  let remaining_stock = {
    let mut ledger = Ledger::new(&mut tx);
    match strategy {
      LockStrategy::Optimistic => {
        let product = ledger.fetch_for_optimistic_check(product_id).await?;
        if i64::from(product.stock) < i64::from(quantity) {
          warn!(product_id, requested = quantity, available = product.stock, "reservation rejected");
          return Err(CoreError::insufficient(product_id, quantity.into(), product.stock.into()));
        }
        ledger.decrement_optimistic(product_id, quantity).await?
      }
      LockStrategy::Pessimistic => {
        let mut locked = ledger.fetch_for_pessimistic_lock(product_id).await?;
        ledger.decrement_pessimistic(&mut locked, quantity).await?
      }
    }
  };
  tx.commit().await?;

  info!(product_id, reserved = quantity, remaining_stock, "inventory reserved");
  Ok(Reservation {
    product_id,
    reserved: quantity,
    remaining_stock,
  })
}
