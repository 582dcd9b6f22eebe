// core/src/orders/pricing.rs

//! Stock-sufficiency checks and line pricing shared by the single-order and batch paths.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::error::{CoreError, CoreResult};
use crate::inventory::StockDeltas;
use crate::model::{NewOrder, NewOrderItem, OrderId, OrderRequest, OrderStatus, Product, ProductId, UserId};

/// A priced line waiting for its parent order id.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingLine {
  pub product_id: ProductId,
  pub product_name: String,
  pub quantity: i32,
  pub unit_price: Decimal,
}

impl PendingLine {
  pub fn into_new_item(self, order_id: OrderId) -> (NewOrderItem, String) {
    (
      NewOrderItem {
        order_id,
        product_id: self.product_id,
        quantity: self.quantity,
        unit_price: self.unit_price,
      },
      self.product_name,
    )
  }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PricedOrder {
  pub user_id: UserId,
  pub lines: Vec<PendingLine>,
  pub total: Decimal,
}

impl PricedOrder {
  pub fn new_order(&self) -> NewOrder {
    NewOrder {
      user_id: self.user_id,
      status: OrderStatus::Pending,
      total_price: self.total,
    }
  }
}

/// Rejects empty item lists and non-positive quantities.
pub(crate) fn validate_request(request: &OrderRequest) -> CoreResult<()> {
  if request.items.is_empty() {
    return Err(CoreError::validation("at least one item is required"));
  }
  if let Some(item) = request.items.iter().find(|item| item.quantity < 1) {
    return Err(CoreError::validation(format!(
      "quantity for product {} must be at least 1, got {}",
      item.product_id, item.quantity
    )));
  }
  Ok(())
}

/// Distinct product ids in first-seen order.
pub(crate) fn referenced_ids<'a, I>(requests: I) -> Vec<ProductId>
where
  I: IntoIterator<Item = &'a OrderRequest>,
{
  let mut seen = HashSet::new();
  let mut ids = Vec::new();
  for request in requests {
    for item in &request.items {
      if seen.insert(item.product_id) {
        ids.push(item.product_id);
      }
    }
  }
  ids
}

/// Fails with the first requested id (in request order) that was not resolved.
pub(crate) fn ensure_resolved(ids: &[ProductId], products: &HashMap<ProductId, Product>) -> CoreResult<()> {
  match ids.iter().find(|id| !products.contains_key(id)) {
    Some(&product_id) => Err(CoreError::ProductNotFound { product_id }),
    None => Ok(()),
  }
}

/// Largest total an order row can hold (`NUMERIC(12, 2)`).
pub(crate) fn max_order_total() -> Decimal {
  Decimal::new(999_999_999_999, 2)
}

/// Prices `request` against the resolved products, in caller order.
///
/// `deltas` carries every deduction already accepted in this transaction, so
/// repeated product ids (within the order or across a batch) are checked as
/// `stock - deducted_so_far >= quantity`. Accepted lines are added to `deltas`.
pub(crate) fn price_order(
  products: &HashMap<ProductId, Product>,
  request: &OrderRequest,
  deltas: &mut StockDeltas,
) -> CoreResult<PricedOrder> {
  let mut lines = Vec::with_capacity(request.items.len());
  let mut total = Decimal::ZERO;

  for item in &request.items {
    let product = products
      .get(&item.product_id)
      .ok_or(CoreError::ProductNotFound {
        product_id: item.product_id,
      })?;
    let available = i64::from(product.stock) - deltas.deducted(product.id);
    if available < i64::from(item.quantity) {
      return Err(CoreError::insufficient(product.id, item.quantity.into(), available));
    }
    total = product
      .price
      .checked_mul(Decimal::from(item.quantity))
      .and_then(|subtotal| total.checked_add(subtotal))
      .filter(|total| *total <= max_order_total())
      .ok_or_else(|| {
        CoreError::validation(format!(
          "order total exceeds {} at product {} (quantity {})",
          max_order_total(),
          product.id,
          item.quantity
        ))
      })?;
    deltas.add(product.id, item.quantity);

    lines.push(PendingLine {
      product_id: product.id,
      product_name: product.name.clone(),
      quantity: item.quantity,
      unit_price: product.price,
    });
  }

  Ok(PricedOrder {
    user_id: request.user_id,
    lines,
    total,
  })
}
