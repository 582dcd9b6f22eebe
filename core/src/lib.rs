// core/src/lib.rs

//! exbuy: the order-creation and inventory-reservation core of the exbuy shop backend.
//!
//!  - `inventory`: the stock `Ledger` with its two concurrency disciplines
//!    (`LockStrategy::Optimistic` conditional decrements, `LockStrategy::Pessimistic`
//!    row locks) and the single-product `reserve` operation.
//!  - `orders`: single-order assembly and the `BatchOrderProcessor`.
//!  - `store`: the transactional persistence boundary (`Store`, `StoreTx`) and an
//!    in-memory implementation.
//!
//! Every operation runs inside one transaction. Errors are returned before
//! commit, and a dropped transaction rolls back, so no partial order, item or
//! stock change ever survives a failure.

pub mod error;
pub mod inventory;
pub mod model;
pub mod orders;
pub mod store;

pub use crate::error::{CoreError, CoreResult};
pub use crate::inventory::{reserve, Ledger, LockStrategy, LockedProduct, StockDeltas};
pub use crate::model::{
  BatchOutcome, ItemRequest, NewOrder, NewOrderItem, NewProduct, Order, OrderDetail, OrderId, OrderItem, OrderLine,
  OrderRequest, OrderStatus, Product, ProductId, Reservation, UserId,
};
pub use crate::orders::{
  assemble_order, fetch_order, place_order, update_status, BatchOrderProcessor, DEFAULT_MAX_BATCH_ORDERS,
};
pub use crate::store::memory::MemoryStore;
pub use crate::store::{RowLock, Store, StoreTx};
