// core/src/model/mod.rs

//! Domain records shared by the core operations and the store implementations.

pub mod order;
pub mod product;
pub mod request;

pub type ProductId = i64;
pub type OrderId = i64;
pub type UserId = i64;

pub use order::{NewOrder, NewOrderItem, Order, OrderDetail, OrderItem, OrderLine, OrderStatus};
pub use product::{NewProduct, Product};
pub use request::{BatchOutcome, ItemRequest, OrderRequest, Reservation};
