// apps/exbuy_app/src/web/handlers/inventory_handlers.rs

use actix_web::{web, HttpResponse};
use exbuy::{reserve, Store};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::dto::{LockQuery, ReserveBody};

/// `POST /inventory/reserve?lock_type=...`
#[instrument(
  name = "handler::reserve_inventory",
  skip(app_state, body),
  fields(product_id = body.product_id, quantity = body.quantity)
)]
pub async fn reserve_inventory_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  query: web::Query<LockQuery>,
  body: web::Json<ReserveBody>,
) -> Result<HttpResponse, AppError> {
  let reservation = reserve(&app_state.store, body.product_id, body.quantity, query.strategy()).await?;
  Ok(HttpResponse::Ok().json(reservation))
}
