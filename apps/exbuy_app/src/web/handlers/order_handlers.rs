// apps/exbuy_app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use exbuy::{fetch_order, place_order, update_status, OrderId, OrderRequest, Store};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::dto::{BulkOrderBody, LockQuery, OrderDetailResponse, StatusUpdateBody};

#[instrument(
  name = "handler::create_order",
  skip(app_state, body),
  fields(user_id = body.user_id, lines = body.items.len())
)]
pub async fn create_order_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  query: web::Query<LockQuery>,
  body: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
  let detail = place_order(&app_state.store, &body, query.strategy()).await?;
  info!(order_id = detail.order.id, "Order created.");
  Ok(HttpResponse::Created().json(OrderDetailResponse::from(detail)))
}

#[instrument(name = "handler::bulk_create_orders", skip(app_state, body), fields(orders = body.orders.len()))]
pub async fn bulk_create_orders_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  query: web::Query<LockQuery>,
  body: web::Json<BulkOrderBody>,
) -> Result<HttpResponse, AppError> {
  let outcome = app_state
    .batch
    .process(&app_state.store, &body.orders, query.strategy())
    .await?;
  info!(created = outcome.created, "Bulk orders created.");
  Ok(HttpResponse::Created().json(outcome))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  path: web::Path<OrderId>,
) -> Result<HttpResponse, AppError> {
  let detail = fetch_order(&app_state.store, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(OrderDetailResponse::from(detail)))
}

#[instrument(name = "handler::update_order_status", skip(app_state, path, body), fields(order_id = %path.as_ref(), status = %body.status))]
pub async fn update_order_status_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  path: web::Path<OrderId>,
  body: web::Json<StatusUpdateBody>,
) -> Result<HttpResponse, AppError> {
  let detail = update_status(&app_state.store, path.into_inner(), body.status).await?;
  Ok(HttpResponse::Ok().json(OrderDetailResponse::from(detail)))
}
