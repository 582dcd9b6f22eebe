// apps/exbuy_app/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use exbuy::{ProductId, RowLock, Store, StoreTx};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let mut tx = app_state.store.begin().await?;
  let product = tx.fetch_product(product_id, RowLock::None).await?;
  tx.rollback().await?;

  match product {
    Some(product) => {
      info!("Product {} fetched successfully.", product_id);
      Ok(HttpResponse::Ok().json(product))
    }
    None => {
      warn!("Product with ID {} not found.", product_id);
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}
