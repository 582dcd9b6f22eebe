// apps/exbuy_app/src/web/handlers/mod.rs

pub mod inventory_handlers;
pub mod order_handlers;
pub mod product_handlers;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::HttpRequest;

use crate::errors::AppError;

/// Malformed bodies become `400 {"error": ...}`.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid query string: {}", err)).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::NotFound(format!("Invalid path: {}", err)).into()
}
