// apps/exbuy_app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use exbuy::CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("{source}")]
  Core {
    #[from]
    source: CoreError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Core { source } => match source {
        CoreError::Validation(_) | CoreError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
        CoreError::ProductNotFound { .. } | CoreError::OrderNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migrate(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Rejecting request");
    }

    let body = match self {
      AppError::Validation(m) | AppError::NotFound(m) => json!({ "error": m }),
      AppError::Config(m) => json!({ "error": "Configuration issue", "detail": m }),
      AppError::Sqlx(_) | AppError::Migrate(_) => json!({ "error": "Database operation failed" }),
      AppError::Internal(m) => json!({ "error": "An internal error occurred", "detail": m }),
      AppError::Core { source } => core_error_body(source),
    };
    HttpResponse::build(status).json(body)
  }
}

fn core_error_body(err: &CoreError) -> serde_json::Value {
  match err {
    CoreError::Validation(m) => json!({ "error": m }),
    CoreError::ProductNotFound { product_id } => json!({
      "error": err.to_string(),
      "product_id": product_id,
    }),
    CoreError::InsufficientStock {
      product_id,
      requested,
      available,
      order_index,
    } => {
      let mut body = json!({
        "error": err.to_string(),
        "product_id": product_id,
        "requested": requested,
        "available": available,
      });
      if let Some(index) = order_index {
        body["order_index"] = json!(index);
      }
      body
    }
    CoreError::OrderNotFound { order_id } => json!({
      "error": err.to_string(),
      "order_id": order_id,
    }),
    // Store failures are logged above; their detail stays out of the response.
    CoreError::Store { .. } => json!({ "error": "Database operation failed" }),
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn core_errors_map_to_client_and_server_statuses() {
    let cases = [
      (CoreError::validation("bad"), StatusCode::BAD_REQUEST),
      (CoreError::ProductNotFound { product_id: 3 }, StatusCode::NOT_FOUND),
      (CoreError::OrderNotFound { order_id: 3 }, StatusCode::NOT_FOUND),
      (
        CoreError::InsufficientStock {
          product_id: 3,
          requested: 4,
          available: 1,
          order_index: None,
        },
        StatusCode::BAD_REQUEST,
      ),
      (
        CoreError::store(std::io::Error::new(std::io::ErrorKind::Other, "connection reset")),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
    ];
    for (core, expected) in cases {
      assert_eq!(AppError::from(core).status_code(), expected);
    }
  }

  #[test]
  fn insufficient_stock_body_carries_the_shortfall() {
    let body = core_error_body(&CoreError::InsufficientStock {
      product_id: 9,
      requested: 6,
      available: 5,
      order_index: Some(1),
    });
    assert_eq!(body["product_id"], 9);
    assert_eq!(body["requested"], 6);
    assert_eq!(body["available"], 5);
    assert_eq!(body["order_index"], 1);

    let store_body = core_error_body(&CoreError::store(std::io::Error::new(std::io::ErrorKind::Other, "secret dsn")));
    assert!(!store_body.to_string().contains("secret"));
  }
}
