// apps/exbuy_app/src/web/routes.rs

use actix_web::web;
use exbuy::Store;

use crate::web::handlers::{self, inventory_handlers, order_handlers, product_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Registers every route and the extractor error handlers for backend `S`.
pub fn configure_app_routes<S: Store>(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(handlers::json_error_handler))
    .app_data(web::QueryConfig::default().error_handler(handlers::query_error_handler))
    .app_data(web::PathConfig::default().error_handler(handlers::path_error_handler))
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/orders")
        .route("", web::post().to(order_handlers::create_order_handler::<S>))
        // Registered before `/{order_id}` so "bulk" is never parsed as an id.
        .route("/bulk", web::post().to(order_handlers::bulk_create_orders_handler::<S>))
        .service(
          web::resource("/{order_id}")
            .route(web::get().to(order_handlers::get_order_handler::<S>))
            .route(web::patch().to(order_handlers::update_order_status_handler::<S>)),
        ),
    )
    .service(
      web::scope("/inventory").route(
        "/reserve",
        web::post().to(inventory_handlers::reserve_inventory_handler::<S>),
      ),
    )
    .service(
      web::scope("/products").route("/{product_id}", web::get().to(product_handlers::get_product_handler::<S>)),
    );
}
