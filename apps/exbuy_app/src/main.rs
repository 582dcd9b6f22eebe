// apps/exbuy_app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use exbuy_app::config::{AppConfig, LogFormat};
use exbuy_app::db::PgStore;
use exbuy_app::state::AppState;
use exbuy_app::web::configure_app_routes;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let loaded = AppConfig::from_env();
  init_tracing(loaded.as_ref().map(|cfg| cfg.log_format).unwrap_or_default());

  let app_config = match loaded {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(e.into());
    }
  };
  tracing::info!("Application configuration loaded successfully. Starting exbuy server...");

  let store = PgStore::connect(&app_config)
    .await
    .context("connecting to the database")?;
  if app_config.run_migrations {
    store.run_migrations().await.context("running database migrations")?;
  }

  let app_state = AppState::new(store, &app_config);
  let server_address = app_config.bind_address();
  tracing::info!(max_batch_orders = app_config.max_batch_orders, "Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes::<PgStore>)
  })
  .bind(&server_address)?
  .run()
  .await?;

  Ok(())
}
