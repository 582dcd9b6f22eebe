// apps/exbuy_app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use exbuy::DEFAULT_MAX_BATCH_ORDERS;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
  #[default]
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pretty" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!(
        "Invalid LOG_FORMAT '{}': expected 'pretty' or 'json'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  /// Upper bound on the orders accepted by one bulk request.
  pub max_batch_orders: usize,
  pub run_migrations: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(&lookup, "SERVER_PORT", 8080u16)?;
    let database_url = lookup("DATABASE_URL")
      .filter(|url| !url.trim().is_empty())
      .ok_or_else(|| AppError::Config("Missing environment variable 'DATABASE_URL'".to_string()))?;
    let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;
    let max_batch_orders = parse_or(&lookup, "MAX_BATCH_ORDERS", DEFAULT_MAX_BATCH_ORDERS)?;
    if max_batch_orders == 0 {
      return Err(AppError::Config("MAX_BATCH_ORDERS must be at least 1".to_string()));
    }
    let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", true)?;
    let log_format = match lookup("LOG_FORMAT") {
      Some(raw) => raw.parse()?,
      None => LogFormat::default(),
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      max_batch_orders,
      run_migrations,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
  F: Fn(&str) -> Option<String>,
  T: FromStr,
  T::Err: Display,
{
  match lookup(name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", name, raw, e))),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_only_database_url_is_set() {
    let config = config_from(&[("DATABASE_URL", "postgres://localhost/exbuy")]).unwrap();
    assert_eq!(config.bind_address(), "127.0.0.1:8080");
    assert_eq!(config.database_max_connections, 10);
    assert_eq!(config.max_batch_orders, 1000);
    assert!(config.run_migrations);
    assert_eq!(config.log_format, LogFormat::Pretty);
  }

  #[test]
  fn overrides_are_parsed() {
    let config = config_from(&[
      ("DATABASE_URL", "postgres://db/exbuy"),
      ("SERVER_HOST", "0.0.0.0"),
      ("SERVER_PORT", "9000"),
      ("MAX_BATCH_ORDERS", "250"),
      ("RUN_MIGRATIONS", "false"),
      ("LOG_FORMAT", "JSON"),
    ])
    .unwrap();
    assert_eq!(config.bind_address(), "0.0.0.0:9000");
    assert_eq!(config.max_batch_orders, 250);
    assert!(!config.run_migrations);
    assert_eq!(config.log_format, LogFormat::Json);
  }

  #[test]
  fn invalid_values_are_config_errors() {
    assert!(matches!(config_from(&[]), Err(AppError::Config(_))));
    for (name, value) in [
      ("SERVER_PORT", "eighty"),
      ("MAX_BATCH_ORDERS", "0"),
      ("RUN_MIGRATIONS", "maybe"),
      ("LOG_FORMAT", "xml"),
    ] {
      let result = config_from(&[("DATABASE_URL", "postgres://db/exbuy"), (name, value)]);
      assert!(matches!(result, Err(AppError::Config(_))), "{}={} should be rejected", name, value);
    }
  }
}
