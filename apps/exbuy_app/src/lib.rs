// apps/exbuy_app/src/lib.rs

//! HTTP service around the `exbuy` order and inventory core.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod state;
pub mod web;
