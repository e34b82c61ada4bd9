//! Model Foundry - Backend Library
//!
//! Marketplace backend for publishing, discovering, and monetizing AI model
//! and agent artifacts.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
