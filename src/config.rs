//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;
use std::fmt;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Server bind address (host:port)
    pub bind_address: String,

    /// Catalog backend: "document" or "postgres"
    pub catalog_backend: String,

    /// Data directory for the document-store backend
    pub data_dir: String,

    /// Database connection URL (required when catalog_backend = "postgres")
    pub database_url: Option<String>,

    /// Connection pool cap for the relational backend
    pub database_max_connections: u32,

    /// JWT secret key for signing bearer tokens
    pub jwt_secret: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            catalog_backend: env::var("CATALOG_BACKEND").unwrap_or_else(|_| "document".into()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".into()),
            database_url: env::var("DATABASE_URL").ok(),
            database_max_connections: parse_pool_size(env::var("DATABASE_MAX_CONNECTIONS").ok())?,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| AppError::Config("JWT_SECRET not set".into()))?,
        })
    }
}

fn parse_pool_size(raw: Option<String>) -> Result<u32> {
    match raw {
        None => Ok(10),
        Some(value) => value.parse().map_err(|_| {
            AppError::Config(format!(
                "DATABASE_MAX_CONNECTIONS must be a positive integer, got '{}'",
                value
            ))
        }),
    }
}

// Hand-rolled Debug so the signing secret never lands in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("catalog_backend", &self.catalog_backend)
            .field("data_dir", &self.data_dir)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("database_max_connections", &self.database_max_connections)
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}
