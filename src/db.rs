//! Postgres connection pooling for the relational catalog backend.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::Result;

/// Connect a pool sized from configuration.
///
/// Catalog traffic is short transactional statements, so acquisition is
/// expected to be fast and idle connections are released quickly.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(120))
        .connect(database_url)
        .await?;

    Ok(pool)
}
