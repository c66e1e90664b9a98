//! PostgreSQL connection pool.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::store::StoreError;

/// Open a connection pool.
///
/// `acquire_timeout` bounds how long a store call waits for a connection;
/// it is the only execution timeout in the library.
pub async fn connect(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, StoreError> {
    info!(max_connections, ?acquire_timeout, "connecting to identity database");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await?;
    Ok(pool)
}
