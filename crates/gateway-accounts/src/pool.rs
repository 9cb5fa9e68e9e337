//! SQLite connection pool.

use gateway_config::DatabaseConfig;
use gateway_core::{GatewayError, GatewayResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Whether the URL names an in-memory database.
///
/// Every connection to `sqlite::memory:` opens a separate database, so such
/// pools must hold exactly one connection for their whole life.
#[must_use]
pub fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Open a pool for the configured database, creating the file if needed.
pub async fn connect(config: &DatabaseConfig) -> GatewayResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| GatewayError::configuration(format!("invalid database url: {e}")))?
        .create_if_missing(true);

    let memory = is_memory_url(&config.url);
    let pool_options = if memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
    };

    let pool = pool_options
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
        .map_err(|e| GatewayError::storage(format!("connect: {e}")))?;

    info!(
        memory,
        max_connections = pool.options().get_max_connections(),
        "Database pool ready"
    );
    Ok(pool)
}
