//! Accounts table definition.

use gateway_core::{GatewayError, GatewayResult};
use sqlx::SqlitePool;
use tracing::debug;

/// Statements creating the accounts table and its indexes. Idempotent.
pub const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL,
        password TEXT NOT NULL,
        display_name TEXT NOT NULL DEFAULT '',
        role INTEGER NOT NULL DEFAULT 1,
        status INTEGER NOT NULL DEFAULT 1,
        email TEXT NOT NULL DEFAULT '',
        access_token TEXT NOT NULL DEFAULT '',
        quota INTEGER NOT NULL DEFAULT 0,
        used_quota INTEGER NOT NULL DEFAULT 0,
        request_count INTEGER NOT NULL DEFAULT 0,
        "group" TEXT NOT NULL DEFAULT 'default',
        aff_code TEXT NOT NULL DEFAULT '',
        inviter_id INTEGER NOT NULL DEFAULT 0
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_username ON accounts (username)",
    "CREATE INDEX IF NOT EXISTS idx_accounts_quota ON accounts (quota)",
    "CREATE INDEX IF NOT EXISTS idx_accounts_used_quota ON accounts (used_quota)",
    "CREATE INDEX IF NOT EXISTS idx_accounts_request_count ON accounts (request_count)",
];

/// Apply the schema to the pool's database.
pub async fn apply(pool: &SqlitePool) -> GatewayResult<()> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| GatewayError::storage(format!("apply schema: {e}")))?;
    }
    debug!(statements = STATEMENTS.len(), "Account schema applied");
    Ok(())
}
