// SQLite Connection Pool Setup

use crate::error::map_sqlx_error;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use taskhub_core::error::Result;
use tracing::debug;

const MAX_CONNECTIONS: u32 = 10;

/// Create SQLite connection pool with WAL mode and foreign keys enabled
///
/// Accepts `sqlite://path`, a bare file path, or `:memory:`. In-memory
/// databases get a single connection so every query sees the same data.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(map_sqlx_error)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true)
        .create_if_missing(true);

    let max_connections = if in_memory { 1 } else { MAX_CONNECTIONS };

    debug!(database_url = %database_url, max_connections, "Opening SQLite pool");

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        // Keep the in-memory database alive for the pool's lifetime
        .min_connections(if in_memory { 1 } else { 0 })
        .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(600)) })
        .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(1800)) })
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)?;

    Ok(pool)
}
