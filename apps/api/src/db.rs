use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Creates and returns the shared SQLite connection pool.
///
/// Every store operation borrows a connection from this pool for its own
/// duration only. Foreign keys stay unchecked: `resume_id` references are
/// declared in the schema but orphans are tolerated by readers.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    info!("Opening SQLite database at {database_url}");

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL '{database_url}'"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    info!("SQLite connection pool established");
    Ok(pool)
}
