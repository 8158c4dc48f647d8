use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::errors::{StoreError, StoreResult};
use crate::store::credentials::hash_password;
use crate::store::tables::{count_rows, table_exists};
use crate::store::{BootstrapAdmin, Table};

/// What happened to one table during a dashboard reset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableReset {
    Cleared { deleted: u64 },
    Missing,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableResetReport {
    pub table: Table,
    #[serde(flatten)]
    pub outcome: TableReset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetReport {
    pub tables: Vec<TableResetReport>,
    pub total_deleted: u64,
}

impl ResetReport {
    pub fn has_failures(&self) -> bool {
        self.tables
            .iter()
            .any(|t| matches!(t.outcome, TableReset::Failed { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    Rows { count: i64 },
    Missing,
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStatusReport {
    pub table: Table,
    #[serde(flatten)]
    pub status: TableStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseStatus {
    pub tables: Vec<TableStatusReport>,
    pub total_records: i64,
}

impl DatabaseStatus {
    pub fn count_for(&self, table: Table) -> Option<i64> {
        self.tables.iter().find(|t| t.table == table).and_then(|t| match t.status {
            TableStatus::Rows { count } => Some(count),
            _ => None,
        })
    }
}

/// Destructive operator actions. The `admin` table is only ever touched by
/// [`MaintenanceService::reset_credentials`].
#[derive(Clone)]
pub struct MaintenanceService {
    pool: SqlitePool,
    bootstrap: BootstrapAdmin,
}

impl MaintenanceService {
    pub fn new(pool: SqlitePool, bootstrap: BootstrapAdmin) -> Self {
        Self { pool, bootstrap }
    }

    /// Deletes every row of one named table and returns how many went.
    pub async fn clear_table(&self, name: &str) -> StoreResult<u64> {
        let table: Table = name.parse()?;
        if table.is_protected() {
            warn!("Refused to clear protected table {table}");
            return Err(StoreError::ProtectedTable(table.to_string()));
        }

        let mut conn = self.pool.acquire().await?;
        if !table_exists(&mut conn, table).await? {
            return Err(StoreError::NotFound(format!("table '{table}' does not exist")));
        }

        let sql = format!("DELETE FROM {table}");
        let result = sqlx::query(&sql)
            .execute(&mut *conn)
            .await
            .inspect_err(|e| error!("Failed to clear {table}: {e}"))?;

        info!("Cleared {table}: {} records deleted", result.rows_affected());
        Ok(result.rows_affected())
    }

    pub async fn reset_ai_analysis(&self) -> StoreResult<u64> {
        self.clear_table(Table::AiAnalysis.as_str()).await
    }

    /// Empties every non-credential table, children first. A failure on one
    /// table is recorded and the remaining tables are still attempted.
    pub async fn reset_dashboard(&self) -> StoreResult<ResetReport> {
        let mut conn = self.pool.acquire().await?;
        let mut tables = Vec::with_capacity(Table::RESETTABLE.len());
        let mut total_deleted = 0;

        for table in Table::RESETTABLE {
            let outcome = match table_exists(&mut conn, table).await {
                Ok(false) => TableReset::Missing,
                Ok(true) => {
                    let sql = format!("DELETE FROM {table}");
                    match sqlx::query(&sql).execute(&mut *conn).await {
                        Ok(result) => {
                            total_deleted += result.rows_affected();
                            TableReset::Cleared {
                                deleted: result.rows_affected(),
                            }
                        }
                        Err(e) => {
                            warn!("Reset of {table} failed: {e}");
                            TableReset::Failed {
                                error: e.to_string(),
                            }
                        }
                    }
                }
                Err(e) => TableReset::Failed {
                    error: e.to_string(),
                },
            };
            tables.push(TableResetReport { table, outcome });
        }

        info!("Dashboard reset deleted {total_deleted} records");
        Ok(ResetReport {
            tables,
            total_deleted,
        })
    }

    /// Replaces every admin account with the configured bootstrap account,
    /// which must change its password on next login. All or nothing.
    pub async fn reset_credentials(&self) -> StoreResult<()> {
        let hash = hash_password(&self.bootstrap.password)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM admin").execute(&mut *tx).await?;
        sqlx::query("INSERT INTO admin (email, password, must_change_password) VALUES (?, ?, 1)")
            .bind(&self.bootstrap.email)
            .bind(&hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::from_insert(e, "admin email"))?;
        tx.commit().await?;

        info!("Admin credentials reset to {}", self.bootstrap.email);
        Ok(())
    }

    /// Rewinds AUTOINCREMENT counters so the next insert gets id 1. Only
    /// meaningful after the tables were emptied.
    pub async fn reset_sequence_counters(&self) -> StoreResult<()> {
        let has_sequences: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
        )
        .fetch_optional(&self.pool)
        .await?;
        if has_sequences.is_none() {
            return Ok(());
        }

        let placeholders = vec!["?"; Table::SEQUENCED.len()].join(", ");
        let sql = format!("UPDATE sqlite_sequence SET seq = 0 WHERE name IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for table in Table::SEQUENCED {
            query = query.bind(table.as_str());
        }
        query.execute(&self.pool).await?;

        info!("Sequence counters reset");
        Ok(())
    }

    /// Row count per table. A table that is missing or cannot be read is
    /// reported as such rather than failing the whole report.
    pub async fn status(&self) -> StoreResult<DatabaseStatus> {
        let mut conn = self.pool.acquire().await?;
        let mut tables = Vec::with_capacity(Table::ALL.len());
        let mut total_records = 0;

        for table in Table::ALL {
            let status = match table_exists(&mut conn, table).await {
                Ok(false) => TableStatus::Missing,
                Ok(true) => match count_rows(&mut conn, table).await {
                    Ok(count) => {
                        total_records += count;
                        TableStatus::Rows { count }
                    }
                    Err(e) => TableStatus::Error {
                        message: e.to_string(),
                    },
                },
                Err(e) => TableStatus::Error {
                    message: e.to_string(),
                },
            };
            tables.push(TableStatusReport { table, status });
        }

        Ok(DatabaseStatus {
            tables,
            total_records,
        })
    }
}
