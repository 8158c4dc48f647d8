use serde::Serialize;

use crate::errors::StoreResult;
use crate::maintenance::service::{DatabaseStatus, ResetReport, TableReset};

/// Success flag plus an operator-readable message, as recorded in audit trails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl OperationOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn from_clear(table: &str, result: &StoreResult<u64>) -> Self {
        match result {
            Ok(deleted) => Self::ok(format!("Cleared {table}: {deleted} records deleted")),
            Err(e) => Self::failed(format!("Error clearing {table}: {e}")),
        }
    }

    pub fn from_reset(result: &StoreResult<ResetReport>) -> Self {
        let report = match result {
            Ok(report) => report,
            Err(e) => return Self::failed(format!("Error resetting dashboard data: {e}")),
        };
        let details = report
            .tables
            .iter()
            .map(|entry| match &entry.outcome {
                TableReset::Cleared { deleted } => {
                    format!("{}: {deleted} records deleted", entry.table)
                }
                TableReset::Missing => format!("{}: table does not exist", entry.table),
                TableReset::Failed { error } => format!("{}: error - {error}", entry.table),
            })
            .collect();
        let message = if report.has_failures() {
            format!(
                "Dashboard data reset completed with errors. Total records deleted: {}",
                report.total_deleted
            )
        } else {
            format!(
                "Dashboard data reset completed. Total records deleted: {}",
                report.total_deleted
            )
        };
        Self {
            success: !report.has_failures(),
            message,
            details,
        }
    }

    pub fn from_status(result: &StoreResult<DatabaseStatus>) -> Self {
        match result {
            Ok(status) => Self::ok(format!(
                "{} records across {} tables",
                status.total_records,
                status.tables.len()
            )),
            Err(e) => Self::failed(format!("Error getting database status: {e}")),
        }
    }

    pub fn from_unit(result: &StoreResult<()>, done: &str, failed: &str) -> Self {
        match result {
            Ok(()) => Self::ok(done),
            Err(e) => Self::failed(format!("{failed}: {e}")),
        }
    }
}
