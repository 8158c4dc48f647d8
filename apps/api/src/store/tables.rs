use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use sqlx::SqliteConnection;

use crate::errors::{StoreError, StoreResult};

/// Closed catalogue of the tables this layer owns. Table names are only ever
/// interpolated into SQL from this enum, never from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    ResumeData,
    ResumeSkills,
    ResumeAnalysis,
    AiAnalysis,
    Admin,
    AdminLogs,
    Feedback,
    UploadedFiles,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::ResumeData,
        Table::ResumeSkills,
        Table::ResumeAnalysis,
        Table::AiAnalysis,
        Table::Admin,
        Table::AdminLogs,
        Table::Feedback,
        Table::UploadedFiles,
    ];

    /// Everything except credentials, children before `resume_data`.
    pub const RESETTABLE: [Table; 7] = [
        Table::ResumeSkills,
        Table::ResumeAnalysis,
        Table::AiAnalysis,
        Table::ResumeData,
        Table::AdminLogs,
        Table::Feedback,
        Table::UploadedFiles,
    ];

    /// Tables whose AUTOINCREMENT counters operators may rewind.
    pub const SEQUENCED: [Table; 3] = [Table::ResumeData, Table::ResumeAnalysis, Table::AiAnalysis];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::ResumeData => "resume_data",
            Table::ResumeSkills => "resume_skills",
            Table::ResumeAnalysis => "resume_analysis",
            Table::AiAnalysis => "ai_analysis",
            Table::Admin => "admin",
            Table::AdminLogs => "admin_logs",
            Table::Feedback => "feedback",
            Table::UploadedFiles => "uploaded_files",
        }
    }

    pub fn is_protected(self) -> bool {
        self == Table::Admin
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| StoreError::NotFound(format!("table '{s}' does not exist")))
    }
}

pub async fn table_exists(conn: &mut SqliteConnection, table: Table) -> StoreResult<bool> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table.as_str())
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

pub async fn count_rows(conn: &mut SqliteConnection, table: Table) -> StoreResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    Ok(sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tables() {
        for table in Table::ALL {
            assert_eq!(table.as_str().parse::<Table>().unwrap(), table);
        }
    }

    #[test]
    fn test_unknown_table_is_not_found() {
        let err = "users; DROP TABLE admin".parse::<Table>().unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_resettable_excludes_admin() {
        assert!(!Table::RESETTABLE.contains(&Table::Admin));
        assert_eq!(Table::RESETTABLE.len(), Table::ALL.len() - 1);
        assert!(Table::Admin.is_protected());
    }
}
