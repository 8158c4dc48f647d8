use std::fmt;

use sqlx::{Connection, SqlitePool};
use tracing::{error, info};

use crate::errors::{StoreError, StoreResult};
use crate::store::credentials::{hash_password, is_password_hash};

/// Account minted when the admin table is empty.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

struct Migration {
    version: i64,
    description: &'static str,
    statements: &'static [&'static str],
}

/// Ordered schema history. Column names match data written by earlier
/// deployments, so existing databases upgrade in place.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "core tables",
        statements: &[
            r#"
            CREATE TABLE IF NOT EXISTS resume_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                linkedin TEXT,
                github TEXT,
                portfolio TEXT,
                summary TEXT,
                target_role TEXT,
                target_category TEXT,
                education TEXT,
                experience TEXT,
                projects TEXT,
                skills TEXT,
                template TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS resume_skills (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resume_id INTEGER,
                skill_name TEXT NOT NULL,
                skill_category TEXT NOT NULL,
                proficiency_score REAL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (resume_id) REFERENCES resume_data (id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS resume_analysis (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resume_id INTEGER,
                ats_score REAL,
                keyword_match_score REAL,
                format_score REAL,
                section_score REAL,
                missing_skills TEXT,
                recommendations TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (resume_id) REFERENCES resume_data (id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS admin_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                admin_email TEXT NOT NULL,
                action TEXT NOT NULL,
                timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS admin (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                rating INTEGER,
                usability_score INTEGER,
                feature_satisfaction INTEGER,
                missing_features TEXT,
                improvement_suggestions TEXT,
                user_experience TEXT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS uploaded_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                original_name TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_size INTEGER,
                file_type TEXT,
                upload_source TEXT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        ],
    },
    Migration {
        version: 2,
        description: "model analysis table",
        statements: &[r#"
            CREATE TABLE IF NOT EXISTS ai_analysis (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resume_id INTEGER,
                model_used TEXT,
                resume_score INTEGER,
                job_role TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (resume_id) REFERENCES resume_data (id)
            )
            "#],
    },
    Migration {
        version: 3,
        description: "forced password change flag",
        statements: &[
            "ALTER TABLE admin ADD COLUMN must_change_password INTEGER NOT NULL DEFAULT 1",
        ],
    },
    Migration {
        version: 4,
        description: "lookup indexes",
        statements: &[
            "CREATE INDEX IF NOT EXISTS idx_resume_analysis_resume_id \
             ON resume_analysis (resume_id)",
            "CREATE INDEX IF NOT EXISTS idx_ai_analysis_resume_id ON ai_analysis (resume_id)",
            "CREATE INDEX IF NOT EXISTS idx_resume_data_created_at ON resume_data (created_at)",
        ],
    },
];

/// Owns table creation, upgrades and the bootstrap admin account.
#[derive(Clone)]
pub struct SchemaManager {
    pool: SqlitePool,
    bootstrap: BootstrapAdmin,
}

impl SchemaManager {
    pub fn new(pool: SqlitePool, bootstrap: BootstrapAdmin) -> Self {
        Self { pool, bootstrap }
    }

    /// Brings the database to the latest schema and guarantees an admin
    /// account exists. Safe to call on every start; a second call is a no-op.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.apply_migrations().await?;
        self.upgrade_legacy_credentials().await?;
        self.bootstrap_default_admin().await?;
        Ok(())
    }

    /// Highest applied migration version, 0 on a fresh database.
    pub async fn schema_version(&self) -> StoreResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn apply_migrations(&self) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;

        let current: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&mut *conn)
                .await?;
        info!("Current database schema version: {current}");

        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            info!(
                "Applying migration {} ({})",
                migration.version, migration.description
            );
            let mut tx = conn.begin().await?;

            let already: Option<i64> =
                sqlx::query_scalar("SELECT version FROM schema_version WHERE version = ?")
                    .bind(migration.version)
                    .fetch_optional(&mut *tx)
                    .await?;
            if already.is_some() {
                continue;
            }

            for statement in migration.statements {
                sqlx::query(statement)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        error!("Failed to apply migration {}: {e}", migration.version);
                        StoreError::Migration {
                            version: migration.version,
                            message: e.to_string(),
                        }
                    })?;
            }

            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(migration.version)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        }

        Ok(())
    }

    /// Replaces cleartext passwords left by older deployments with hashes.
    /// The affected accounts must pick a new password on next login.
    async fn upgrade_legacy_credentials(&self) -> StoreResult<usize> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, password FROM admin")
            .fetch_all(&self.pool)
            .await?;

        let mut upgraded = 0;
        for (id, stored) in rows.into_iter().filter(|(_, p)| !is_password_hash(p)) {
            let hash = hash_password(&stored)?;
            let result = sqlx::query(
                "UPDATE admin SET password = ?, must_change_password = 1 \
                 WHERE id = ? AND password = ?",
            )
            .bind(&hash)
            .bind(id)
            .bind(&stored)
            .execute(&self.pool)
            .await?;
            upgraded += result.rows_affected() as usize;
        }

        if upgraded > 0 {
            info!("Hashed {upgraded} legacy admin credential(s)");
        }
        Ok(upgraded)
    }

    /// Inserts the configured admin account if, and only if, the admin table
    /// is empty. Returns whether an account was created. This is the only
    /// place a default credential is minted at startup.
    pub async fn bootstrap_default_admin(&self) -> StoreResult<bool> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin")
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            info!("Admin table already holds {existing} account(s); skipping bootstrap");
            return Ok(false);
        }

        let hash = hash_password(&self.bootstrap.password)?;
        // Guarded insert: concurrent starts cannot both mint an account.
        let result = sqlx::query(
            r#"
            INSERT INTO admin (email, password, must_change_password)
            SELECT ?, ?, 1
            WHERE NOT EXISTS (SELECT 1 FROM admin)
            "#,
        )
        .bind(&self.bootstrap.email)
        .bind(&hash)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, "admin email"))?;

        let created = result.rows_affected() == 1;
        if created {
            info!("Default admin account created: {}", self.bootstrap.email);
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::credentials::verify_password;
    use crate::test_support::{test_bootstrap, test_db};

    #[tokio::test]
    async fn test_ensure_schema_creates_all_tables() {
        let db = test_db().await;
        let schema = SchemaManager::new(db.pool.clone(), test_bootstrap());
        schema.ensure_schema().await.unwrap();

        for table in crate::store::Table::ALL {
            let mut conn = db.pool.acquire().await.unwrap();
            assert!(
                crate::store::tables::table_exists(&mut conn, table)
                    .await
                    .unwrap(),
                "missing table {table}"
            );
        }
        assert_eq!(
            schema.schema_version().await.unwrap(),
            MIGRATIONS.last().unwrap().version
        );
    }

    #[tokio::test]
    async fn test_ensure_schema_twice_keeps_one_admin() {
        let db = test_db().await;
        let schema = SchemaManager::new(db.pool.clone(), test_bootstrap());
        schema.ensure_schema().await.unwrap();
        schema.ensure_schema().await.unwrap();

        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(admins, 1);
        assert!(!schema.bootstrap_default_admin().await.unwrap());
    }

    #[tokio::test]
    async fn test_bootstrap_stores_hash_and_forces_change() {
        let db = test_db().await;
        let bootstrap = test_bootstrap();
        SchemaManager::new(db.pool.clone(), bootstrap.clone())
            .ensure_schema()
            .await
            .unwrap();

        let (stored, must_change): (String, i64) =
            sqlx::query_as("SELECT password, must_change_password FROM admin WHERE email = ?")
                .bind(&bootstrap.email)
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_ne!(stored, bootstrap.password);
        assert!(verify_password(&bootstrap.password, &stored).unwrap());
        assert_eq!(must_change, 1);
    }

    #[tokio::test]
    async fn test_legacy_database_upgrades_in_place() {
        let db = test_db().await;
        // Shape left behind by an earlier deployment: no schema_version,
        // no ai_analysis table, cleartext admin password.
        sqlx::query(
            "CREATE TABLE admin (id INTEGER PRIMARY KEY AUTOINCREMENT, email TEXT NOT NULL UNIQUE, \
             password TEXT NOT NULL, created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)",
        )
        .execute(&db.pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO admin (email, password) VALUES ('legacy@example.com', 'plain-secret')",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        SchemaManager::new(db.pool.clone(), test_bootstrap())
            .ensure_schema()
            .await
            .unwrap();

        let rows: Vec<(String, String)> = sqlx::query_as("SELECT email, password FROM admin")
            .fetch_all(&db.pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1, "bootstrap must not add a second account");
        assert_eq!(rows[0].0, "legacy@example.com");
        assert!(verify_password("plain-secret", &rows[0].1).unwrap());
    }
}
