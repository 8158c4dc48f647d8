//! Shared fixtures for the in-crate test modules.

use serde_json::json;
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::db::create_pool;
use crate::models::resume::{PersonalInfo, ResumeSubmission};
use crate::store::{BootstrapAdmin, SchemaManager};

/// A file-backed database that lives as long as this value.
pub struct TestDb {
    _dir: TempDir,
    pub pool: SqlitePool,
}

pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = create_pool(&url, 2).await.expect("open test database");
    TestDb { _dir: dir, pool }
}

pub fn test_bootstrap() -> BootstrapAdmin {
    BootstrapAdmin {
        email: "admin@test.local".to_string(),
        password: "bootstrap-secret".to_string(),
    }
}

pub async fn migrated_db() -> TestDb {
    let db = test_db().await;
    SchemaManager::new(db.pool.clone(), test_bootstrap())
        .ensure_schema()
        .await
        .expect("ensure schema");
    db
}

pub fn sample_submission(name: &str, email: &str, target_role: &str) -> ResumeSubmission {
    ResumeSubmission {
        personal_info: PersonalInfo {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: "+1 555 0100".to_string(),
            linkedin: "https://linkedin.com/in/example".to_string(),
            github: "https://github.com/example".to_string(),
            portfolio: String::new(),
        },
        summary: "Engineer who ships.".to_string(),
        target_role: target_role.to_string(),
        target_category: "Software Development".to_string(),
        education: vec![json!({"school": "MIT", "degree": "BSc", "year": "2019"})],
        experience: vec![
            json!({"company": "Acme", "position": "Engineer", "highlights": ["Cut p99 by 40%"]}),
            json!({"company": "Globex", "position": "Intern"}),
        ],
        projects: vec![json!({"name": "resume-dashboard"})],
        skills: vec![json!("Rust"), json!("SQL")],
        template: "modern".to_string(),
    }
}
