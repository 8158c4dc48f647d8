use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info, warn};

use crate::errors::{StoreError, StoreResult};
use crate::models::admin::AdminLogRow;
use crate::models::analysis::{AiAnalysisRow, AiResult, RuleAnalysisRow, RuleScores};
use crate::models::feedback::{FeedbackInput, FeedbackRow, UploadedFileInput, UploadedFileRow};
use crate::models::resume::{
    encode_list, ResumeRecord, ResumeRow, ResumeSubmission, SkillInput, SkillRow,
};
use crate::store::credentials::{
    hash_password, is_password_hash, validate_new_password, verify_password,
    verify_unknown_account,
};

/// Single-entity writes and point reads.
///
/// Each call borrows its own pooled connection (or transaction) and gives it
/// back on every exit path; an uncommitted transaction rolls back on drop, so
/// a failed write never leaves a partial row.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Résumés and their analyses
    // ────────────────────────────────────────────────────────────────────────

    /// Stores a submission and returns its id. Absent fields were already
    /// defaulted to empty values by deserialization; nothing is rejected.
    pub async fn save_resume(&self, input: &ResumeSubmission) -> StoreResult<i64> {
        let info = &input.personal_info;
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO resume_data (
                name, email, phone, linkedin, github, portfolio,
                summary, target_role, target_category, education,
                experience, projects, skills, template
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&info.full_name)
        .bind(&info.email)
        .bind(&info.phone)
        .bind(&info.linkedin)
        .bind(&info.github)
        .bind(&info.portfolio)
        .bind(&input.summary)
        .bind(&input.target_role)
        .bind(&input.target_category)
        .bind(encode_list(&input.education))
        .bind(encode_list(&input.experience))
        .bind(encode_list(&input.projects))
        .bind(encode_list(&input.skills))
        .bind(&input.template)
        .execute(&mut *tx)
        .await
        .inspect_err(|e| error!("Error saving resume data: {e}"))?
        .last_insert_rowid();

        tx.commit().await?;
        info!("Saved resume {id}");
        Ok(id)
    }

    pub async fn get_resume(&self, id: i64) -> StoreResult<ResumeRecord> {
        let row: Option<ResumeRow> = sqlx::query_as("SELECT * FROM resume_data WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ResumeRecord::from)
            .ok_or_else(|| StoreError::NotFound(format!("resume {id}")))
    }

    /// Stores the rule-based scores for a résumé.
    pub async fn save_rule_analysis(
        &self,
        resume_id: i64,
        scores: &RuleScores,
    ) -> StoreResult<i64> {
        validate_score("ats_score", scores.ats_score)?;
        validate_score("keyword_match_score", scores.keyword_match_score)?;
        validate_score("format_score", scores.format_score)?;
        validate_score("section_score", scores.section_score)?;

        let mut tx = self.pool.begin().await?;
        ensure_resume_exists(&mut tx, resume_id).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO resume_analysis (
                resume_id, ats_score, keyword_match_score,
                format_score, section_score, missing_skills,
                recommendations
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(resume_id)
        .bind(scores.ats_score)
        .bind(scores.keyword_match_score)
        .bind(scores.format_score)
        .bind(scores.section_score)
        .bind(&scores.missing_skills)
        .bind(&scores.recommendations)
        .execute(&mut *tx)
        .await
        .inspect_err(|e| error!("Error saving analysis data: {e}"))?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(id)
    }

    pub async fn rule_analyses_for(&self, resume_id: i64) -> StoreResult<Vec<RuleAnalysisRow>> {
        Ok(sqlx::query_as(
            "SELECT * FROM resume_analysis WHERE resume_id = ? ORDER BY id ASC",
        )
        .bind(resume_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Stores a model-produced analysis. The table itself is created by the
    /// startup migrations, never here.
    pub async fn save_ai_analysis(&self, resume_id: i64, result: &AiResult) -> StoreResult<i64> {
        if !(0..=100).contains(&result.resume_score) {
            return Err(StoreError::Validation(format!(
                "resume_score must be within 0..=100, got {}",
                result.resume_score
            )));
        }

        let mut tx = self.pool.begin().await?;
        ensure_resume_exists(&mut tx, resume_id).await?;

        let id = sqlx::query(
            "INSERT INTO ai_analysis (resume_id, model_used, resume_score, job_role) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(resume_id)
        .bind(&result.model_used)
        .bind(result.resume_score)
        .bind(&result.job_role)
        .execute(&mut *tx)
        .await
        .inspect_err(|e| error!("Error saving AI analysis data: {e}"))?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(id)
    }

    pub async fn ai_analyses_for(&self, resume_id: i64) -> StoreResult<Vec<AiAnalysisRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM ai_analysis WHERE resume_id = ? ORDER BY id ASC")
                .bind(resume_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn save_skill(&self, resume_id: i64, skill: &SkillInput) -> StoreResult<i64> {
        validate_score("proficiency_score", skill.proficiency_score)?;
        if skill.skill_name.trim().is_empty() {
            return Err(StoreError::Validation("skill_name is required".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        ensure_resume_exists(&mut tx, resume_id).await?;

        let id = sqlx::query(
            "INSERT INTO resume_skills (resume_id, skill_name, skill_category, proficiency_score) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(resume_id)
        .bind(&skill.skill_name)
        .bind(&skill.skill_category)
        .bind(skill.proficiency_score)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(id)
    }

    pub async fn skills_for_resume(&self, resume_id: i64) -> StoreResult<Vec<SkillRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM resume_skills WHERE resume_id = ? ORDER BY id ASC")
                .bind(resume_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    // ────────────────────────────────────────────────────────────────────────
    // Admin accounts and audit trail
    // ────────────────────────────────────────────────────────────────────────

    /// Checks an email/password pair against the stored salted hash.
    /// Unknown emails verify as `false`, not as an error.
    pub async fn verify_admin(&self, email: &str, password: &str) -> StoreResult<bool> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password FROM admin WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        match stored {
            None => Ok(verify_unknown_account(password)),
            Some(hash) if !is_password_hash(&hash) => {
                warn!("Admin credential for {email} is not hashed; refusing login");
                Ok(false)
            }
            Some(hash) => verify_password(password, &hash),
        }
    }

    pub async fn admin_requires_password_change(&self, email: &str) -> StoreResult<bool> {
        let flag: Option<i64> =
            sqlx::query_scalar("SELECT must_change_password FROM admin WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        flag.map(|f| f != 0)
            .ok_or_else(|| StoreError::NotFound(format!("admin {email}")))
    }

    /// Replaces the password after verifying the current one and clears the
    /// forced-change flag. Returns `false` when the current password is wrong.
    pub async fn change_admin_password(
        &self,
        email: &str,
        current: &str,
        new: &str,
    ) -> StoreResult<bool> {
        if !self.verify_admin(email, current).await? {
            return Ok(false);
        }
        validate_new_password(current, new)?;

        let hash = hash_password(new)?;
        let result = sqlx::query(
            "UPDATE admin SET password = ?, must_change_password = 0 WHERE email = ?",
        )
        .bind(&hash)
        .bind(email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("admin {email}")));
        }
        info!("Admin password changed for {email}");
        Ok(true)
    }

    /// Appends to the audit trail. Failures are logged and swallowed so the
    /// action being recorded is never blocked by its own log entry.
    pub async fn log_admin_action(&self, email: &str, action: &str) {
        let result = sqlx::query("INSERT INTO admin_logs (admin_email, action) VALUES (?, ?)")
            .bind(email)
            .bind(action)
            .execute(&self.pool)
            .await;
        if let Err(e) = result {
            warn!("Error logging admin action '{action}' for {email}: {e}");
        }
    }

    pub async fn list_admin_logs(&self) -> StoreResult<Vec<AdminLogRow>> {
        Ok(sqlx::query_as(
            "SELECT id, admin_email, action, timestamp FROM admin_logs \
             ORDER BY timestamp DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Feedback and upload metadata
    // ────────────────────────────────────────────────────────────────────────

    pub async fn save_feedback(&self, feedback: &FeedbackInput) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r#"
            INSERT INTO feedback (
                rating, usability_score, feature_satisfaction,
                missing_features, improvement_suggestions, user_experience
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(feedback.rating)
        .bind(feedback.usability_score)
        .bind(feedback.feature_satisfaction)
        .bind(&feedback.missing_features)
        .bind(&feedback.improvement_suggestions)
        .bind(&feedback.user_experience)
        .execute(&mut *tx)
        .await
        .inspect_err(|e| error!("Error saving feedback: {e}"))?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(id)
    }

    pub async fn list_feedback(&self) -> StoreResult<Vec<FeedbackRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM feedback ORDER BY timestamp DESC, id DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn save_uploaded_file(&self, file: &UploadedFileInput) -> StoreResult<i64> {
        for (field, value) in [
            ("filename", &file.filename),
            ("original_name", &file.original_name),
            ("file_path", &file.file_path),
        ] {
            if value.trim().is_empty() {
                return Err(StoreError::Validation(format!("{field} is required")));
            }
        }
        let size = i64::try_from(file.file_size).map_err(|_| {
            StoreError::Validation(format!("file_size {} is too large", file.file_size))
        })?;

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r#"
            INSERT INTO uploaded_files (
                filename, original_name, file_path, file_size, file_type, upload_source
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&file.filename)
        .bind(&file.original_name)
        .bind(&file.file_path)
        .bind(size)
        .bind(&file.file_type)
        .bind(&file.upload_source)
        .execute(&mut *tx)
        .await
        .inspect_err(|e| error!("Error saving file info: {e}"))?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(id)
    }

    pub async fn list_uploaded_files(&self) -> StoreResult<Vec<UploadedFileRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM uploaded_files ORDER BY timestamp DESC, id DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

/// Scores are always within [0, 100]; the writer enforces it.
fn validate_score(field: &str, value: f64) -> StoreResult<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "{field} must be within 0..=100, got {value}"
        )))
    }
}

async fn ensure_resume_exists(conn: &mut SqliteConnection, resume_id: i64) -> StoreResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM resume_data WHERE id = ?")
        .bind(resume_id)
        .fetch_optional(&mut *conn)
        .await?;
    found
        .map(|_| ())
        .ok_or_else(|| StoreError::NotFound(format!("resume {resume_id}")))
}
