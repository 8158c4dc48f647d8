use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::analytics::resolution::{
    resolve_role, resolve_score, round_to, score_distribution, BucketCount,
};
use crate::errors::StoreResult;
use crate::models::resume::{ResumeRecord, ResumeRow};

const DEFAULT_MODEL_LABEL: &str = "Standard Analysis";
const RECENT_LIMIT: i64 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Report shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ModelUsage {
    pub model: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub target_role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentAiAnalysis {
    pub model: String,
    pub score: i64,
    pub job_role: String,
    pub date: NaiveDateTime,
}

/// One submission as the operator sees it: both scoring sources merged.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSubmission {
    #[serde(flatten)]
    pub resume: ResumeRecord,
    pub score: f64,
    pub predicted_role: String,
    pub model_used: String,
    pub analysis_date: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardAnalytics {
    pub total_users: i64,
    pub total_resumes: i64,
    pub avg_score: f64,
    pub role_distribution: Vec<RoleCount>,
    pub score_distribution: Vec<BucketCount>,
    pub submission_trend: Vec<DailyCount>,
    pub recent_submissions: Vec<RecentSubmission>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeStats {
    pub total_resumes: i64,
    pub avg_ats_score: f64,
    pub recent_activity: Vec<RecentSubmission>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AiAnalysisStats {
    pub total_analyses: i64,
    pub model_usage: Vec<ModelUsage>,
    pub average_score: f64,
    pub top_job_roles: Vec<RoleCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailedAiAnalysisStats {
    #[serde(flatten)]
    pub summary: AiAnalysisStats,
    pub daily_trend: Vec<DailyCount>,
    pub score_distribution: Vec<BucketCount>,
    pub recent_analyses: Vec<RecentAiAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackStats {
    pub total_responses: i64,
    pub avg_rating: f64,
    pub avg_usability: f64,
    pub avg_satisfaction: f64,
}

#[derive(FromRow)]
struct SubmissionRow {
    #[sqlx(flatten)]
    resume: ResumeRow,
    rule_score: Option<f64>,
    rule_analyzed_at: Option<NaiveDateTime>,
    model_score: Option<i64>,
    model_role: Option<String>,
    model_used: Option<String>,
    model_analyzed_at: Option<NaiveDateTime>,
}

impl From<SubmissionRow> for ResolvedSubmission {
    fn from(row: SubmissionRow) -> Self {
        let score = resolve_score(row.rule_score, row.model_score);
        let predicted_role =
            resolve_role(row.model_role.as_deref(), row.resume.target_role.as_deref()).to_string();
        let model_used = row
            .model_used
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_LABEL.to_string());
        let analysis_date = row
            .model_analyzed_at
            .or(row.rule_analyzed_at)
            .unwrap_or(row.resume.created_at);

        ResolvedSubmission {
            resume: row.resume.into(),
            score,
            predicted_role,
            model_used,
            analysis_date,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Answers dashboard questions without mutating anything. Every report is
/// computed on one pooled connection that is released when the call returns.
/// Orphaned analyses and résumés without analyses are tolerated everywhere.
#[derive(Clone)]
pub struct AnalyticsEngine {
    pool: SqlitePool,
}

impl AnalyticsEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every submission, newest first, with its resolved score and role.
    /// When a résumé has several analyses of one kind, the latest is used.
    pub async fn submissions(&self) -> StoreResult<Vec<ResolvedSubmission>> {
        let rows: Vec<SubmissionRow> = sqlx::query_as(
            r#"
            SELECT
                r.*,
                a.ats_score AS rule_score,
                a.created_at AS rule_analyzed_at,
                ai.resume_score AS model_score,
                ai.job_role AS model_role,
                ai.model_used AS model_used,
                ai.created_at AS model_analyzed_at
            FROM resume_data r
            LEFT JOIN resume_analysis a
                ON a.id = (SELECT MAX(id) FROM resume_analysis WHERE resume_id = r.id)
            LEFT JOIN ai_analysis ai
                ON ai.id = (SELECT MAX(id) FROM ai_analysis WHERE resume_id = r.id)
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ResolvedSubmission::from).collect())
    }

    pub async fn dashboard(&self) -> StoreResult<DashboardAnalytics> {
        let mut conn = self.pool.acquire().await?;

        let total_users: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT email) FROM resume_data WHERE email IS NOT NULL AND email != ''",
        )
        .fetch_one(&mut *conn)
        .await?;

        let total_resumes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resume_data")
            .fetch_one(&mut *conn)
            .await?;

        let scores = merged_scores(&mut conn).await?;
        let avg_score = mean(&scores).map(|m| round_to(m, 2)).unwrap_or(0.0);

        // Grouping is case-sensitive: "Data Scientist" and "data scientist"
        // are separate rows.
        let role_distribution: Vec<RoleCount> = sqlx::query_as(
            r#"
            SELECT role, COUNT(*) AS count FROM (
                SELECT target_role AS role FROM resume_data
                WHERE target_role IS NOT NULL AND target_role != ''
                UNION ALL
                SELECT job_role AS role FROM ai_analysis
                WHERE job_role IS NOT NULL AND job_role != ''
            )
            GROUP BY role
            ORDER BY count DESC, role ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let submission_trend = daily_trend(&mut conn, "resume_data").await?;
        let recent_submissions = recent_submissions(&mut conn).await?;

        Ok(DashboardAnalytics {
            total_users,
            total_resumes,
            avg_score,
            role_distribution,
            score_distribution: score_distribution(scores),
            submission_trend,
            recent_submissions,
        })
    }

    /// Rule-based summary: submission count, average ATS score, latest activity.
    pub async fn resume_stats(&self) -> StoreResult<ResumeStats> {
        let mut conn = self.pool.acquire().await?;

        let total_resumes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resume_data")
            .fetch_one(&mut *conn)
            .await?;
        let avg: Option<f64> = sqlx::query_scalar("SELECT AVG(ats_score) FROM resume_analysis")
            .fetch_one(&mut *conn)
            .await?;
        let recent_activity = recent_submissions(&mut conn).await?;

        Ok(ResumeStats {
            total_resumes,
            avg_ats_score: round_to(avg.unwrap_or(0.0), 2),
            recent_activity,
        })
    }

    pub async fn ai_stats(&self) -> StoreResult<AiAnalysisStats> {
        let mut conn = self.pool.acquire().await?;
        ai_summary(&mut conn).await
    }

    pub async fn ai_stats_detailed(&self) -> StoreResult<DetailedAiAnalysisStats> {
        let mut conn = self.pool.acquire().await?;
        let summary = ai_summary(&mut conn).await?;
        let daily_trend = daily_trend(&mut conn, "ai_analysis").await?;

        let model_scores: Vec<f64> = sqlx::query_scalar(
            "SELECT CAST(resume_score AS REAL) FROM ai_analysis WHERE resume_score > 0",
        )
        .fetch_all(&mut *conn)
        .await?;

        let recent_analyses: Vec<RecentAiAnalysis> = sqlx::query_as(
            r#"
            SELECT
                COALESCE(model_used, '') AS model,
                COALESCE(resume_score, 0) AS score,
                COALESCE(job_role, '') AS job_role,
                created_at AS date
            FROM ai_analysis
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&mut *conn)
        .await?;

        Ok(DetailedAiAnalysisStats {
            summary,
            daily_trend,
            score_distribution: score_distribution(model_scores),
            recent_analyses,
        })
    }

    pub async fn feedback_stats(&self) -> StoreResult<FeedbackStats> {
        let (total, rating, usability, satisfaction): (i64, Option<f64>, Option<f64>, Option<f64>) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    AVG(rating),
                    AVG(usability_score),
                    AVG(feature_satisfaction)
                FROM feedback
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        let avg = |v: Option<f64>| round_to(v.unwrap_or(0.0), 1);
        Ok(FeedbackStats {
            total_responses: total,
            avg_rating: avg(rating),
            avg_usability: avg(usability),
            avg_satisfaction: avg(satisfaction),
        })
    }
}

/// Positive scores from both analysis tables. Zero rows are "no analysis"
/// sentinels and are filtered before any averaging or bucketing.
async fn merged_scores(conn: &mut SqliteConnection) -> StoreResult<Vec<f64>> {
    Ok(sqlx::query_scalar(
        r#"
        SELECT ats_score AS score FROM resume_analysis WHERE ats_score > 0
        UNION ALL
        SELECT CAST(resume_score AS REAL) AS score FROM ai_analysis WHERE resume_score > 0
        "#,
    )
    .fetch_all(&mut *conn)
    .await?)
}

/// Per-day row counts for the last seven calendar days, today included.
/// `table` is always a compile-time constant.
async fn daily_trend(
    conn: &mut SqliteConnection,
    table: &'static str,
) -> StoreResult<Vec<DailyCount>> {
    let sql = format!(
        r#"
        SELECT DATE(created_at) AS date, COUNT(*) AS count
        FROM {table}
        WHERE created_at >= DATE('now', '-6 days')
        GROUP BY DATE(created_at)
        ORDER BY date
        "#
    );
    Ok(sqlx::query_as(&sql).fetch_all(&mut *conn).await?)
}

async fn recent_submissions(conn: &mut SqliteConnection) -> StoreResult<Vec<RecentSubmission>> {
    Ok(sqlx::query_as(
        r#"
        SELECT id, name, email, COALESCE(target_role, '') AS target_role, created_at
        FROM resume_data
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(RECENT_LIMIT)
    .fetch_all(&mut *conn)
    .await?)
}

async fn ai_summary(conn: &mut SqliteConnection) -> StoreResult<AiAnalysisStats> {
    let total_analyses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ai_analysis")
        .fetch_one(&mut *conn)
        .await?;

    let model_usage: Vec<ModelUsage> = sqlx::query_as(
        r#"
        SELECT COALESCE(model_used, '') AS model, COUNT(*) AS count
        FROM ai_analysis
        GROUP BY model_used
        ORDER BY count DESC, model ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let average: Option<f64> = sqlx::query_scalar("SELECT AVG(resume_score) FROM ai_analysis")
        .fetch_one(&mut *conn)
        .await?;

    let top_job_roles: Vec<RoleCount> = sqlx::query_as(
        r#"
        SELECT job_role AS role, COUNT(*) AS count
        FROM ai_analysis
        WHERE job_role IS NOT NULL AND job_role != ''
        GROUP BY job_role
        ORDER BY count DESC, role ASC
        LIMIT ?
        "#,
    )
    .bind(RECENT_LIMIT)
    .fetch_all(&mut *conn)
    .await?;

    Ok(AiAnalysisStats {
        total_analyses,
        model_usage,
        average_score: round_to(average.unwrap_or(0.0), 1),
        top_job_roles,
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
