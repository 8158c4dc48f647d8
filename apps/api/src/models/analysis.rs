use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Output of the deterministic (rule-based) analyzer. Each score is 0–100.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleScores {
    pub ats_score: f64,
    pub keyword_match_score: f64,
    pub format_score: f64,
    pub section_score: f64,
    pub missing_skills: String,
    pub recommendations: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RuleAnalysisRow {
    pub id: i64,
    pub resume_id: Option<i64>,
    pub ats_score: Option<f64>,
    pub keyword_match_score: Option<f64>,
    pub format_score: Option<f64>,
    pub section_score: Option<f64>,
    pub missing_skills: Option<String>,
    pub recommendations: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Output of the model-based analyzer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AiResult {
    pub model_used: String,
    pub resume_score: i64,
    pub job_role: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AiAnalysisRow {
    pub id: i64,
    pub resume_id: Option<i64>,
    pub model_used: Option<String>,
    pub resume_score: Option<i64>,
    pub job_role: Option<String>,
    pub created_at: NaiveDateTime,
}
