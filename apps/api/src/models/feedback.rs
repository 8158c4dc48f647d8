use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackInput {
    pub rating: i64,
    pub usability_score: i64,
    pub feature_satisfaction: i64,
    pub missing_features: String,
    pub improvement_suggestions: String,
    pub user_experience: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedbackRow {
    pub id: i64,
    pub rating: Option<i64>,
    pub usability_score: Option<i64>,
    pub feature_satisfaction: Option<i64>,
    pub missing_features: Option<String>,
    pub improvement_suggestions: Option<String>,
    pub user_experience: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// Metadata for a file whose bytes live outside the store.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFileInput {
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: u64,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub upload_source: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UploadedFileRow {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub upload_source: Option<String>,
    pub timestamp: NaiveDateTime,
}
