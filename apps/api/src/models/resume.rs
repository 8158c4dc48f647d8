use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Contact block of a submission. Every field is optional on input and
/// stored as an empty string when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
}

/// Structured résumé submission handed over by the form/upload glue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeSubmission {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub target_role: String,
    pub target_category: String,
    pub education: Vec<Value>,
    pub experience: Vec<Value>,
    pub projects: Vec<Value>,
    pub skills: Vec<Value>,
    pub template: String,
}

/// Raw `resume_data` row. Link and section columns are nullable in legacy data.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub summary: Option<String>,
    pub target_role: Option<String>,
    pub target_category: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub projects: Option<String>,
    pub skills: Option<String>,
    pub template: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A stored submission with its section lists decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub summary: String,
    pub target_role: String,
    pub target_category: String,
    pub education: Vec<Value>,
    pub experience: Vec<Value>,
    pub projects: Vec<Value>,
    pub skills: Vec<Value>,
    pub template: String,
    pub created_at: NaiveDateTime,
}

impl From<ResumeRow> for ResumeRecord {
    fn from(row: ResumeRow) -> Self {
        ResumeRecord {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            linkedin: row.linkedin.unwrap_or_default(),
            github: row.github.unwrap_or_default(),
            portfolio: row.portfolio.unwrap_or_default(),
            summary: row.summary.unwrap_or_default(),
            target_role: row.target_role.unwrap_or_default(),
            target_category: row.target_category.unwrap_or_default(),
            education: decode_list(row.education.as_deref()),
            experience: decode_list(row.experience.as_deref()),
            projects: decode_list(row.projects.as_deref()),
            skills: decode_list(row.skills.as_deref()),
            template: row.template.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// Serializes an ordered section list for the TEXT column.
pub fn encode_list(items: &[Value]) -> String {
    Value::Array(items.to_vec()).to_string()
}

/// Decodes a section column. Rows written before lists were stored as JSON
/// come back as a single string element rather than failing the read.
pub fn decode_list(raw: Option<&str>) -> Vec<Value> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Vec::new(),
        Some(raw) => raw,
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => vec![other],
        Err(_) => vec![Value::String(raw.to_string())],
    }
}

/// Input for a `resume_skills` row.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillInput {
    pub skill_name: String,
    pub skill_category: String,
    pub proficiency_score: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SkillRow {
    pub id: i64,
    pub resume_id: Option<i64>,
    pub skill_name: String,
    pub skill_category: String,
    pub proficiency_score: Option<f64>,
    pub created_at: NaiveDateTime,
}
