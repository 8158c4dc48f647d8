use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::admin::{AdminCredentials, AdminLogRow};
use crate::models::analysis::{AiAnalysisRow, AiResult, RuleAnalysisRow, RuleScores};
use crate::models::feedback::{FeedbackInput, FeedbackRow, UploadedFileInput, UploadedFileRow};
use crate::models::resume::{ResumeRecord, ResumeSubmission, SkillInput, SkillRow};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Serialize)]
pub struct ResumeDetailResponse {
    pub resume: ResumeRecord,
    pub rule_analyses: Vec<RuleAnalysisRow>,
    pub ai_analyses: Vec<AiAnalysisRow>,
    pub skills: Vec<SkillRow>,
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(req): Json<ResumeSubmission>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.records.save_resume(&req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    let resume = state.records.get_resume(id).await?;
    let rule_analyses = state.records.rule_analyses_for(id).await?;
    let ai_analyses = state.records.ai_analyses_for(id).await?;
    let skills = state.records.skills_for_resume(id).await?;
    Ok(Json(ResumeDetailResponse {
        resume,
        rule_analyses,
        ai_analyses,
        skills,
    }))
}

/// POST /api/v1/resumes/:id/analysis
pub async fn handle_save_rule_analysis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RuleScores>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.records.save_rule_analysis(id, &req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// POST /api/v1/resumes/:id/ai-analysis
pub async fn handle_save_ai_analysis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AiResult>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.records.save_ai_analysis(id, &req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// POST /api/v1/resumes/:id/skills
pub async fn handle_save_skill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SkillInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.records.save_skill(id, &req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// POST /api/v1/feedback
pub async fn handle_create_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.records.save_feedback(&req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/v1/feedback
pub async fn handle_list_feedback(
    State(state): State<AppState>,
) -> Result<Json<Vec<FeedbackRow>>, AppError> {
    Ok(Json(state.records.list_feedback().await?))
}

/// POST /api/v1/uploads
pub async fn handle_record_upload(
    State(state): State<AppState>,
    Json(req): Json<UploadedFileInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.records.save_uploaded_file(&req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/v1/uploads
pub async fn handle_list_uploads(
    State(state): State<AppState>,
) -> Result<Json<Vec<UploadedFileRow>>, AppError> {
    Ok(Json(state.records.list_uploaded_files().await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Admin
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub authenticated: bool,
    pub must_change_password: bool,
}

#[derive(Deserialize)]
pub struct PasswordChangeRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

/// Verifies credentials or fails with `Unauthorized`.
pub async fn authenticate(state: &AppState, creds: &AdminCredentials) -> Result<(), AppError> {
    if state.records.verify_admin(&creds.email, &creds.password).await? {
        Ok(())
    } else {
        tracing::warn!("Rejected admin credentials for {}", creds.email);
        Err(AppError::Unauthorized)
    }
}

/// `authenticate`, plus refusal while the account still has to replace its
/// bootstrap password. Every admin-only action except login and the
/// password change itself goes through here.
pub async fn authorize(state: &AppState, creds: &AdminCredentials) -> Result<(), AppError> {
    authenticate(state, creds).await?;
    if state
        .records
        .admin_requires_password_change(&creds.email)
        .await?
    {
        tracing::warn!("Admin {} must change password before acting", creds.email);
        return Err(AppError::PasswordChangeRequired);
    }
    Ok(())
}

/// POST /api/v1/admin/login
pub async fn handle_admin_login(
    State(state): State<AppState>,
    Json(creds): Json<AdminCredentials>,
) -> Result<Json<LoginResponse>, AppError> {
    authenticate(&state, &creds).await?;
    let must_change_password = state
        .records
        .admin_requires_password_change(&creds.email)
        .await?;
    state.records.log_admin_action(&creds.email, "login").await;
    Ok(Json(LoginResponse {
        authenticated: true,
        must_change_password,
    }))
}

/// POST /api/v1/admin/logout
pub async fn handle_admin_logout(
    State(state): State<AppState>,
    Json(creds): Json<AdminCredentials>,
) -> Result<StatusCode, AppError> {
    authenticate(&state, &creds).await?;
    state.records.log_admin_action(&creds.email, "logout").await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/password
pub async fn handle_change_password(
    State(state): State<AppState>,
    Json(req): Json<PasswordChangeRequest>,
) -> Result<StatusCode, AppError> {
    let changed = state
        .records
        .change_admin_password(&req.email, &req.current_password, &req.new_password)
        .await?;
    if !changed {
        return Err(AppError::Unauthorized);
    }
    state
        .records
        .log_admin_action(&req.email, "password_change")
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/logs
pub async fn handle_admin_logs(
    State(state): State<AppState>,
    Json(creds): Json<AdminCredentials>,
) -> Result<Json<Vec<AdminLogRow>>, AppError> {
    authorize(&state, &creds).await?;
    Ok(Json(state.records.list_admin_logs().await?))
}
