use axum::{extract::State, Json};

use crate::analytics::engine::{
    AiAnalysisStats, DashboardAnalytics, DetailedAiAnalysisStats, FeedbackStats,
    ResolvedSubmission, ResumeStats,
};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/resumes
pub async fn handle_list_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResolvedSubmission>>, AppError> {
    Ok(Json(state.analytics.submissions().await?))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardAnalytics>, AppError> {
    Ok(Json(state.analytics.dashboard().await?))
}

/// GET /api/v1/dashboard/stats
pub async fn handle_resume_stats(
    State(state): State<AppState>,
) -> Result<Json<ResumeStats>, AppError> {
    Ok(Json(state.analytics.resume_stats().await?))
}

/// GET /api/v1/dashboard/ai
pub async fn handle_ai_stats(
    State(state): State<AppState>,
) -> Result<Json<AiAnalysisStats>, AppError> {
    Ok(Json(state.analytics.ai_stats().await?))
}

/// GET /api/v1/dashboard/ai/detailed
pub async fn handle_ai_stats_detailed(
    State(state): State<AppState>,
) -> Result<Json<DetailedAiAnalysisStats>, AppError> {
    Ok(Json(state.analytics.ai_stats_detailed().await?))
}

/// GET /api/v1/feedback/stats
pub async fn handle_feedback_stats(
    State(state): State<AppState>,
) -> Result<Json<FeedbackStats>, AppError> {
    Ok(Json(state.analytics.feedback_stats().await?))
}
