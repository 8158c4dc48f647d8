use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, StoreResult};
use crate::maintenance::service::{DatabaseStatus, ResetReport};
use crate::maintenance::OperationOutcome;
use crate::models::admin::AdminCredentials;
use crate::state::AppState;
use crate::store::handlers::authorize;

/// Body of every maintenance endpoint: the outcome, plus the structured
/// report when the operation produced one. Refused and failed operations
/// come back in the same shape with `success: false`.
#[derive(Debug, Serialize)]
pub struct MaintenanceResponse<T> {
    #[serde(flatten)]
    pub outcome: OperationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

type MaintenanceReply<T> = Result<(StatusCode, Json<MaintenanceResponse<T>>), AppError>;

/// Records the attempt in `admin_logs`, whatever its result, and builds the reply.
async fn respond<T>(
    state: &AppState,
    email: &str,
    action: &str,
    outcome: OperationOutcome,
    result: StoreResult<T>,
) -> MaintenanceReply<T> {
    state
        .records
        .log_admin_action(email, &format!("{action}: {}", outcome.message))
        .await;

    let (status, data) = match result {
        Ok(data) => (StatusCode::OK, Some(data)),
        Err(e) => (e.status_code(), None),
    };
    Ok((status, Json(MaintenanceResponse { outcome, data })))
}

/// POST /api/v1/admin/maintenance/status
pub async fn handle_status(
    State(state): State<AppState>,
    Json(creds): Json<AdminCredentials>,
) -> MaintenanceReply<DatabaseStatus> {
    authorize(&state, &creds).await?;
    let result = state.maintenance.status().await;
    let outcome = OperationOutcome::from_status(&result);
    respond(&state, &creds.email, "status", outcome, result).await
}

/// POST /api/v1/admin/maintenance/clear/:table
pub async fn handle_clear_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(creds): Json<AdminCredentials>,
) -> MaintenanceReply<u64> {
    authorize(&state, &creds).await?;
    let result = state.maintenance.clear_table(&table).await;
    let outcome = OperationOutcome::from_clear(&table, &result);
    respond(&state, &creds.email, "clear_table", outcome, result).await
}

/// POST /api/v1/admin/maintenance/reset-dashboard
pub async fn handle_reset_dashboard(
    State(state): State<AppState>,
    Json(creds): Json<AdminCredentials>,
) -> MaintenanceReply<ResetReport> {
    authorize(&state, &creds).await?;
    let result = state.maintenance.reset_dashboard().await;
    let outcome = OperationOutcome::from_reset(&result);
    respond(&state, &creds.email, "reset_dashboard", outcome, result).await
}

/// POST /api/v1/admin/maintenance/reset-sequences
pub async fn handle_reset_sequences(
    State(state): State<AppState>,
    Json(creds): Json<AdminCredentials>,
) -> MaintenanceReply<()> {
    authorize(&state, &creds).await?;
    let result = state.maintenance.reset_sequence_counters().await;
    let outcome = OperationOutcome::from_unit(
        &result,
        "Sequence counters reset",
        "Error resetting sequence counters",
    );
    respond(&state, &creds.email, "reset_sequences", outcome, result).await
}

/// POST /api/v1/admin/maintenance/reset-ai-analysis
pub async fn handle_reset_ai_analysis(
    State(state): State<AppState>,
    Json(creds): Json<AdminCredentials>,
) -> MaintenanceReply<u64> {
    authorize(&state, &creds).await?;
    let result = state.maintenance.reset_ai_analysis().await;
    let outcome = OperationOutcome::from_clear("ai_analysis", &result);
    respond(&state, &creds.email, "reset_ai_analysis", outcome, result).await
}
