use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for every store, analytics and maintenance operation.
/// Callers can tell "no rows" (an `Ok` with an empty collection) apart from
/// "operation failed" (an `Err`).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Table '{0}' is protected; reset credentials instead of clearing it")]
    ProtectedTable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("Schema migration {version} failed: {message}")]
    Migration { version: i64, message: String },

    #[error("Credential error: {0}")]
    Credential(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Maps an insert failure, turning unique-constraint violations into
    /// `Integrity` so duplicate keys are not reported as storage outages.
    pub fn from_insert(err: sqlx::Error, what: &str) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                StoreError::Integrity(format!("duplicate {what}"))
            }
            _ => StoreError::Unavailable(err),
        }
    }

    /// HTTP status for surfaces that report the error inside their own body.
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::Integrity(_) => StatusCode::CONFLICT,
            StoreError::ProtectedTable(_) => StatusCode::FORBIDDEN,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Unavailable(_)
            | StoreError::Migration { .. }
            | StoreError::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Password change required")]
    PasswordChangeRequired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::Integrity(msg) => AppError::Conflict(msg),
            e @ StoreError::ProtectedTable(_) => AppError::Forbidden(e.to_string()),
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Unavailable(e) => AppError::Database(e),
            e @ (StoreError::Migration { .. } | StoreError::Credential(_)) => {
                AppError::Internal(anyhow::Error::new(e))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid admin credentials".to_string(),
            ),
            AppError::PasswordChangeRequired => (
                StatusCode::FORBIDDEN,
                "PASSWORD_CHANGE_REQUIRED",
                "Change the account password before performing admin actions".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_table_maps_to_forbidden() {
        let err: AppError = StoreError::ProtectedTable("admin".to_string()).into();
        assert!(matches!(err, AppError::Forbidden(ref m) if m.contains("admin")));
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_validation_and_integrity_status_codes() {
        let validation: AppError = StoreError::Validation("ats_score".to_string()).into();
        assert_eq!(validation.into_response().status(), StatusCode::BAD_REQUEST);

        let integrity: AppError = StoreError::Integrity("duplicate admin email".to_string()).into();
        assert_eq!(integrity.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_status_code_matches_app_error_mapping() {
        let errors = || {
            vec![
                StoreError::Validation("x".to_string()),
                StoreError::Integrity("x".to_string()),
                StoreError::ProtectedTable("admin".to_string()),
                StoreError::NotFound("x".to_string()),
                StoreError::Credential("x".to_string()),
            ]
        };
        for (err, same) in errors().into_iter().zip(errors()) {
            let expected = err.status_code();
            let app: AppError = same.into();
            assert_eq!(app.into_response().status(), expected);
        }
    }

    #[test]
    fn test_password_change_required_is_403() {
        let response = AppError::PasswordChangeRequired.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err: AppError = StoreError::NotFound("resume 9".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
