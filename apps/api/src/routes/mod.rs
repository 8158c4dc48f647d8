pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analytics::handlers as analytics;
use crate::maintenance::handlers as maintenance;
use crate::state::AppState;
use crate::store::handlers as store;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Records
        .route(
            "/api/v1/resumes",
            post(store::handle_create_resume).get(analytics::handle_list_submissions),
        )
        .route("/api/v1/resumes/:id", get(store::handle_get_resume))
        .route(
            "/api/v1/resumes/:id/analysis",
            post(store::handle_save_rule_analysis),
        )
        .route(
            "/api/v1/resumes/:id/ai-analysis",
            post(store::handle_save_ai_analysis),
        )
        .route("/api/v1/resumes/:id/skills", post(store::handle_save_skill))
        .route(
            "/api/v1/feedback",
            post(store::handle_create_feedback).get(store::handle_list_feedback),
        )
        .route(
            "/api/v1/feedback/stats",
            get(analytics::handle_feedback_stats),
        )
        .route(
            "/api/v1/uploads",
            post(store::handle_record_upload).get(store::handle_list_uploads),
        )
        // Admin
        .route("/api/v1/admin/login", post(store::handle_admin_login))
        .route("/api/v1/admin/logout", post(store::handle_admin_logout))
        .route("/api/v1/admin/password", post(store::handle_change_password))
        .route("/api/v1/admin/logs", post(store::handle_admin_logs))
        // Dashboard
        .route("/api/v1/dashboard", get(analytics::handle_dashboard))
        .route("/api/v1/dashboard/stats", get(analytics::handle_resume_stats))
        .route("/api/v1/dashboard/ai", get(analytics::handle_ai_stats))
        .route(
            "/api/v1/dashboard/ai/detailed",
            get(analytics::handle_ai_stats_detailed),
        )
        // Maintenance
        .route(
            "/api/v1/admin/maintenance/status",
            post(maintenance::handle_status),
        )
        .route(
            "/api/v1/admin/maintenance/clear/:table",
            post(maintenance::handle_clear_table),
        )
        .route(
            "/api/v1/admin/maintenance/reset-dashboard",
            post(maintenance::handle_reset_dashboard),
        )
        .route(
            "/api/v1/admin/maintenance/reset-sequences",
            post(maintenance::handle_reset_sequences),
        )
        .route(
            "/api/v1/admin/maintenance/reset-ai-analysis",
            post(maintenance::handle_reset_ai_analysis),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_support::{migrated_db, test_bootstrap, TestDb};

    const ADMIN: &str = "admin@test.local";
    const BOOTSTRAP_PASSWORD: &str = "bootstrap-secret";
    const PASSWORD: &str = "a-much-better-one";

    async fn app() -> (TestDb, Router) {
        let db = migrated_db().await;
        let router = build_router(AppState::new(db.pool.clone(), test_bootstrap()));
        (db, router)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn bootstrap_creds() -> Value {
        json!({"email": ADMIN, "password": BOOTSTRAP_PASSWORD})
    }

    fn creds() -> Value {
        json!({"email": ADMIN, "password": PASSWORD})
    }

    /// Replaces the bootstrap password so admin-only actions are allowed.
    async fn app_with_active_admin() -> (TestDb, Router) {
        let (db, app) = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/admin/password",
            Some(json!({
                "email": ADMIN,
                "current_password": BOOTSTRAP_PASSWORD,
                "new_password": PASSWORD
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        (db, app)
    }

    async fn log_actions(db: &TestDb) -> Vec<(String, String)> {
        sqlx::query_as("SELECT admin_email, action FROM admin_logs ORDER BY id")
            .fetch_all(&db.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_db, app) = app().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "resume-dashboard");
    }

    #[tokio::test]
    async fn test_resume_lifecycle() {
        let (_db, app) = app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/resumes",
            Some(json!({
                "personal_info": {"full_name": "Ada", "email": "ada@example.com"},
                "target_role": "Engineer",
                "skills": ["Rust"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/resumes/{id}/analysis"),
            Some(json!({"ats_score": 85.0})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "GET", &format!("/api/v1/resumes/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume"]["name"], "Ada");
        assert_eq!(body["rule_analyses"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, "GET", "/api/v1/resumes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["score"], 85.0);
        assert_eq!(body[0]["predicted_role"], "Engineer");
    }

    #[tokio::test]
    async fn test_unknown_resume_is_404() {
        let (_db, app) = app().await;
        let (status, body) = send(&app, "GET", "/api/v1/resumes/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/resumes/999/ai-analysis",
            Some(json!({"model_used": "m", "resume_score": 50, "job_role": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_400() {
        let (_db, app) = app().await;
        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/resumes",
            Some(json!({"personal_info": {"full_name": "Ada", "email": "ada@example.com"}})),
        )
        .await;
        let id = body["id"].as_i64().unwrap();
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/resumes/{id}/analysis"),
            Some(json!({"ats_score": 140.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_login() {
        let (_db, app) = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/admin/login",
            Some(json!({"email": ADMIN, "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            send(&app, "POST", "/api/v1/admin/login", Some(bootstrap_creds())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["must_change_password"], true);
    }

    #[tokio::test]
    async fn test_password_change_clears_flag() {
        let (_db, app) = app_with_active_admin().await;
        let (status, body) = send(&app, "POST", "/api/v1/admin/login", Some(creds())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["must_change_password"], false);

        let (status, body) = send(&app, "POST", "/api/v1/admin/logs", Some(creds())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["action"], "login");
        assert_eq!(body[1]["action"], "password_change");
    }

    #[tokio::test]
    async fn test_bootstrap_password_blocks_admin_actions() {
        let (db, app) = app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/admin/maintenance/reset-dashboard",
            Some(bootstrap_creds()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "PASSWORD_CHANGE_REQUIRED");

        let (status, _) = send(&app, "POST", "/api/v1/admin/logs", Some(bootstrap_creds())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(log_actions(&db).await.is_empty());

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/admin/password",
            Some(json!({
                "email": ADMIN,
                "current_password": BOOTSTRAP_PASSWORD,
                "new_password": PASSWORD
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/admin/maintenance/reset-dashboard",
            Some(creds()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_logout_requires_valid_credentials() {
        let (db, app) = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/admin/logout",
            Some(json!({"email": "ceo@elsewhere.example"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/admin/logout",
            Some(json!({"email": ADMIN, "password": "guess"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(log_actions(&db).await.is_empty());

        let (status, _) = send(&app, "POST", "/api/v1/admin/logout", Some(bootstrap_creds())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(
            log_actions(&db).await,
            vec![(ADMIN.to_string(), "logout".to_string())]
        );
    }

    #[tokio::test]
    async fn test_maintenance_requires_credentials() {
        let (_db, app) = app_with_active_admin().await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/admin/maintenance/reset-dashboard",
            Some(json!({"email": ADMIN, "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refused_clear_reports_outcome_and_is_logged() {
        let (db, app) = app_with_active_admin().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/admin/maintenance/clear/admin",
            Some(creds()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("protected"));
        assert!(body.get("data").is_none());

        let (_, last) = log_actions(&db).await.pop().unwrap();
        assert!(last.starts_with("clear_table: Error clearing admin"));

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/admin/maintenance/status",
            Some(creds()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let admin = body["data"]["tables"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["table"] == "admin")
            .unwrap();
        assert_eq!(admin["status"], "rows");
        assert_eq!(admin["count"], 1);
    }

    #[tokio::test]
    async fn test_clear_table_reports_deleted_count() {
        let (_db, app) = app_with_active_admin().await;
        send(&app, "POST", "/api/v1/feedback", Some(json!({"rating": 4}))).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/admin/maintenance/clear/feedback",
            Some(creds()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Cleared feedback: 1 records deleted");
        assert_eq!(body["data"], 1);
    }

    #[tokio::test]
    async fn test_reset_dashboard_reports_outcome_and_is_logged() {
        let (db, app) = app_with_active_admin().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/admin/maintenance/reset-dashboard",
            Some(creds()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Dashboard data reset completed"));
        assert_eq!(body["data"]["tables"].as_array().unwrap().len(), 7);
        assert_eq!(body["details"].as_array().unwrap().len(), 7);

        let logs = log_actions(&db).await;
        assert_eq!(logs.len(), 1);
        assert!(logs[0].1.starts_with("reset_dashboard: Dashboard data reset completed"));
    }

    #[tokio::test]
    async fn test_dashboard_on_empty_store() {
        let (_db, app) = app().await;
        let (status, body) = send(&app, "GET", "/api/v1/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_resumes"], 0);
        assert_eq!(body["avg_score"], 0.0);
        assert_eq!(body["score_distribution"].as_array().unwrap().len(), 4);
    }
}
