pub mod actor;
pub mod admin;
pub mod health;
pub mod jobs;
pub mod recruiter;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Public browsing and candidate actions
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route("/api/v1/jobs/:id/apply", post(jobs::handle_apply))
        .route("/api/v1/jobs/:id/applied", get(jobs::handle_check_applied))
        .route("/api/v1/applications", get(jobs::handle_my_applications))
        .route(
            "/api/v1/applications/:id/withdraw",
            post(jobs::handle_withdraw),
        )
        .route("/api/v1/saved-jobs", get(jobs::handle_saved_jobs))
        .route(
            "/api/v1/saved-jobs/:job_id",
            post(jobs::handle_save_job).delete(jobs::handle_unsave_job),
        )
        // Recruiter
        .route(
            "/api/v1/recruiter/jobs",
            get(recruiter::handle_list_jobs).post(recruiter::handle_create_job),
        )
        .route(
            "/api/v1/recruiter/jobs/:id",
            put(recruiter::handle_update_job).delete(recruiter::handle_delete_job),
        )
        .route(
            "/api/v1/recruiter/jobs/:id/submit",
            post(recruiter::handle_submit_job),
        )
        .route(
            "/api/v1/recruiter/applications",
            get(recruiter::handle_list_applications),
        )
        .route(
            "/api/v1/recruiter/applications/:id",
            put(recruiter::handle_update_application).delete(recruiter::handle_delete_application),
        )
        .route(
            "/api/v1/recruiter/dashboard",
            get(recruiter::handle_dashboard),
        )
        // Admin moderation
        .route("/api/v1/admin/jobs", get(admin::handle_list_jobs))
        .route("/api/v1/admin/jobs/pending", get(admin::handle_pending_jobs))
        .route("/api/v1/admin/jobs/:id/approve", post(admin::handle_approve))
        .route("/api/v1/admin/jobs/:id/reject", post(admin::handle_reject))
        .route("/api/v1/admin/dashboard", get(admin::handle_dashboard))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::{Config, LifecyclePolicy};
    use crate::routes::actor::{USER_ID_HEADER, USER_ROLE_HEADER};

    /// The pool never connects; every request below is answered before
    /// any query runs.
    fn app() -> Router {
        let config = Config {
            database_url: "postgres://localhost/jobboard_test".to_string(),
            db_max_connections: 1,
            port: 0,
            rust_log: "info".to_string(),
            lifecycle: LifecyclePolicy::default(),
        };
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        build_router(AppState { db, config })
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_recruiter_routes_require_identity() {
        let (status, body) = send(
            Request::get("/api/v1/recruiter/jobs")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_admin_routes_reject_other_roles() {
        let (status, body) = send(
            Request::post(format!("/api/v1/admin/jobs/{}/approve", Uuid::new_v4()))
                .header(USER_ID_HEADER, Uuid::new_v4().to_string())
                .header(USER_ROLE_HEADER, "recruiter")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_bad_request() {
        let (status, body) = send(
            Request::get("/api/v1/jobs?status=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
