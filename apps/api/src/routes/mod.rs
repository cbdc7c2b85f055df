pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::access::handlers as access;
use crate::assessment::handlers as assessment;
use crate::dashboard;
use crate::documents::handlers as documents;
use crate::invites::handlers as invites;
use crate::records::handlers as records;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Candidate profile and Restorative Record
        .route(
            "/api/v1/profile",
            get(records::handle_get_profile).put(records::handle_put_profile),
        )
        .route("/api/v1/records", get(records::handle_get_record))
        .route(
            "/api/v1/records/completeness",
            get(records::handle_record_completeness),
        )
        .route("/api/v1/records/:section", post(records::handle_create_entry))
        .route(
            "/api/v1/records/:section/:id",
            put(records::handle_update_entry).delete(records::handle_delete_entry),
        )
        .route(
            "/api/v1/wotc",
            get(records::handle_get_wotc).post(records::handle_submit_wotc),
        )
        // Access grants
        .route(
            "/api/v1/permissions",
            get(access::handle_list_granted)
                .post(access::handle_grant)
                .delete(access::handle_revoke),
        )
        // Candidate copies of issued notices
        .route("/api/v1/notices", get(documents::handle_candidate_list_notices))
        .route(
            "/api/v1/notices/:step",
            get(documents::handle_candidate_get_notice),
        )
        // HR admin
        .route("/api/v1/hr/admins", get(access::handle_list_hr_admins))
        .route(
            "/api/v1/hr/profile",
            get(access::handle_get_hr_profile).put(access::handle_put_hr_profile),
        )
        .route("/api/v1/hr/candidates", get(access::handle_list_candidates))
        .route(
            "/api/v1/hr/candidates/:user_id/record",
            get(records::handle_hr_get_record),
        )
        .route("/api/v1/hr/dashboard", get(dashboard::handle_dashboard))
        // Invitations
        .route(
            "/api/v1/invites",
            get(invites::handle_list_invites).post(invites::handle_send_invite),
        )
        .route("/api/v1/invites/:id/resend", post(invites::handle_reinvite))
        // Assessment workflow
        .route("/api/v1/assessments/steps", get(assessment::handle_list_steps))
        .route(
            "/api/v1/assessments/:user_id",
            get(assessment::handle_get_assessment),
        )
        .route(
            "/api/v1/assessments/:user_id/advance",
            post(assessment::handle_advance),
        )
        .route(
            "/api/v1/assessments/:user_id/final-decision",
            post(assessment::handle_final_decision),
        )
        .route(
            "/api/v1/assessments/:user_id/notices",
            get(documents::handle_list_notices).post(documents::handle_issue_notice),
        )
        .route(
            "/api/v1/assessments/:user_id/notices/:step",
            get(documents::handle_get_notice),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aws_sdk_s3::config::{BehaviorVersion, Region};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::cache::memory::MemoryStateCache;
    use crate::config::Config;
    use crate::email_client::fake::RecordingSender;

    fn test_state() -> AppState {
        let config = Config {
            database_url: "postgres://localhost/fairchance_test".to_string(),
            redis_url: "redis://localhost".to_string(),
            s3_bucket: "test".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "x".to_string(),
            aws_secret_access_key: "x".to_string(),
            email_api_key: "x".to_string(),
            email_api_url: "http://localhost:9999/emails".to_string(),
            email_from: "hr@example.com".to_string(),
            app_base_url: "http://localhost:3000".to_string(),
            port: 0,
            rust_log: "info".to_string(),
        };
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        AppState {
            db: PgPoolOptions::new()
                .connect_lazy(&config.database_url)
                .expect("lazy pool"),
            cache: Arc::new(MemoryStateCache::default()),
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            email: Arc::new(RecordingSender::default()),
            config,
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_steps() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::get("/api/v1/assessments/steps")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 6);
        assert_eq!(body[2]["name"], "Individualized Assessment");
    }

    #[tokio::test]
    async fn test_unknown_section_is_not_found() {
        let app = build_router(test_state());
        let payload = json!({"user_id": uuid::Uuid::new_v4(), "data": {}});
        let response = app
            .oneshot(
                Request::post("/api/v1/records/resumes")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_advance_out_of_range_rejected_before_lookup() {
        let app = build_router(test_state());
        let payload = json!({"hr_admin_id": uuid::Uuid::new_v4(), "to_step": 9});
        let response = app
            .oneshot(
                Request::post(format!("/api/v1/assessments/{}/advance", uuid::Uuid::new_v4()))
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }
}
