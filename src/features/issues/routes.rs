use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::issues::handlers;
use crate::features::issues::services::IssueService;

/// Read-only issue routes (no authentication required)
pub fn public_routes(service: Arc<IssueService>) -> Router {
    Router::new()
        .route("/api/issues", get(handlers::list_issues))
        .route("/api/issues/{id}", get(handlers::get_issue))
        .with_state(service)
}

/// Issue routes acting on behalf of the caller (require JWT authentication)
pub fn protected_routes(service: Arc<IssueService>) -> Router {
    Router::new()
        .route("/api/issues", post(handlers::create_issue))
        .route("/api/issues/mine", get(handlers::list_my_issues))
        .route(
            "/api/issues/{id}",
            axum::routing::put(handlers::update_issue).delete(handlers::delete_issue),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::middleware::auth_middleware;
    use crate::features::auth::JwtValidator;
    use crate::shared::test_helpers::{
        issue_test_token, lazy_test_pool, test_auth_config, with_test_auth, TEST_USER_ID,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn app() -> Router {
        let service = Arc::new(IssueService::new(lazy_test_pool()));
        let validator = Arc::new(JwtValidator::new(&test_auth_config()));
        Router::new()
            .merge(protected_routes(Arc::clone(&service)).route_layer(
                axum::middleware::from_fn_with_state(validator, auth_middleware),
            ))
            .merge(public_routes(service))
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let server = TestServer::new(app()).unwrap();

        let response = server
            .post("/api/issues")
            .json(&json!({ "title": "Pothole" }))
            .await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Missing authorization header");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload_before_database() {
        let server = TestServer::new(app()).unwrap();
        let token = issue_test_token(&test_auth_config(), TEST_USER_ID, "authenticated", 3600);

        let response = server
            .post("/api/issues")
            .authorization_bearer(token)
            .json(&json!({
                "title": "Pothole",
                "category": "infrastructure",
                "images": [],
                "latitude": 27.7,
                "longitude": 85.3
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let server = TestServer::new(with_test_auth(protected_routes(Arc::new(
            IssueService::new(lazy_test_pool()),
        ))))
        .unwrap();

        let response = server
            .post("/api/issues")
            .json(&json!({
                "title": "   ",
                "category": "safety",
                "images": ["file:///photo.jpg"],
                "latitude": 27.7,
                "longitude": 85.3
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title() {
        let server = TestServer::new(with_test_auth(protected_routes(Arc::new(
            IssueService::new(lazy_test_pool()),
        ))))
        .unwrap();

        let response = server
            .put("/api/issues/0195a0d2-7c3e-7b41-9a50-3f2d8c1e4b6a")
            .json(&json!({ "title": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Title must not be blank");
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let server = TestServer::new(app()).unwrap();

        let response = server
            .get("/api/issues")
            .add_query_param("category", "weather")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid query parameters"));
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected() {
        let server = TestServer::new(app()).unwrap();

        server
            .get("/api/issues/not-a-uuid")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
