use crate::features::users::handlers::profile_handler;
use crate::features::users::services::UserProfileService;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Note: requires authentication
pub fn routes(service: Arc<UserProfileService>) -> Router {
    Router::new()
        .route(
            "/api/users/me",
            get(profile_handler::get_profile)
                .post(profile_handler::provision_profile)
                .put(profile_handler::update_profile),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_test_pool, with_test_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_rejects_invalid_avatar() {
        let service = Arc::new(UserProfileService::new(lazy_test_pool()));
        let server = TestServer::new(with_test_auth(routes(service))).unwrap();

        let response = server
            .put("/api/users/me")
            .json(&json!({ "avatar_url": "not a url" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let service = Arc::new(UserProfileService::new(lazy_test_pool()));
        let server = TestServer::new(routes(service)).unwrap();

        server.get("/api/users/me").await.assert_status_unauthorized();
    }
}
