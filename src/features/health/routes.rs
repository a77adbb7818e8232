use crate::features::health::handlers::health_handler;
use crate::features::health::services::HealthService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<HealthService>) -> Router {
    Router::new()
        .route("/health", get(health_handler::health))
        .route("/api/health", get(health_handler::health))
        .route("/health/detailed", get(health_handler::detailed_health))
        .route("/api/health/detailed", get(health_handler::detailed_health))
        .route("/ready", get(health_handler::readiness))
        .route("/live", get(health_handler::liveness))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Environment;
    use crate::features::health::DependencyProbe;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    struct StaticProbe {
        name: &'static str,
        outcome: Result<(), String>,
    }

    #[async_trait]
    impl DependencyProbe for StaticProbe {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn check(&self) -> Result<(), String> {
            self.outcome.clone()
        }
    }

    fn server(database_ok: bool, ai_ok: bool) -> TestServer {
        let outcome = |ok: bool, msg: &str| if ok { Ok(()) } else { Err(msg.to_string()) };
        let service = HealthService::new(
            "1.0.0".to_string(),
            Environment::Development,
            Arc::new(StaticProbe {
                name: "database",
                outcome: outcome(database_ok, "connection refused"),
            }),
            Arc::new(StaticProbe {
                name: "ai_service",
                outcome: outcome(ai_ok, "AI service not configured"),
            }),
        );
        TestServer::new(routes(Arc::new(service))).unwrap()
    }

    #[tokio::test]
    async fn test_basic_health_is_always_ok() {
        let server = server(false, false);

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["environment"], "development");

        server.get("/api/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_detailed_all_healthy() {
        let response = server(true, true).get("/health/detailed").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["service"], "healthy");
        assert_eq!(body["database"], "healthy");
        assert_eq!(body["dependencies"]["database"], "connected");
        assert_eq!(body["dependencies"]["ai_service"], "connected");
        assert_eq!(body["failing"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_detailed_database_down_is_degraded() {
        let response = server(false, true).get("/health/detailed").await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["service"], "degraded");
        assert_eq!(body["database"], "unhealthy");
        assert_eq!(body["ai_service"], "healthy");
        assert_eq!(body["dependencies"]["database"], "disconnected");
        assert_eq!(body["failing"], serde_json::json!(["database"]));
        assert_eq!(body["errors"]["database"], "connection refused");
    }

    #[tokio::test]
    async fn test_detailed_everything_down_is_unhealthy() {
        let response = server(false, false).get("/api/health/detailed").await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["service"], "unhealthy");
        assert_eq!(body["failing"], serde_json::json!(["database", "ai_service"]));
        assert_eq!(body["errors"]["ai_service"], "AI service not configured");
    }

    #[tokio::test]
    async fn test_readiness_follows_database() {
        let ready = server(true, false).get("/ready").await;
        ready.assert_status_ok();
        let body: Value = ready.json();
        assert_eq!(body["status"], "ready");
        assert!(body.get("error").is_none());

        let not_ready = server(false, true).get("/ready").await;
        not_ready.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = not_ready.json();
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["error"], "connection refused");
    }

    #[tokio::test]
    async fn test_liveness_reports_pid() {
        let response = server(false, false).get("/live").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "alive");
        assert_eq!(body["pid"], std::process::id());
    }
}
