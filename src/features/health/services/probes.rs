use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;

/// A dependency whose reachability feeds the health endpoints
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Name reported in health payloads
    fn name(&self) -> &'static str;

    /// `Err` carries a human-readable reason
    async fn check(&self) -> Result<(), String>;
}

/// Bounded read against the application database
pub struct DatabaseProbe {
    pool: PgPool,
    timeout: Duration,
}

impl DatabaseProbe {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl DependencyProbe for DatabaseProbe {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), String> {
        let query = sqlx::query("SELECT id FROM users LIMIT 1").fetch_optional(&self.pool);

        match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "Database probe timed out after {}s",
                self.timeout.as_secs()
            )),
        }
    }
}

/// `GET {AI_SERVICE_URL}/health`
pub struct AiServiceProbe {
    client: reqwest::Client,
    base_url: Option<String>,
    timeout: Duration,
}

impl AiServiceProbe {
    pub fn new(client: reqwest::Client, base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            timeout,
        }
    }
}

#[async_trait]
impl DependencyProbe for AiServiceProbe {
    fn name(&self) -> &'static str {
        "ai_service"
    }

    async fn check(&self) -> Result<(), String> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| "AI service not configured".to_string())?;

        let response = self
            .client
            .get(format!("{}/health", base_url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("AI service health returned HTTP {}", response.status()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_ai_probe_healthy_upstream() {
        let url = spawn_upstream(Router::new().route("/health", get(|| async { "ok" }))).await;
        let probe = AiServiceProbe::new(reqwest::Client::new(), Some(url), Duration::from_secs(2));

        assert_eq!(probe.check().await, Ok(()));
    }

    #[tokio::test]
    async fn test_ai_probe_reports_error_status() {
        let url = spawn_upstream(Router::new().route(
            "/health",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;
        let probe = AiServiceProbe::new(reqwest::Client::new(), Some(url), Duration::from_secs(2));

        let err = probe.check().await.unwrap_err();
        assert!(err.contains("503"), "{}", err);
    }

    #[tokio::test]
    async fn test_ai_probe_unconfigured() {
        let probe = AiServiceProbe::new(reqwest::Client::new(), None, Duration::from_secs(2));

        assert_eq!(
            probe.check().await,
            Err("AI service not configured".to_string())
        );
    }
}
