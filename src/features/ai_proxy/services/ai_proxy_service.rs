use crate::core::config::{AiServiceConfig, Environment};
use crate::shared::constants::BACKEND_USER_AGENT;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::time::Duration;

/// Incoming request, reduced to what is forwarded
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Successful upstream answer, passed through untouched
#[derive(Debug)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

#[derive(Debug)]
pub enum ProxyError {
    /// `AI_SERVICE_URL` is unset
    NotConfigured,
    /// Upstream answered with a non-2xx status
    Upstream {
        status: StatusCode,
        message: String,
        details: Value,
    },
    /// Transport failure or timeout; `message` is already scrubbed for the environment
    Unavailable { message: String },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "AI service not configured",
                    "message": "AI_SERVICE_URL environment variable is missing",
                })),
            )
                .into_response(),
            ProxyError::Upstream {
                status,
                message,
                details,
            } => (
                status,
                Json(serde_json::json!({
                    "error": "AI service error",
                    "message": message,
                    "details": details,
                })),
            )
                .into_response(),
            ProxyError::Unavailable { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "AI service unavailable",
                    "message": message,
                })),
            )
                .into_response(),
        }
    }
}

pub struct AiProxyService {
    client: reqwest::Client,
    base_url: Option<String>,
    internal_api_key: String,
    timeout: Duration,
    environment: Environment,
}

impl AiProxyService {
    pub fn new(client: reqwest::Client, config: &AiServiceConfig, environment: Environment) -> Self {
        Self {
            client,
            base_url: config
                .service_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            internal_api_key: config.internal_api_key.clone(),
            timeout: config.proxy_timeout,
            environment,
        }
    }

    fn target_url(base_url: &str, request: &ProxyRequest) -> String {
        let mut url = format!("{}/{}", base_url, request.path.trim_start_matches('/'));
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    pub async fn forward(&self, request: ProxyRequest) -> Result<ProxyResponse, ProxyError> {
        let base_url = self.base_url.as_deref().ok_or_else(|| {
            tracing::error!("AI proxy called but AI_SERVICE_URL is not set");
            ProxyError::NotConfigured
        })?;

        let url = Self::target_url(base_url, &request);
        tracing::info!("Proxying AI request: {} {}", request.method, url);

        let content_type = request
            .content_type
            .clone()
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(header::CONTENT_TYPE, content_type)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.internal_api_key),
            )
            .header(header::USER_AGENT, BACKEND_USER_AGENT)
            .timeout(self.timeout);

        if request.method != Method::GET && request.method != Method::HEAD {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(|e| self.unavailable(e))?;
        let status = response.status();
        let upstream_content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(|e| self.unavailable(e))?;

        if status.is_success() {
            return Ok(ProxyResponse {
                status,
                content_type: upstream_content_type,
                body,
            });
        }

        let details = serde_json::from_slice::<Value>(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
        let message = ["message", "detail"]
            .iter()
            .find_map(|key| details.get(key).and_then(Value::as_str))
            .unwrap_or("AI service request failed")
            .to_string();

        tracing::warn!("AI service returned {} for {}: {}", status, url, message);

        Err(ProxyError::Upstream {
            status,
            message,
            details,
        })
    }

    fn unavailable(&self, err: reqwest::Error) -> ProxyError {
        tracing::error!("AI service proxy error: {}", err);
        ProxyError::Unavailable {
            message: self.environment.public_error_message(&err.to_string()),
        }
    }
}
