use crate::core::config::Environment;
use crate::core::error::{AppError, ErrorDetail};
use crate::features::auth::JwtValidator;
use crate::shared::types::ApiResponse;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::prelude::*;
use lazy_static::lazy_static;
use regex::Regex;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::ResponseForPanic;
use tower_http::cors::{AllowOrigin, Any as AnyOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

lazy_static! {
    /// Preview deployments of the web client
    static ref PREVIEW_ORIGIN_REGEX: Regex =
        Regex::new(r"^https://[a-z0-9-]+(\.[a-z0-9-]+)*\.vercel\.app$").unwrap();
}

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

/// Whether a browser origin may call the API
pub fn is_origin_allowed(origin: &str, allowed_origins: &[String]) -> bool {
    allowed_origins.iter().any(|o| o == origin) || PREVIEW_ORIGIN_REGEX.is_match(origin)
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    // If origins list contains "*", allow any origin (credentials cannot be combined with it)
    if allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin)
            .allow_origin(AnyOrigin);
    }

    let allowed = Arc::new(allowed_origins);
    CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ])
        .allow_origin(AllowOrigin::predicate(move |origin, _parts| {
            origin
                .to_str()
                .map(|o| is_origin_allowed(o, &allowed))
                .unwrap_or(false)
        }))
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok());

            if let Some(encoded) = auth_header.and_then(|h| h.strip_prefix("Basic ")) {
                let decoded = BASE64_STANDARD
                    .decode(encoded)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok());
                if decoded.as_deref() == Some(credentials.as_str()) {
                    return Ok(next.run(req).await);
                }
            }

            Err((
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")],
                "Unauthorized",
            )
                .into_response())
        })
    }
}

pub async fn auth_middleware(
    State(validator): State<Arc<JwtValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let user = validator.validate_token(token)?;

    // Insert authenticated user into request extensions
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Fallback for unmatched routes
pub async fn not_found(method: Method, uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Route not found",
            "path": uri.path_and_query().map_or(uri.path(), |p| p.as_str()),
            "method": method.as_str(),
        })),
    )
        .into_response()
}

/// Replaces the generic 500 message with the real cause in development
pub async fn expose_error_detail(
    State(environment): State<Environment>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    if !environment.is_development() {
        return response;
    }

    let status = response.status();
    (status, Json(ApiResponse::<()>::error(Some(detail), None))).into_response()
}

/// Renders handler panics as a JSON 500, with detail only outside production
#[derive(Clone, Copy, Debug)]
pub struct PanicResponder {
    pub environment: Environment,
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(
        &mut self,
        err: Box<dyn Any + Send + 'static>,
    ) -> axum::http::Response<Self::ResponseBody> {
        let detail = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "Unknown panic".to_string()
        };

        tracing::error!("Handler panicked: {}", detail);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "Something went wrong!",
                "message": self.environment.public_error_message(&detail),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use axum_test::TestServer;
    use tower_http::catch_panic::CatchPanicLayer;

    #[test]
    fn test_origin_allow_list() {
        let allowed = vec!["http://localhost:19006".to_string()];
        assert!(is_origin_allowed("http://localhost:19006", &allowed));
        assert!(is_origin_allowed("https://nivaran-git-main.vercel.app", &allowed));
        assert!(!is_origin_allowed("https://evil.example.com", &allowed));
        assert!(!is_origin_allowed("https://vercel.app.evil.com", &allowed));
    }

    async fn boom() -> &'static str {
        panic!("kaboom")
    }

    fn panicking_app(environment: Environment) -> Router {
        Router::new()
            .route("/boom", get(boom))
            .fallback(not_found)
            .layer(CatchPanicLayer::custom(PanicResponder { environment }))
    }

    #[tokio::test]
    async fn test_panic_hides_detail_in_production() {
        let server = TestServer::new(panicking_app(Environment::Production)).unwrap();

        let response = server.get("/boom").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Something went wrong!");
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_panic_shows_detail_in_development() {
        let server = TestServer::new(panicking_app(Environment::Development)).unwrap();

        let body: serde_json::Value = server.get("/boom").await.json();
        assert_eq!(body["message"], "kaboom");
    }

    async fn failing() -> Result<&'static str, AppError> {
        Err(AppError::Internal("connection pool timed out".to_string()))
    }

    async fn missing() -> Result<&'static str, AppError> {
        Err(AppError::NotFound("Issue not found".to_string()))
    }

    fn erroring_app(environment: Environment) -> Router {
        Router::new()
            .route("/fail", get(failing))
            .route("/missing", get(missing))
            .layer(axum::middleware::from_fn_with_state(
                environment,
                expose_error_detail,
            ))
    }

    #[tokio::test]
    async fn test_error_detail_shown_in_development() {
        let server = TestServer::new(erroring_app(Environment::Development)).unwrap();

        let response = server.get("/fail").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "connection pool timed out");
    }

    #[tokio::test]
    async fn test_error_detail_hidden_in_production() {
        let server = TestServer::new(erroring_app(Environment::Production)).unwrap();

        let response = server.get("/fail").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_client_errors_pass_through_unchanged() {
        let server = TestServer::new(erroring_app(Environment::Development)).unwrap();

        let response = server.get("/missing").await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Issue not found");
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404_with_path() {
        let server = TestServer::new(panicking_app(Environment::Development)).unwrap();

        let response = server.delete("/api/nope").await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["path"], "/api/nope");
        assert_eq!(body["method"], "DELETE");
    }

    #[tokio::test]
    async fn test_unknown_route_path_keeps_query_without_host() {
        let server = TestServer::new(panicking_app(Environment::Development)).unwrap();

        let response = server.get("/api/nope?page=2").await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["path"], "/api/nope?page=2");
    }
}
