use crate::features::ai_proxy::services::{AiProxyService, ProxyRequest};
use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/ai/{path}",
    params(
        ("path" = String, Path, description = "Path forwarded to the AI service, e.g. `verify`")
    ),
    request_body(
        content = String,
        content_type = "application/octet-stream",
        description = "Raw body forwarded unchanged, typically multipart/form-data with a `photo` part"
    ),
    responses(
        (status = 200, description = "Upstream response passed through"),
        (status = 401, description = "Missing or invalid x-api-key"),
        (status = 500, description = "AI service not configured or unreachable")
    ),
    tag = "ai"
)]
pub async fn proxy(
    State(service): State<Arc<AiProxyService>>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = ProxyRequest {
        method,
        path,
        query,
        content_type: headers.get(header::CONTENT_TYPE).cloned(),
        body,
    };

    match service.forward(request).await {
        Ok(upstream) => upstream.into_response(),
        Err(err) => err.into_response(),
    }
}
