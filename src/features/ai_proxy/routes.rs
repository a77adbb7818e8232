use crate::features::ai_proxy::guard::require_client_key;
use crate::features::ai_proxy::handlers::proxy_handler;
use crate::features::ai_proxy::services::AiProxyService;
use axum::{middleware::from_fn_with_state, routing::any, Router};
use std::sync::Arc;

pub fn routes(service: Arc<AiProxyService>, client_api_key: Option<String>) -> Router {
    Router::new()
        .route("/api/ai/{*path}", any(proxy_handler::proxy))
        .route_layer(from_fn_with_state(
            Arc::new(client_api_key),
            require_client_key,
        ))
        .with_state(service)
}
