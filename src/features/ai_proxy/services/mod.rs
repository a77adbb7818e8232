mod ai_proxy_service;

pub use ai_proxy_service::{AiProxyService, ProxyError, ProxyRequest, ProxyResponse};
