//! Pass-through proxy to the external AI verification service.
//!
//! The backend injects the internal service credential so the mobile client
//! never holds it.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | ANY | `/api/ai/{*path}` | Forwarded to `{AI_SERVICE_URL}/{path}` |

mod guard;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::{AiProxyService, ProxyError, ProxyRequest, ProxyResponse};
