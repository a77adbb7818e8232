//! Liveness, readiness and dependency health probes.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health`, `/api/health` | Process is up |
//! | GET | `/health/detailed`, `/api/health/detailed` | Database + AI service probes (200/503) |
//! | GET | `/ready` | Database reachable (200/503) |
//! | GET | `/live` | Process identity and memory |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::{AiServiceProbe, DatabaseProbe, DependencyProbe, HealthService};
