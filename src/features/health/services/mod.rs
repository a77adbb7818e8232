mod health_service;
mod probes;

pub use health_service::{DependencyCheck, HealthService};
pub use probes::{AiServiceProbe, DatabaseProbe, DependencyProbe};
