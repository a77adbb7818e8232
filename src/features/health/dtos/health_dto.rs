use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Outcome of a single dependency probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

impl ProbeStatus {
    /// Connection wording used in the `dependencies` map
    pub fn connection(&self) -> &'static str {
        match self {
            ProbeStatus::Healthy => "connected",
            ProbeStatus::Unhealthy => "disconnected",
        }
    }
}

/// Aggregated state of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BasicHealthDto {
    pub status: ServiceStatus,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the process started
    pub uptime: f64,
    pub version: String,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetailedHealthDto {
    pub service: ServiceStatus,
    pub database: ProbeStatus,
    pub ai_service: ProbeStatus,
    /// `connected` / `disconnected` per dependency
    pub dependencies: BTreeMap<String, String>,
    /// Names of every failing dependency
    pub failing: Vec<String>,
    /// Captured error message per failing dependency
    pub errors: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub uptime: f64,
    pub version: String,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessDto {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemoryUsageDto {
    /// Resident set size in bytes
    pub rss: u64,
    /// Virtual memory size in bytes
    #[serde(rename = "virtual")]
    pub virtual_memory: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LivenessDto {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub pid: u32,
    pub memory: Option<MemoryUsageDto>,
}
