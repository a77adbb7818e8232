use crate::core::config::Environment;
use crate::features::health::dtos::{
    BasicHealthDto, DetailedHealthDto, LivenessDto, MemoryUsageDto, ProbeStatus, ReadinessDto,
    ServiceStatus,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use super::probes::DependencyProbe;

/// Result of probing one dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCheck {
    pub name: &'static str,
    pub outcome: Result<(), String>,
}

impl DependencyCheck {
    pub fn status(&self) -> ProbeStatus {
        if self.outcome.is_ok() {
            ProbeStatus::Healthy
        } else {
            ProbeStatus::Unhealthy
        }
    }
}

pub struct HealthService {
    started_at: Instant,
    version: String,
    environment: Environment,
    database: Arc<dyn DependencyProbe>,
    ai_service: Arc<dyn DependencyProbe>,
}

impl HealthService {
    pub fn new(
        version: String,
        environment: Environment,
        database: Arc<dyn DependencyProbe>,
        ai_service: Arc<dyn DependencyProbe>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            version,
            environment,
            database,
            ai_service,
        }
    }

    fn uptime(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    pub fn basic(&self) -> BasicHealthDto {
        BasicHealthDto {
            status: ServiceStatus::Healthy,
            timestamp: Utc::now(),
            uptime: self.uptime(),
            version: self.version.clone(),
            environment: self.environment.to_string(),
        }
    }

    /// Probe every dependency concurrently and fold the outcomes
    pub async fn detailed(&self) -> DetailedHealthDto {
        let (database, ai_service) = tokio::join!(
            Self::probe(self.database.as_ref()),
            Self::probe(self.ai_service.as_ref())
        );

        let mut dependencies = BTreeMap::new();
        let mut failing = Vec::new();
        let mut errors = BTreeMap::new();
        for check in [&database, &ai_service] {
            dependencies.insert(
                check.name.to_string(),
                check.status().connection().to_string(),
            );
            if let Err(message) = &check.outcome {
                tracing::warn!("Health probe '{}' failed: {}", check.name, message);
                failing.push(check.name.to_string());
                errors.insert(check.name.to_string(), message.clone());
            }
        }

        DetailedHealthDto {
            service: aggregate(&[database.clone(), ai_service.clone()]),
            database: database.status(),
            ai_service: ai_service.status(),
            dependencies,
            failing,
            errors,
            timestamp: Utc::now(),
            uptime: self.uptime(),
            version: self.version.clone(),
            environment: self.environment.to_string(),
        }
    }

    /// Database reachability only
    pub async fn readiness(&self) -> Result<ReadinessDto, ReadinessDto> {
        let check = Self::probe(self.database.as_ref()).await;
        match check.outcome {
            Ok(()) => Ok(ReadinessDto {
                status: "ready".to_string(),
                error: None,
                timestamp: Utc::now(),
            }),
            Err(message) => {
                tracing::warn!("Readiness check failed: {}", message);
                Err(ReadinessDto {
                    status: "not ready".to_string(),
                    error: Some(message),
                    timestamp: Utc::now(),
                })
            }
        }
    }

    pub fn liveness(&self) -> LivenessDto {
        LivenessDto {
            status: "alive".to_string(),
            timestamp: Utc::now(),
            pid: std::process::id(),
            memory: current_memory(),
        }
    }

    async fn probe(probe: &dyn DependencyProbe) -> DependencyCheck {
        DependencyCheck {
            name: probe.name(),
            outcome: probe.check().await,
        }
    }
}

/// `healthy` when nothing fails, `unhealthy` when everything fails, `degraded` otherwise
pub fn aggregate(checks: &[DependencyCheck]) -> ServiceStatus {
    let failing = checks.iter().filter(|c| c.outcome.is_err()).count();
    match failing {
        0 => ServiceStatus::Healthy,
        n if n == checks.len() => ServiceStatus::Unhealthy,
        _ => ServiceStatus::Degraded,
    }
}

fn current_memory() -> Option<MemoryUsageDto> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );

    system.process(pid).map(|process| MemoryUsageDto {
        rss: process.memory(),
        virtual_memory: process.virtual_memory(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &'static str, ok: bool) -> DependencyCheck {
        DependencyCheck {
            name,
            outcome: if ok { Ok(()) } else { Err("down".to_string()) },
        }
    }

    #[test]
    fn test_aggregate_status() {
        assert_eq!(
            aggregate(&[check("database", true), check("ai_service", true)]),
            ServiceStatus::Healthy
        );
        assert_eq!(
            aggregate(&[check("database", false), check("ai_service", true)]),
            ServiceStatus::Degraded
        );
        assert_eq!(
            aggregate(&[check("database", true), check("ai_service", false)]),
            ServiceStatus::Degraded
        );
        assert_eq!(
            aggregate(&[check("database", false), check("ai_service", false)]),
            ServiceStatus::Unhealthy
        );
    }

    #[test]
    fn test_current_memory_reports_resident_size() {
        let memory = current_memory().expect("current process should be visible");
        assert!(memory.rss > 0);
    }
}
