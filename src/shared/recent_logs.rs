//! In-memory buffer of the most recent log events.
//!
//! [`RecentLogsLayer`] plugs into the `tracing_subscriber` registry next to the
//! fmt layer, so everything logged through `tracing` is also kept here for
//! diagnostics export.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::client::error::ClientError;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

/// Bounded, shareable log history; the oldest entry is evicted first
#[derive(Debug, Clone)]
pub struct RecentLogs {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl Default for RecentLogs {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl RecentLogs {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A panic while holding the lock leaves the deque consistent, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, entry: LogEntry) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Up to `count` entries, newest first
    pub fn recent(&self, count: usize) -> Vec<LogEntry> {
        self.lock().iter().rev().take(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// All entries, oldest first, as a pretty-printed JSON array
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        let entries: Vec<LogEntry> = self.lock().iter().cloned().collect();
        serde_json::to_string_pretty(&entries)
    }

    pub fn layer(&self) -> RecentLogsLayer {
        RecentLogsLayer { logs: self.clone() }
    }
}

/// `tracing_subscriber` layer feeding a [`RecentLogs`] buffer
#[derive(Debug, Clone)]
pub struct RecentLogsLayer {
    logs: RecentLogs,
}

impl<S: Subscriber> Layer<S> for RecentLogsLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        self.logs.push(LogEntry {
            timestamp: Utc::now(),
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message: visitor.message,
            user_id: visitor.user_id,
            action: visitor.action,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct EntryVisitor {
    message: String,
    user_id: Option<String>,
    action: Option<String>,
    fields: BTreeMap<String, String>,
}

impl EntryVisitor {
    fn store(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            "user_id" => self.user_id = Some(value),
            "action" => self.action = Some(value),
            name => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for EntryVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.store(field, format!("{:?}", value));
    }
}

/// Run `operation`, logging its start and its outcome
///
/// Failures that are not already a [`ClientError`] are reported as
/// [`ClientError::Operation`].
pub async fn log_operation<T, E, F>(
    name: &str,
    user_id: Option<&str>,
    operation: F,
) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    tracing::info!(user_id, action = name, "Starting operation: {}", name);

    match operation.await {
        Ok(value) => {
            tracing::info!(user_id, action = name, "Completed operation: {}", name);
            Ok(value)
        }
        Err(e) => {
            let boxed: Box<dyn std::error::Error + Send + Sync> = e.into();
            let error = match boxed.downcast::<ClientError>() {
                Ok(client_error) => *client_error,
                Err(other) => {
                    tracing::debug!(action = name, "Operation failed with: {}", other);
                    ClientError::Operation(name.to_string())
                }
            };
            tracing::error!(user_id, action = name, "{}: {}", error.code(), error);
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: "INFO".to_string(),
            target: "test".to_string(),
            message: message.to_string(),
            user_id: None,
            action: None,
            fields: BTreeMap::new(),
        }
    }

    fn messages(entries: &[LogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_keeps_only_newest_entries() {
        let logs = RecentLogs::with_capacity(3);
        for i in 0..5 {
            logs.push(entry(&format!("event {}", i)));
        }

        assert_eq!(logs.len(), 3);
        assert_eq!(
            messages(&logs.recent(10)),
            vec!["event 4", "event 3", "event 2"]
        );
        assert_eq!(messages(&logs.recent(1)), vec!["event 4"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let logs = RecentLogs::with_capacity(0);
        logs.push(entry("dropped"));
        assert!(logs.is_empty());
    }

    #[test]
    fn test_clear_and_export() {
        let logs = RecentLogs::default();
        logs.push(entry("first"));
        logs.push(entry("second"));

        let exported: serde_json::Value =
            serde_json::from_str(&logs.export_json().unwrap()).unwrap();
        assert_eq!(exported[0]["message"], "first");
        assert_eq!(exported[1]["message"], "second");
        assert!(exported[0].get("user_id").is_none());

        logs.clear();
        assert!(logs.is_empty());
        assert_eq!(logs.export_json().unwrap(), "[]");
    }

    #[test]
    fn test_layer_captures_structured_fields() {
        let logs = RecentLogs::default();
        let subscriber = tracing_subscriber::registry().with(logs.layer());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user_id = "u-1", action = "submit_report", "User action: submit_report");
            tracing::warn!(attempt = 3, "Retrying");
        });

        let recent = logs.recent(2);
        assert_eq!(recent[0].level, "WARN");
        assert_eq!(recent[0].message, "Retrying");
        assert_eq!(recent[0].fields.get("attempt").map(String::as_str), Some("3"));

        assert_eq!(recent[1].message, "User action: submit_report");
        assert_eq!(recent[1].user_id.as_deref(), Some("u-1"));
        assert_eq!(recent[1].action.as_deref(), Some("submit_report"));
    }

    #[tokio::test]
    async fn test_log_operation_success() {
        let logs = RecentLogs::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(logs.layer()));

        let value = log_operation("load_profile", Some("u-1"), async {
            Ok::<_, ClientError>(42)
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
        assert_eq!(
            messages(&logs.recent(2)),
            vec!["Completed operation: load_profile", "Starting operation: load_profile"]
        );
        assert_eq!(logs.recent(1)[0].user_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_log_operation_keeps_client_errors() {
        let logs = RecentLogs::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(logs.layer()));

        let err = log_operation("load_issue", None, async {
            Err::<(), _>(ClientError::NotFound("Resource not found".to_string()))
        })
        .await
        .unwrap_err();

        assert_eq!(err, ClientError::NotFound("Resource not found".to_string()));
        let last = &logs.recent(1)[0];
        assert_eq!(last.level, "ERROR");
        assert_eq!(last.message, "NOT_FOUND_ERROR: Resource not found");
    }

    #[tokio::test]
    async fn test_log_operation_wraps_foreign_errors() {
        let err = log_operation("read_cache", None, async {
            Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "disk"))
        })
        .await
        .unwrap_err();

        assert_eq!(err.code(), "OPERATION_ERROR");
        assert_eq!(err.to_string(), "Operation failed: read_cache");
    }
}
