use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "issue_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    #[default]
    Infrastructure,
    Safety,
    Environment,
    Transport,
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueCategory::Infrastructure => write!(f, "infrastructure"),
            IssueCategory::Safety => write!(f, "safety"),
            IssueCategory::Environment => write!(f, "environment"),
            IssueCategory::Transport => write!(f, "transport"),
        }
    }
}

/// Lifecycle of an issue, moved forward by municipal staff
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "issue_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl IssueStatus {
    /// Citizens may only edit their report before anyone picked it up
    pub fn is_editable(&self) -> bool {
        matches!(self, IssueStatus::Pending)
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueStatus::Pending => write!(f, "pending"),
            IssueStatus::InProgress => write!(f, "in_progress"),
            IssueStatus::Resolved => write!(f, "resolved"),
            IssueStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Database model for issue
#[derive(Debug, Clone, FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub images: Vec<String>,
    pub audio_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub user_id: Uuid,
    pub verified: bool,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
