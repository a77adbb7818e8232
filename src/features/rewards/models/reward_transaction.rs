use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Ledger entry; `users.points` is the running sum of these
#[derive(Debug, Clone, FromRow)]
pub struct RewardTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub points: i32,
    pub reason: String,
    pub issue_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i32,
}
