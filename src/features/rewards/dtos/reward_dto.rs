use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::rewards::models::{LeaderboardRow, RewardTransaction};
use crate::shared::constants::{DEFAULT_LEADERBOARD_SIZE, MAX_LEADERBOARD_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RewardTransactionDto {
    pub id: Uuid,
    pub points: i32,
    pub reason: String,
    pub issue_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<RewardTransaction> for RewardTransactionDto {
    fn from(t: RewardTransaction) -> Self {
        Self {
            id: t.id,
            points: t.points,
            reason: t.reason,
            issue_id: t.issue_id,
            created_at: t.created_at,
        }
    }
}

/// Balance plus the most recent ledger entries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RewardSummaryDto {
    pub points: i32,
    pub transactions: Vec<RewardTransactionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntryDto {
    /// 1-based position
    pub rank: usize,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i32,
}

impl LeaderboardEntryDto {
    /// Rows must already be ordered by points descending
    pub fn ranked(rows: Vec<LeaderboardRow>) -> Vec<Self> {
        rows.into_iter()
            .enumerate()
            .map(|(i, row)| Self {
                rank: i + 1,
                user_id: row.id,
                full_name: row.full_name,
                avatar_url: row.avatar_url,
                points: row.points,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Number of entries (default: 10, max: 50)
    #[param(minimum = 1, maximum = 50)]
    pub limit: Option<i64>,
}

impl LeaderboardQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
            .clamp(1, MAX_LEADERBOARD_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_limit_is_clamped() {
        assert_eq!(LeaderboardQuery { limit: None }.limit(), DEFAULT_LEADERBOARD_SIZE);
        assert_eq!(LeaderboardQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(LeaderboardQuery { limit: Some(500) }.limit(), MAX_LEADERBOARD_SIZE);
    }

    #[test]
    fn test_ranked_is_one_based() {
        let rows = vec![
            LeaderboardRow {
                id: Uuid::new_v4(),
                full_name: Some("Asha".to_string()),
                avatar_url: None,
                points: 40,
            },
            LeaderboardRow {
                id: Uuid::new_v4(),
                full_name: None,
                avatar_url: None,
                points: 10,
            },
        ];

        let ranked = LeaderboardEntryDto::ranked(rows);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].points, 40);
        assert_eq!(ranked[1].rank, 2);
    }
}
