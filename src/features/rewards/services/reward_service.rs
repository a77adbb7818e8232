use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::rewards::dtos::{LeaderboardEntryDto, RewardSummaryDto};
use crate::features::rewards::models::{LeaderboardRow, RewardTransaction};

/// Number of ledger entries returned with the balance
const RECENT_TRANSACTIONS: i64 = 20;

pub struct RewardService {
    pool: PgPool,
}

impl RewardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Balance and recent transactions; zero for a caller without a profile yet
    pub async fn summary(&self, user_id: Uuid) -> Result<RewardSummaryDto> {
        let points: Option<i32> = sqlx::query_scalar("SELECT points FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get reward balance: {:?}", e);
                AppError::Database(e)
            })?;

        let transactions = sqlx::query_as::<_, RewardTransaction>(
            r#"
            SELECT id, user_id, points, reason, issue_id, created_at
            FROM reward_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(RECENT_TRANSACTIONS)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reward transactions: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(RewardSummaryDto {
            points: points.unwrap_or(0),
            transactions: transactions.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntryDto>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT id, full_name, avatar_url, points
            FROM users
            WHERE points > 0
            ORDER BY points DESC, created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load leaderboard: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(LeaderboardEntryDto::ranked(rows))
    }
}
