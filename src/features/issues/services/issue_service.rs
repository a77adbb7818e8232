use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::issues::dtos::{
    CreateIssueDto, IssueQueryParams, IssueResponseDto, UpdateIssueDto,
};
use crate::features::issues::models::{Issue, IssueStatus};
use crate::shared::constants::{
    REASON_VERIFIED_ISSUE, REASON_VERIFIED_ISSUE_DELETED, VERIFIED_ISSUE_POINTS,
};

const ISSUE_COLUMNS: &str = r#"
    id, title, description, category, images, audio_url,
    latitude, longitude, address, user_id, verified, status,
    created_at, updated_at
"#;

/// Service for issue operations
pub struct IssueService {
    pool: PgPool,
}

impl IssueService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List issues matching the optional filters, newest first
    pub async fn list(&self, params: &IssueQueryParams) -> Result<(Vec<IssueResponseDto>, i64)> {
        let pagination = params.pagination();

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM issues
            WHERE ($1::issue_category IS NULL OR category = $1)
              AND ($2::issue_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR user_id = $3)
            "#,
        )
        .bind(params.category)
        .bind(params.status)
        .bind(params.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count issues: {:?}", e);
            AppError::Database(e)
        })?;

        let issues = sqlx::query_as::<_, Issue>(&format!(
            r#"
            SELECT {ISSUE_COLUMNS} FROM issues
            WHERE ($1::issue_category IS NULL OR category = $1)
              AND ($2::issue_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR user_id = $3)
            ORDER BY created_at DESC
            OFFSET $4 LIMIT $5
            "#
        ))
        .bind(params.category)
        .bind(params.status)
        .bind(params.user_id)
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list issues: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((issues.into_iter().map(Into::into).collect(), total))
    }

    /// Get issue by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<IssueResponseDto> {
        self.find(id).await.map(Into::into)
    }

    async fn find(&self, id: Uuid) -> Result<Issue> {
        sqlx::query_as::<_, Issue>(&format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get issue by ID: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Issue '{}' not found", id)))
    }

    /// Persist a new issue owned by the caller.
    ///
    /// The caller's profile row is provisioned if it does not exist yet, and a
    /// verified issue credits [`VERIFIED_ISSUE_POINTS`] in the same transaction.
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateIssueDto,
    ) -> Result<IssueResponseDto> {
        let user_id = user.user_id()?;
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin issue transaction: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, avatar_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to provision profile for issue owner: {:?}", e);
            AppError::Database(e)
        })?;

        let issue = sqlx::query_as::<_, Issue>(&format!(
            r#"
            INSERT INTO issues (
                title, description, category, images, audio_url,
                latitude, longitude, address, user_id, verified, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ISSUE_COLUMNS}
            "#
        ))
        .bind(dto.title.trim())
        .bind(dto.description.trim())
        .bind(dto.category)
        .bind(&dto.images)
        .bind(&dto.audio_url)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(&dto.address)
        .bind(user_id)
        .bind(dto.verified)
        .bind(IssueStatus::Pending)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create issue: {:?}", e);
            AppError::Database(e)
        })?;

        if issue.verified {
            sqlx::query(
                r#"
                INSERT INTO reward_transactions (user_id, points, reason, issue_id)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(user_id)
            .bind(VERIFIED_ISSUE_POINTS)
            .bind(REASON_VERIFIED_ISSUE)
            .bind(issue.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record reward transaction: {:?}", e);
                AppError::Database(e)
            })?;

            sqlx::query("UPDATE users SET points = points + $2, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .bind(VERIFIED_ISSUE_POINTS)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to credit reward points: {:?}", e);
                    AppError::Database(e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit issue transaction: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Issue created: id={}, category={}, verified={}, user={}",
            issue.id,
            issue.category,
            issue.verified,
            user_id
        );

        Ok(issue.into())
    }

    /// Edit an issue the caller owns while it is still pending
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateIssueDto,
    ) -> Result<IssueResponseDto> {
        let user_id = user.user_id()?;
        let existing = self.find(id).await?;
        ensure_editable(&existing, user_id)?;

        if dto.is_empty() {
            return Ok(existing.into());
        }

        let issue = sqlx::query_as::<_, Issue>(&format!(
            r#"
            UPDATE issues SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                address = COALESCE($6, address),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status = 'pending'
            RETURNING {ISSUE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(dto.description.as_deref().map(str::trim))
        .bind(dto.category)
        .bind(&dto.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update issue: {:?}", e);
            AppError::Database(e)
        })?
        // Status moved between the read and the write
        .ok_or_else(|| AppError::Conflict("Only pending issues can be edited".to_string()))?;

        tracing::info!("Issue updated: id={}, user={}", issue.id, user_id);
        Ok(issue.into())
    }

    /// Delete an issue the caller owns, taking back any points it earned
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let user_id = user.user_id()?;
        let existing = self.find(id).await?;
        ensure_owner(&existing, user_id)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let deleted = sqlx::query("DELETE FROM issues WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete issue: {:?}", e);
                AppError::Database(e)
            })?;

        let reversal = if deleted.rows_affected() > 0 {
            reward_reversal(&existing)
        } else {
            None
        };

        if let Some(points) = reversal {
            // issue_id stays NULL: the row it would point at is gone
            sqlx::query(
                r#"
                INSERT INTO reward_transactions (user_id, points, reason, issue_id)
                VALUES ($1, $2, $3, NULL)
                "#,
            )
            .bind(user_id)
            .bind(points)
            .bind(REASON_VERIFIED_ISSUE_DELETED)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record reward reversal: {:?}", e);
                AppError::Database(e)
            })?;

            sqlx::query("UPDATE users SET points = points + $2, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .bind(points)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to debit reward points: {:?}", e);
                    AppError::Database(e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit issue deletion: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Issue deleted: id={}, user={}, points_reversed={}",
            id,
            user_id,
            reversal.unwrap_or(0)
        );
        Ok(())
    }
}

/// Ledger entry that cancels the reward a verified issue earned on creation
fn reward_reversal(issue: &Issue) -> Option<i32> {
    issue.verified.then_some(-VERIFIED_ISSUE_POINTS)
}

fn ensure_owner(issue: &Issue, user_id: Uuid) -> Result<()> {
    if issue.user_id != user_id {
        return Err(AppError::Forbidden(
            "You can only modify your own issues".to_string(),
        ));
    }
    Ok(())
}

fn ensure_editable(issue: &Issue, user_id: Uuid) -> Result<()> {
    ensure_owner(issue, user_id)?;
    if !issue.status.is_editable() {
        return Err(AppError::Conflict(format!(
            "Issue is already {} and can no longer be edited",
            issue.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::issues::models::IssueCategory;
    use chrono::Utc;

    fn issue(owner: Uuid, status: IssueStatus) -> Issue {
        Issue {
            id: Uuid::new_v4(),
            title: "Broken streetlight".to_string(),
            description: String::new(),
            category: IssueCategory::Safety,
            images: vec!["https://cdn.example.com/1.jpg".to_string()],
            audio_url: None,
            latitude: 27.7,
            longitude: 85.3,
            address: None,
            user_id: owner,
            verified: true,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_may_edit_pending_issue() {
        let owner = Uuid::new_v4();
        assert!(ensure_editable(&issue(owner, IssueStatus::Pending), owner).is_ok());
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let owner = Uuid::new_v4();
        let err = ensure_editable(&issue(owner, IssueStatus::Pending), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_picked_up_issue_is_locked() {
        let owner = Uuid::new_v4();
        let err = ensure_editable(&issue(owner, IssueStatus::InProgress), owner).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Deletion only checks ownership
        assert!(ensure_owner(&issue(owner, IssueStatus::Resolved), owner).is_ok());
    }

    #[test]
    fn test_deleting_verified_issue_reverses_its_reward() {
        let owner = Uuid::new_v4();
        let verified = issue(owner, IssueStatus::Pending);
        assert_eq!(reward_reversal(&verified), Some(-VERIFIED_ISSUE_POINTS));

        let unverified = Issue {
            verified: false,
            ..issue(owner, IssueStatus::Pending)
        };
        assert_eq!(reward_reversal(&unverified), None);
    }
}
