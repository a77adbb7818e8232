use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{UpdateProfileDto, UserProfileResponseDto};
use crate::features::users::models::User;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, full_name, avatar_url, points, created_at, updated_at";

/// Service for managing application profiles
pub struct UserProfileService {
    pool: PgPool,
}

impl UserProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user profile: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Get the caller's profile; `NotFound` while it is not provisioned yet
    pub async fn get_profile(&self, user: &AuthenticatedUser) -> Result<UserProfileResponseDto> {
        self.find(user.user_id()?)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    /// Create the caller's profile from token claims.
    ///
    /// Returns the profile and whether this call created it; an existing row is
    /// returned untouched.
    pub async fn provision_profile(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<(UserProfileResponseDto, bool)> {
        let user_id = user.user_id()?;

        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, full_name, avatar_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to provision user profile: {:?}", e);
            AppError::Database(e)
        })?;

        if let Some(profile) = created {
            tracing::info!("User profile provisioned: id={}", user_id);
            return Ok((profile.into(), true));
        }

        let existing = self
            .find(user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Profile vanished after conflict".to_string()))?;
        Ok((existing.into(), false))
    }

    /// Update name and avatar
    pub async fn update_profile(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateProfileDto,
    ) -> Result<UserProfileResponseDto> {
        let user_id = user.user_id()?;

        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                avatar_url = COALESCE($3, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(dto.full_name.as_deref().map(str::trim))
        .bind(&dto.avatar_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update user profile: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        tracing::info!("User profile updated: id={}", user_id);
        Ok(updated.into())
    }
}
