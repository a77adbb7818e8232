use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::clients::{GoTrueSession, GoTrueUser};
use crate::features::auth::model::AuthenticatedUser;

/// Request DTO for user registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: Option<String>,
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request DTO for token refresh
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequestDto {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Issued tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub access_token: String,
    /// Token type (always "bearer")
    pub token_type: String,
    /// Token expiry time in seconds
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Response DTO for register/login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    /// Absent when the account still has to confirm its email
    pub session: Option<SessionDto>,
    pub user: AuthUserDto,
    pub email_confirmation_required: bool,
}

/// User info included in auth responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub id: String,
    pub email: Option<String>,
    pub role: String,
    pub session_id: Option<String>,
}

impl From<GoTrueUser> for AuthUserDto {
    fn from(user: GoTrueUser) -> Self {
        Self {
            email_verified: user.email_confirmed_at.is_some(),
            full_name: user.user_metadata.display_name(),
            avatar_url: user.user_metadata.avatar(),
            id: user.id,
            email: user.email,
        }
    }
}

impl From<GoTrueSession> for AuthResponseDto {
    fn from(session: GoTrueSession) -> Self {
        Self {
            session: Some(SessionDto {
                access_token: session.access_token,
                token_type: session.token_type,
                expires_in: session.expires_in,
                refresh_token: session.refresh_token,
            }),
            user: session.user.into(),
            email_confirmation_required: false,
        }
    }
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.sub,
            email: user.email,
            role: user.role,
            session_id: user.session_id,
        }
    }
}
