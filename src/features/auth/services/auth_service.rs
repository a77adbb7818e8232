use crate::core::error::Result;
use crate::features::auth::clients::{GoTrueClient, SignupOutcome};
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, MeResponseDto, RefreshTokenRequestDto, RegisterRequestDto,
    SessionDto,
};
use crate::features::auth::model::AuthenticatedUser;
use std::sync::Arc;

/// Service for authentication operations (register, login, refresh)
pub struct AuthService {
    gotrue_client: Arc<GoTrueClient>,
}

impl AuthService {
    pub fn new(gotrue_client: Arc<GoTrueClient>) -> Self {
        Self { gotrue_client }
    }

    /// Register a new user
    ///
    /// The application profile row is provisioned by the platform after sign-up,
    /// so it may lag behind the returned session.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let outcome = self
            .gotrue_client
            .sign_up(&dto.email, &dto.password, dto.full_name.as_deref())
            .await?;

        Ok(match outcome {
            SignupOutcome::Session(session) => session.into(),
            SignupOutcome::PendingConfirmation(user) => {
                tracing::info!("Account {} awaits email confirmation", user.id);
                AuthResponseDto {
                    session: None,
                    user: user.into(),
                    email_confirmation_required: true,
                }
            }
        })
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let session = self
            .gotrue_client
            .sign_in_with_password(&dto.email, &dto.password)
            .await?;

        tracing::info!("User {} signed in", session.user.id);
        Ok(session.into())
    }

    /// Get current user info (for /me endpoint)
    pub fn get_current_user(&self, user: AuthenticatedUser) -> MeResponseDto {
        user.into()
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(&self, dto: RefreshTokenRequestDto) -> Result<SessionDto> {
        let session = self
            .gotrue_client
            .refresh_session(&dto.refresh_token)
            .await?;

        Ok(SessionDto {
            access_token: session.access_token,
            token_type: session.token_type,
            expires_in: session.expires_in,
            refresh_token: session.refresh_token,
        })
    }
}
