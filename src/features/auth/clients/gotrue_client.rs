use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::UserMetadata;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// User object returned by GoTrue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoTrueUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Session returned by sign-in, sign-up (when auto-confirmed) and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoTrueSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: GoTrueUser,
}

/// Sign-up yields a session when email confirmation is off, a bare user otherwise
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignupOutcome {
    Session(GoTrueSession),
    PendingConfirmation(GoTrueUser),
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignupMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct SignupMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshGrantRequest<'a> {
    refresh_token: &'a str,
}

/// GoTrue error body; field names vary between API versions
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorResponse {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

impl GoTrueErrorResponse {
    fn text(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error_description.clone())
            .unwrap_or_else(|| "Identity provider request failed".to_string())
    }
}

/// Client for the identity provider's GoTrue REST API
pub struct GoTrueClient {
    base_url: String,
    anon_key: String,
    http_client: reqwest::Client,
}

impl GoTrueClient {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            base_url: config.issuer(),
            anon_key: config.anon_key.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Create an account; Conflict when the email is taken
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignupOutcome> {
        let url = format!("{}/signup", self.base_url);
        let body = SignupRequest {
            email,
            password,
            data: SignupMetadata { full_name },
        };

        tracing::debug!("Creating account in identity provider: {}", email);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Sign-up request failed: {}", e);
                AppError::ExternalServiceError(format!("Failed to create account: {}", e))
            })?;

        let status = response.status();
        if status.is_success() {
            let outcome = response.json::<SignupOutcome>().await.map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to parse sign-up response: {}", e))
            })?;
            tracing::info!("Account created for {}", email);
            return Ok(outcome);
        }

        let error = read_error(response).await;
        let text = error.text();
        if error.error_code.as_deref() == Some("user_already_exists")
            || text.to_lowercase().contains("already registered")
        {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        Err(map_status(status, text))
    }

    /// Email/password sign-in
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<GoTrueSession> {
        let url = format!("{}/token?grant_type=password", self.base_url);
        self.token_grant(&url, &PasswordGrantRequest { email, password })
            .await
    }

    /// Exchange a refresh token for a new session
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<GoTrueSession> {
        let url = format!("{}/token?grant_type=refresh_token", self.base_url);
        self.token_grant(&url, &RefreshGrantRequest { refresh_token })
            .await
    }

    async fn token_grant<B: Serialize>(&self, url: &str, body: &B) -> Result<GoTrueSession> {
        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Token request failed: {}", e);
                AppError::ExternalServiceError(format!("Token request failed: {}", e))
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<GoTrueSession>().await.map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to parse token response: {}", e))
            });
        }

        let error = read_error(response).await;
        // GoTrue answers bad credentials and stale refresh tokens with 400 invalid_grant
        if status == StatusCode::BAD_REQUEST {
            return Err(AppError::Unauthorized(
                "Invalid credentials or expired refresh token".to_string(),
            ));
        }

        Err(map_status(status, error.text()))
    }
}

async fn read_error(response: reqwest::Response) -> GoTrueErrorResponse {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str(&body).unwrap_or_default()
}

fn map_status(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimitExceeded(message),
        _ => {
            tracing::error!("Identity provider returned {}: {}", status, message);
            AppError::ExternalServiceError(format!("Identity provider error: HTTP {}", status))
        }
    }
}
