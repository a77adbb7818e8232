use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Identity resolved from a validated access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Identity provider user id (`sub` claim)
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Database role claim, `authenticated` for signed-in citizens
    pub role: String,
    /// Session id (absent for service tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl AuthenticatedUser {
    /// The `sub` claim as the primary key used in `users.id`
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Token subject is not a valid user id".to_string()))
    }

    pub fn is_service_role(&self) -> bool {
        self.role == "service_role"
    }
}

/// OAuth/sign-up metadata the identity provider copies into the token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl UserMetadata {
    /// Display name, preferring `full_name` over the OAuth `name`
    pub fn display_name(&self) -> Option<String> {
        self.full_name.clone().or_else(|| self.name.clone())
    }

    /// Avatar, preferring `avatar_url` over the OAuth `picture`
    pub fn avatar(&self) -> Option<String> {
        self.avatar_url.clone().or_else(|| self.picture.clone())
    }
}
