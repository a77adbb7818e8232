use super::model::{AuthenticatedUser, UserMetadata};
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Validates access tokens minted by the managed identity service (HS256, shared secret)
pub struct JwtValidator {
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // Standard JWT claims (validated by jsonwebtoken library)
    sub: String,
    #[serde(rename = "iss", default)]
    _iss: Option<String>,
    #[serde(rename = "exp")]
    _exp: u64,

    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer(),
            audience: config.audience.clone(),
            leeway: config.jwt_leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        let role = claims.role.unwrap_or_else(|| "authenticated".to_string());
        if role == "anon" {
            return Err(AppError::Auth(
                "Anonymous tokens cannot access this resource".to_string(),
            ));
        }

        Ok(AuthenticatedUser {
            full_name: claims.user_metadata.display_name(),
            avatar_url: claims.user_metadata.avatar(),
            sub: claims.sub,
            email: claims.email,
            role,
            session_id: claims.session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{issue_test_token, test_auth_config, TEST_USER_ID};

    #[test]
    fn test_valid_token_yields_user() {
        let config = test_auth_config();
        let validator = JwtValidator::new(&config);
        let token = issue_test_token(&config, TEST_USER_ID, "authenticated", 3600);

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.sub, TEST_USER_ID);
        assert_eq!(user.role, "authenticated");
        assert_eq!(user.email.as_deref(), Some("citizen@example.com"));
        assert_eq!(user.full_name.as_deref(), Some("Test Citizen"));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_auth_config();
        let validator = JwtValidator::new(&config);
        let token = issue_test_token(&config, TEST_USER_ID, "authenticated", -3600);

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = test_auth_config();
        let mut other = test_auth_config();
        other.jwt_secret = "a-completely-different-secret-value".to_string();
        let token = issue_test_token(&other, TEST_USER_ID, "authenticated", 3600);

        assert!(JwtValidator::new(&config).validate_token(&token).is_err());
    }

    #[test]
    fn test_anon_token_rejected() {
        let config = test_auth_config();
        let token = issue_test_token(&config, TEST_USER_ID, "anon", 3600);

        assert!(JwtValidator::new(&config).validate_token(&token).is_err());
    }
}
