//! Capabilities the host platform provides to the client core.
//!
//! A UI shell implements these over the device GPS, camera/gallery and the
//! identity provider SDK; tests implement them with in-memory doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::client::error::ClientError;
use crate::features::users::dtos::UserProfileResponseDto;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A captured or selected image, ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Device URI, stored on the issue as its image reference
    pub uri: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    pub fn jpeg(uri: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            uri: uri.into(),
            file_name: "photo.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOrigin {
    Camera,
    Library,
}

/// Access and refresh tokens issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub email: Option<String>,
}

/// Auth-state transitions pushed by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Coordinates, ClientError>;

    /// `Ok(None)` when no address is known for the point
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Option<String>, ClientError>;
}

#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// `Ok(None)` when the user cancelled; `ClientError::Permission` when access was denied
    async fn acquire(&self, origin: PhotoOrigin) -> Result<Option<Photo>, ClientError>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Session carried by a redirect callback or persisted storage
    async fn restore_session(&self) -> Result<Option<Session>, ClientError>;

    async fn current_session(&self) -> Result<Option<Session>, ClientError>;

    /// Application profile of the session's user; `Ok(None)` while not provisioned
    async fn current_profile(
        &self,
        session: &Session,
    ) -> Result<Option<UserProfileResponseDto>, ClientError>;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
