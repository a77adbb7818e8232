//! Issue report workflow.
//!
//! [`ReportForm`] holds what the citizen has entered so far and enforces the
//! order photo → verification → submission. Every failure maps to an [`Alert`]
//! the UI shell shows verbatim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::error::ClientError;
use crate::client::platform::{
    Coordinates, IdentityProvider, LocationProvider, Photo, PhotoOrigin, PhotoSource, Session,
};
use crate::features::issues::dtos::{CreateIssueDto, IssueResponseDto};
use crate::features::issues::models::IssueCategory;

/// Answer of the AI verification service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<serde_json::Value>,
}

#[async_trait]
pub trait PhotoVerifier: Send + Sync {
    async fn verify(&self, photo: &Photo) -> Result<VerificationResult, ClientError>;
}

#[async_trait]
pub trait IssueSink: Send + Sync {
    async fn submit_issue(
        &self,
        access_token: &str,
        issue: &CreateIssueDto,
    ) -> Result<IssueResponseDto, ClientError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerificationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Fail,
}

/// Title and message of a user-facing dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    fn new(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
        }
    }

    /// Shown after a successful submission
    pub fn issue_reported() -> Self {
        Self::new("Success", "Issue reported successfully!")
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("Unable to get current location. Please enable location services.")]
    LocationUnavailable(#[source] ClientError),

    #[error("Please add a photo first")]
    NoPhoto,

    #[error("{}", permission_message(.0))]
    PhotoPermissionDenied(PhotoOrigin),

    #[error("{}", capture_message(.0))]
    PhotoCaptureFailed(PhotoOrigin, #[source] ClientError),

    #[error("Could not verify image. Try again.")]
    VerificationFailed,

    /// The photo changed while its verification was in flight
    #[error("Verification result no longer matches the selected photo")]
    StaleVerification,

    #[error("Please provide all required fields (photo, title, category)")]
    MissingFields,

    #[error("You must be logged in to report issues")]
    NotLoggedIn,

    #[error("Please verify the photo before submitting.")]
    NotVerified,

    #[error("Location is required to submit a report")]
    LocationRequired,

    #[error("Failed to submit report")]
    SubmitFailed(#[source] ClientError),
}

fn permission_message(origin: &PhotoOrigin) -> &'static str {
    match origin {
        PhotoOrigin::Camera => "Please grant camera permissions to take photos.",
        PhotoOrigin::Library => "Please grant camera roll permissions to upload photos.",
    }
}

fn capture_message(origin: &PhotoOrigin) -> &'static str {
    match origin {
        PhotoOrigin::Camera => "Failed to take photo",
        PhotoOrigin::Library => "Failed to pick image",
    }
}

impl ReportError {
    /// Dialog for this failure; `None` for failures the user need not see
    pub fn alert(&self) -> Option<Alert> {
        let title = match self {
            ReportError::StaleVerification => return None,
            ReportError::LocationUnavailable(_) => "Location Error",
            ReportError::NoPhoto => "No photo",
            ReportError::PhotoPermissionDenied(_) => "Permission needed",
            ReportError::VerificationFailed => "Verification error",
            _ => "Error",
        };
        Some(Alert::new(title, self.to_string()))
    }
}

/// Proof that a verification was started for one specific photo
#[derive(Debug, Clone)]
pub struct VerificationTicket {
    generation: u64,
    photo: Photo,
}

impl VerificationTicket {
    pub fn photo(&self) -> &Photo {
        &self.photo
    }
}

#[derive(Debug, Clone)]
pub struct ReportForm {
    pub title: String,
    pub description: String,
    pub category: Option<IssueCategory>,
    photo: Option<Photo>,
    /// Bumped on every photo change; stale verification tickets are rejected by it
    photo_generation: u64,
    verification: VerificationStatus,
    confidence: Option<f64>,
    label: Option<String>,
    suggested_title: Option<String>,
    location: Option<Coordinates>,
    address: Option<String>,
    user: Option<Session>,
}

impl Default for ReportForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: Some(IssueCategory::default()),
            photo: None,
            photo_generation: 0,
            verification: VerificationStatus::Idle,
            confidence: None,
            label: None,
            suggested_title: None,
            location: None,
            address: None,
            user: None,
        }
    }
}

impl ReportForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    pub fn verification_status(&self) -> VerificationStatus {
        self.verification
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn suggested_title(&self) -> Option<&str> {
        self.suggested_title.as_deref()
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn user(&self) -> Option<&Session> {
        self.user.as_ref()
    }

    fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|s| s.user_id.as_str())
    }

    /// Load the signed-in user and the device location
    pub async fn prepare<I, L>(&mut self, identity: &I, location: &L) -> Result<(), ReportError>
    where
        I: IdentityProvider + ?Sized,
        L: LocationProvider + ?Sized,
    {
        self.user = match identity.current_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Could not load current user: {}", e);
                None
            }
        };

        self.refresh_location(location).await
    }

    /// Fetch the location again and reverse-geocode it
    pub async fn refresh_location<L>(&mut self, location: &L) -> Result<(), ReportError>
    where
        L: LocationProvider + ?Sized,
    {
        let coordinates = location.current_location().await.map_err(|e| {
            tracing::warn!("Location lookup failed: {}", e);
            ReportError::LocationUnavailable(e)
        })?;
        self.location = Some(coordinates);

        match location.reverse_geocode(coordinates).await {
            Ok(Some(address)) => self.address = Some(address),
            Ok(None) => {}
            Err(e) => tracing::warn!("Reverse geocoding failed: {}", e),
        }

        Ok(())
    }

    /// Take or pick a photo; `Ok(false)` when the user cancelled
    pub async fn capture_photo<P>(
        &mut self,
        source: &P,
        origin: PhotoOrigin,
    ) -> Result<bool, ReportError>
    where
        P: PhotoSource + ?Sized,
    {
        match source.acquire(origin).await {
            Ok(Some(photo)) => {
                self.set_photo(photo);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(ClientError::Permission(_)) => Err(ReportError::PhotoPermissionDenied(origin)),
            Err(e) => {
                tracing::warn!("Photo capture failed: {}", e);
                Err(ReportError::PhotoCaptureFailed(origin, e))
            }
        }
    }

    pub fn set_photo(&mut self, photo: Photo) {
        tracing::info!(user_id = self.user_id(), action = "set_photo", "User action: set_photo");
        self.photo = Some(photo);
        self.invalidate_verification();
    }

    pub fn clear_photo(&mut self) {
        tracing::info!(user_id = self.user_id(), action = "clear_photo", "User action: clear_photo");
        self.photo = None;
        self.invalidate_verification();
    }

    fn invalidate_verification(&mut self) {
        self.photo_generation += 1;
        self.verification = VerificationStatus::Idle;
        self.confidence = None;
        self.label = None;
        self.suggested_title = None;
    }

    /// Mark verification as pending for the current photo
    pub fn begin_verification(&mut self) -> Result<VerificationTicket, ReportError> {
        let photo = self.photo.clone().ok_or(ReportError::NoPhoto)?;
        tracing::info!(user_id = self.user_id(), action = "verify_photo", "User action: verify_photo");

        self.verification = VerificationStatus::Pending;
        Ok(VerificationTicket {
            generation: self.photo_generation,
            photo,
        })
    }

    /// Apply a verification outcome, discarding it if the photo changed meanwhile
    pub fn complete_verification(
        &mut self,
        ticket: VerificationTicket,
        outcome: Result<VerificationResult, ClientError>,
    ) -> Result<VerificationStatus, ReportError> {
        if ticket.generation != self.photo_generation {
            tracing::debug!("Discarding verification result for a replaced photo");
            return Err(ReportError::StaleVerification);
        }

        match outcome {
            Ok(result) => {
                self.confidence = result.confidence;
                self.label = result.label.clone();

                if result.verified {
                    self.verification = VerificationStatus::Success;
                    self.suggested_title = result.label.filter(|label| !label.trim().is_empty());
                    tracing::info!(
                        confidence = ?self.confidence,
                        label = ?self.label,
                        "Photo verified"
                    );
                    Ok(VerificationStatus::Success)
                } else {
                    self.verification = VerificationStatus::Fail;
                    tracing::info!(confidence = ?self.confidence, "Photo rejected by verification");
                    Err(ReportError::VerificationFailed)
                }
            }
            Err(e) => {
                tracing::error!("Verify error: {} {}", e.code(), e);
                self.verification = VerificationStatus::Fail;
                Err(ReportError::VerificationFailed)
            }
        }
    }

    /// Upload the current photo for verification
    pub async fn verify_photo<V>(&mut self, verifier: &V) -> Result<VerificationStatus, ReportError>
    where
        V: PhotoVerifier + ?Sized,
    {
        let ticket = self.begin_verification()?;
        let outcome = verifier.verify(ticket.photo()).await;
        self.complete_verification(ticket, outcome)
    }

    /// Replace the title with the verification label
    pub fn accept_suggested_title(&mut self) -> bool {
        match self.suggested_title.take() {
            Some(suggestion) => {
                self.title = suggestion;
                true
            }
            None => false,
        }
    }

    pub fn dismiss_suggested_title(&mut self) {
        self.suggested_title = None;
    }

    /// Check every precondition of [`submit`](Self::submit) and compose the issue
    pub fn compose(&self) -> Result<(&Session, CreateIssueDto), ReportError> {
        let title = self.title.trim();
        let (Some(photo), Some(category)) = (self.photo.as_ref(), self.category) else {
            return Err(ReportError::MissingFields);
        };
        if title.is_empty() {
            return Err(ReportError::MissingFields);
        }

        let user = self.user.as_ref().ok_or(ReportError::NotLoggedIn)?;
        if self.verification != VerificationStatus::Success {
            return Err(ReportError::NotVerified);
        }
        let location = self.location.ok_or(ReportError::LocationRequired)?;

        let issue = CreateIssueDto {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            category,
            images: vec![photo.uri.clone()],
            audio_url: None,
            latitude: location.latitude,
            longitude: location.longitude,
            address: self.address.clone().filter(|a| !a.is_empty()),
            verified: true,
        };

        Ok((user, issue))
    }

    /// Persist the issue; the form is cleared on success and kept intact on failure
    pub async fn submit<S>(&mut self, sink: &S) -> Result<IssueResponseDto, ReportError>
    where
        S: IssueSink + ?Sized,
    {
        let (user, issue) = self.compose()?;
        tracing::info!(user_id = %user.user_id, action = "submit_report", "User action: submit_report");

        match sink.submit_issue(&user.access_token, &issue).await {
            Ok(created) => {
                tracing::info!("Issue reported: id={}", created.id);
                self.reset();
                Ok(created)
            }
            Err(e) => {
                tracing::error!("Failed to submit report: {} {}", e.code(), e);
                Err(ReportError::SubmitFailed(e))
            }
        }
    }

    /// Clear everything the user entered; location and user stay loaded
    pub fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
        self.category = Some(IssueCategory::default());
        self.photo = None;
        self.invalidate_verification();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::platform::AuthEvent;
    use crate::features::issues::models::IssueStatus;
    use crate::features::users::dtos::UserProfileResponseDto;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::broadcast;

    fn session() -> Session {
        Session {
            access_token: "access-token".to_string(),
            refresh_token: None,
            user_id: "5f0c8a8e-6a1b-4f4e-9a57-2d4b1f3c9e01".to_string(),
            email: Some("citizen@example.com".to_string()),
        }
    }

    struct StubIdentity(Option<Session>);

    #[async_trait]
    impl IdentityProvider for StubIdentity {
        async fn restore_session(&self) -> Result<Option<Session>, ClientError> {
            Ok(None)
        }

        async fn current_session(&self) -> Result<Option<Session>, ClientError> {
            Ok(self.0.clone())
        }

        async fn current_profile(
            &self,
            _session: &Session,
        ) -> Result<Option<UserProfileResponseDto>, ClientError> {
            Ok(None)
        }

        fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
            broadcast::channel(1).1
        }
    }

    struct StubLocation {
        fix: Option<Coordinates>,
        address: Option<String>,
    }

    #[async_trait]
    impl LocationProvider for StubLocation {
        async fn current_location(&self) -> Result<Coordinates, ClientError> {
            self.fix
                .ok_or_else(|| ClientError::Permission("Location permission denied".to_string()))
        }

        async fn reverse_geocode(&self, _at: Coordinates) -> Result<Option<String>, ClientError> {
            Ok(self.address.clone())
        }
    }

    struct StubPhotos(Result<Option<Photo>, ClientError>);

    #[async_trait]
    impl PhotoSource for StubPhotos {
        async fn acquire(&self, _origin: PhotoOrigin) -> Result<Option<Photo>, ClientError> {
            self.0.clone()
        }
    }

    struct StubVerifier {
        outcome: Result<VerificationResult, ClientError>,
        calls: AtomicUsize,
    }

    impl StubVerifier {
        fn answering(outcome: Result<VerificationResult, ClientError>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }

        fn verified(label: Option<&str>) -> Self {
            Self::answering(Ok(VerificationResult {
                verified: true,
                confidence: Some(0.91),
                label: label.map(str::to_string),
                bbox: None,
            }))
        }
    }

    #[async_trait]
    impl PhotoVerifier for StubVerifier {
        async fn verify(&self, _photo: &Photo) -> Result<VerificationResult, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        fail: bool,
        submitted: Mutex<Vec<(String, CreateIssueDto)>>,
    }

    #[async_trait]
    impl IssueSink for RecordingSink {
        async fn submit_issue(
            &self,
            access_token: &str,
            issue: &CreateIssueDto,
        ) -> Result<IssueResponseDto, ClientError> {
            self.submitted
                .lock()
                .unwrap()
                .push((access_token.to_string(), issue.clone()));
            if self.fail {
                return Err(ClientError::Upstream {
                    status: 500,
                    message: "Database error occurred".to_string(),
                });
            }
            let now = chrono::Utc::now();
            Ok(IssueResponseDto {
                id: uuid::Uuid::new_v4(),
                title: issue.title.clone(),
                description: issue.description.clone(),
                category: issue.category,
                images: issue.images.clone(),
                audio_url: None,
                latitude: issue.latitude,
                longitude: issue.longitude,
                address: issue.address.clone(),
                user_id: uuid::Uuid::new_v4(),
                verified: issue.verified,
                status: IssueStatus::Pending,
                created_at: now,
                updated_at: now,
            })
        }
    }

    impl RecordingSink {
        fn count(&self) -> usize {
            self.submitted.lock().unwrap().len()
        }
    }

    fn photo(name: &str) -> Photo {
        Photo::jpeg(format!("file:///data/{}", name), b"jpeg".to_vec())
    }

    async fn ready_form() -> ReportForm {
        let mut form = ReportForm::new();
        form.prepare(
            &StubIdentity(Some(session())),
            &StubLocation {
                fix: Some(Coordinates {
                    latitude: 27.7172,
                    longitude: 85.324,
                }),
                address: Some("Thamel, Kathmandu".to_string()),
            },
        )
        .await
        .unwrap();
        form.title = "Broken drain".to_string();
        form.description = "Overflowing onto the road".to_string();
        form.set_photo(photo("drain.jpg"));
        form
    }

    #[tokio::test]
    async fn test_prepare_loads_user_location_and_address() {
        let form = ready_form().await;

        assert_eq!(form.user().map(|s| s.user_id.as_str()), Some(session().user_id.as_str()));
        assert_eq!(form.address(), Some("Thamel, Kathmandu"));
        assert!(form.location().is_some());
    }

    #[tokio::test]
    async fn test_location_failure_alert() {
        let mut form = ReportForm::new();
        let err = form
            .prepare(
                &StubIdentity(Some(session())),
                &StubLocation {
                    fix: None,
                    address: None,
                },
            )
            .await
            .unwrap_err();

        assert!(form.location().is_none());
        assert!(form.user().is_some());
        assert_eq!(
            err.alert(),
            Some(Alert {
                title: "Location Error".to_string(),
                message: "Unable to get current location. Please enable location services."
                    .to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_geocoding_miss_leaves_address_unset() {
        let mut form = ReportForm::new();
        form.refresh_location(&StubLocation {
            fix: Some(Coordinates {
                latitude: 1.0,
                longitude: 2.0,
            }),
            address: None,
        })
        .await
        .unwrap();

        assert!(form.location().is_some());
        assert!(form.address().is_none());
    }

    #[tokio::test]
    async fn test_verify_without_photo() {
        let mut form = ReportForm::new();
        let verifier = StubVerifier::verified(None);

        let err = form.verify_photo(&verifier).await.unwrap_err();

        assert_eq!(err, ReportError::NoPhoto);
        let alert = err.alert().unwrap();
        assert_eq!(alert.title, "No photo");
        assert_eq!(alert.message, "Please add a photo first");
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_verified_label_becomes_suggestion() {
        let mut form = ready_form().await;

        let status = form
            .verify_photo(&StubVerifier::verified(Some("pothole")))
            .await
            .unwrap();

        assert_eq!(status, VerificationStatus::Success);
        assert_eq!(form.title, "Broken drain");
        assert_eq!(form.suggested_title(), Some("pothole"));
        assert_eq!(form.confidence(), Some(0.91));

        assert!(form.accept_suggested_title());
        assert_eq!(form.title, "pothole");
        assert_eq!(form.suggested_title(), None);
    }

    #[tokio::test]
    async fn test_dismissed_suggestion_keeps_title() {
        let mut form = ready_form().await;
        form.verify_photo(&StubVerifier::verified(Some("garbage")))
            .await
            .unwrap();

        form.dismiss_suggested_title();

        assert!(!form.accept_suggested_title());
        assert_eq!(form.title, "Broken drain");
    }

    #[tokio::test]
    async fn test_unverified_and_errors_fail() {
        let mut form = ready_form().await;
        let rejected = StubVerifier::answering(Ok(VerificationResult {
            verified: false,
            confidence: Some(0.2),
            label: Some("cat".to_string()),
            bbox: None,
        }));

        let err = form.verify_photo(&rejected).await.unwrap_err();
        assert_eq!(err, ReportError::VerificationFailed);
        assert_eq!(form.verification_status(), VerificationStatus::Fail);
        assert_eq!(form.suggested_title(), None);

        let unreachable = StubVerifier::answering(Err(ClientError::Network("offline".into())));
        let err = form.verify_photo(&unreachable).await.unwrap_err();
        let alert = err.alert().unwrap();
        assert_eq!(alert.title, "Verification error");
        assert_eq!(alert.message, "Could not verify image. Try again.");
        assert_eq!(form.verification_status(), VerificationStatus::Fail);
    }

    #[tokio::test]
    async fn test_photo_change_resets_verification() {
        let mut form = ready_form().await;
        form.verify_photo(&StubVerifier::verified(Some("pothole")))
            .await
            .unwrap();

        form.set_photo(photo("other.jpg"));

        assert_eq!(form.verification_status(), VerificationStatus::Idle);
        assert_eq!(form.confidence(), None);
        assert_eq!(form.label(), None);
        assert_eq!(form.suggested_title(), None);
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let mut form = ready_form().await;

        let ticket = form.begin_verification().unwrap();
        assert_eq!(form.verification_status(), VerificationStatus::Pending);
        form.set_photo(photo("replacement.jpg"));

        let outcome = Ok(VerificationResult {
            verified: true,
            confidence: Some(0.99),
            label: Some("pothole".to_string()),
            bbox: None,
        });
        let err = form.complete_verification(ticket, outcome).unwrap_err();

        assert_eq!(err, ReportError::StaleVerification);
        assert_eq!(err.alert(), None);
        assert_eq!(form.verification_status(), VerificationStatus::Idle);
        assert_eq!(form.suggested_title(), None);
    }

    #[tokio::test]
    async fn test_capture_photo_outcomes() {
        let mut form = ReportForm::new();

        let taken = form
            .capture_photo(&StubPhotos(Ok(Some(photo("cam.jpg")))), PhotoOrigin::Camera)
            .await
            .unwrap();
        assert!(taken);
        assert_eq!(form.photo().map(|p| p.uri.as_str()), Some("file:///data/cam.jpg"));

        let cancelled = form
            .capture_photo(&StubPhotos(Ok(None)), PhotoOrigin::Library)
            .await
            .unwrap();
        assert!(!cancelled);
        assert!(form.photo().is_some());

        let err = form
            .capture_photo(
                &StubPhotos(Err(ClientError::Permission("denied".into()))),
                PhotoOrigin::Camera,
            )
            .await
            .unwrap_err();
        let alert = err.alert().unwrap();
        assert_eq!(alert.title, "Permission needed");
        assert_eq!(alert.message, "Please grant camera permissions to take photos.");

        let err = form
            .capture_photo(
                &StubPhotos(Err(ClientError::Network("io".into()))),
                PhotoOrigin::Library,
            )
            .await
            .unwrap_err();
        assert_eq!(err.alert().unwrap().message, "Failed to pick image");
    }

    #[tokio::test]
    async fn test_submit_preconditions_make_no_call() {
        let sink = RecordingSink::default();

        let mut form = ready_form().await;
        form.title = "   ".to_string();
        let err = form.submit(&sink).await.unwrap_err();
        assert_eq!(
            err.alert().unwrap(),
            Alert {
                title: "Error".to_string(),
                message: "Please provide all required fields (photo, title, category)".to_string(),
            }
        );

        let mut form = ready_form().await;
        form.category = None;
        assert_eq!(form.submit(&sink).await.unwrap_err(), ReportError::MissingFields);

        let mut form = ready_form().await;
        form.clear_photo();
        assert_eq!(form.submit(&sink).await.unwrap_err(), ReportError::MissingFields);

        let mut form = ready_form().await;
        form.user = None;
        let err = form.submit(&sink).await.unwrap_err();
        assert_eq!(err.to_string(), "You must be logged in to report issues");

        let mut form = ready_form().await;
        let err = form.submit(&sink).await.unwrap_err();
        assert_eq!(err.to_string(), "Please verify the photo before submitting.");

        let mut form = ready_form().await;
        form.verify_photo(&StubVerifier::verified(None)).await.unwrap();
        form.location = None;
        let err = form.submit(&sink).await.unwrap_err();
        assert_eq!(err.to_string(), "Location is required to submit a report");

        assert_eq!(sink.count(), 0);
    }

    #[tokio::test]
    async fn test_successful_submit_clears_form() {
        let sink = RecordingSink::default();
        let mut form = ready_form().await;
        form.category = Some(IssueCategory::Environment);
        form.verify_photo(&StubVerifier::verified(Some("drain")))
            .await
            .unwrap();

        let created = form.submit(&sink).await.unwrap();

        assert_eq!(created.title, "Broken drain");
        let submitted = sink.submitted.lock().unwrap();
        let (token, issue) = &submitted[0];
        assert_eq!(token, "access-token");
        assert_eq!(issue.category, IssueCategory::Environment);
        assert_eq!(issue.images, vec!["file:///data/drain.jpg".to_string()]);
        assert_eq!(issue.address.as_deref(), Some("Thamel, Kathmandu"));
        assert!(issue.verified);

        assert!(form.title.is_empty());
        assert!(form.description.is_empty());
        assert_eq!(form.category, Some(IssueCategory::Infrastructure));
        assert!(form.photo().is_none());
        assert_eq!(form.verification_status(), VerificationStatus::Idle);
        assert!(form.location().is_some());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_form() {
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let mut form = ready_form().await;
        form.verify_photo(&StubVerifier::verified(None)).await.unwrap();

        let err = form.submit(&sink).await.unwrap_err();

        assert_eq!(
            err.alert().unwrap(),
            Alert {
                title: "Error".to_string(),
                message: "Failed to submit report".to_string(),
            }
        );
        assert_eq!(form.title, "Broken drain");
        assert!(form.photo().is_some());
        assert_eq!(form.verification_status(), VerificationStatus::Success);
    }
}
