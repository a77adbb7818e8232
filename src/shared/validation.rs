use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Regex for media references attached to an issue (photos, audio)
    /// Remote uploads or on-device URIs handed over by the mobile client
    /// - Valid: "https://cdn.example.com/a.jpg", "file:///data/photo.jpg", "content://media/1"
    /// - Invalid: "photo.jpg", "ftp://host/a.jpg", "https://", "javascript:alert(1)"
    pub static ref MEDIA_URI_REGEX: Regex =
        Regex::new(r"^(https?|file|content)://\S+$").unwrap();
}

/// `validator` hook for a single media reference
pub fn validate_media_uri(uri: &str) -> Result<(), ValidationError> {
    if MEDIA_URI_REGEX.is_match(uri) {
        Ok(())
    } else {
        let mut error = ValidationError::new("media_uri");
        error.message = Some("Media reference must be an http(s), file or content URI".into());
        Err(error)
    }
}

/// `validator` hook for the photo list of an issue
pub fn validate_media_uris(uris: &[String]) -> Result<(), ValidationError> {
    uris.iter().try_for_each(|uri| validate_media_uri(uri))
}
