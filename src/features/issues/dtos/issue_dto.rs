use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::issues::models::{Issue, IssueCategory, IssueStatus};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::types::PaginationQuery;
use crate::shared::validation::{validate_media_uri, validate_media_uris};

/// Request DTO for reporting an issue
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateIssueDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: String,
    pub category: IssueCategory,
    /// Photo references; at least one is required
    #[validate(
        length(min = 1, max = 10, message = "Between 1 and 10 images are required"),
        custom(function = "validate_media_uris")
    )]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_media_uri"))]
    pub audio_url: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Address must not exceed 500 characters"))]
    pub address: Option<String>,
    /// Whether the AI service verified the photo
    #[serde(default)]
    pub verified: bool,
}

/// Request DTO for editing a pending issue; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateIssueDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,
    pub category: Option<IssueCategory>,
    #[validate(length(max = 500, message = "Address must not exceed 500 characters"))]
    pub address: Option<String>,
}

impl UpdateIssueDto {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.address.is_none()
    }
}

/// Response DTO for issue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub images: Vec<String>,
    pub audio_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub user_id: Uuid,
    pub verified: bool,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Issue> for IssueResponseDto {
    fn from(i: Issue) -> Self {
        Self {
            id: i.id,
            title: i.title,
            description: i.description,
            category: i.category,
            images: i.images,
            audio_url: i.audio_url,
            latitude: i.latitude,
            longitude: i.longitude,
            address: i.address,
            user_id: i.user_id,
            verified: i.verified,
            status: i.status,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

/// Query params for listing issues
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IssueQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    pub category: Option<IssueCategory>,
    pub status: Option<IssueStatus>,
    /// Only issues reported by this user
    pub user_id: Option<Uuid>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for IssueQueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            category: None,
            status: None,
            user_id: None,
        }
    }
}

impl IssueQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size.min(MAX_PAGE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::{Sentence, Words};
    use fake::Fake;

    fn valid_issue() -> CreateIssueDto {
        let words: Vec<String> = Words(3..5).fake();
        CreateIssueDto {
            title: words.join(" "),
            description: Sentence(5..10).fake(),
            category: IssueCategory::Infrastructure,
            images: vec!["file:///data/user/0/photo.jpg".to_string()],
            audio_url: None,
            latitude: 27.7172,
            longitude: 85.3240,
            address: Some("Kathmandu".to_string()),
            verified: true,
        }
    }

    #[test]
    fn test_valid_issue_passes() {
        assert!(valid_issue().validate().is_ok());
    }

    #[test]
    fn test_issue_requires_title_and_photo() {
        let mut dto = valid_issue();
        dto.title = String::new();
        dto.images.clear();

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("images"));
    }

    #[test]
    fn test_issue_rejects_bad_media_and_coordinates() {
        let mut dto = valid_issue();
        dto.images = vec!["photo.jpg".to_string()];
        dto.audio_url = Some("javascript:alert(1)".to_string());
        dto.latitude = 120.0;

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("images"));
        assert!(fields.contains_key("audio_url"));
        assert!(fields.contains_key("latitude"));
    }

    #[test]
    fn test_create_defaults_when_optional_fields_missing() {
        let dto: CreateIssueDto = serde_json::from_value(serde_json::json!({
            "title": "Pothole",
            "category": "infrastructure",
            "images": ["https://cdn.example.com/a.jpg"],
            "latitude": 1.0,
            "longitude": 2.0
        }))
        .unwrap();

        assert_eq!(dto.description, "");
        assert!(!dto.verified);
        assert!(dto.address.is_none());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateIssueDto::default().is_empty());
        let dto = UpdateIssueDto {
            category: Some(IssueCategory::Safety),
            ..Default::default()
        };
        assert!(!dto.is_empty());
    }
}
