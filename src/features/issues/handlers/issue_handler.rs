use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::issues::dtos::{
    CreateIssueDto, IssueQueryParams, IssueResponseDto, UpdateIssueDto,
};
use crate::features::issues::services::IssueService;
use crate::shared::types::{ApiResponse, Meta};

/// List issues
#[utoipa::path(
    get,
    path = "/api/issues",
    params(IssueQueryParams),
    responses(
        (status = 200, description = "Paginated list of issues", body = ApiResponse<Vec<IssueResponseDto>>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "issues"
)]
pub async fn list_issues(
    State(service): State<Arc<IssueService>>,
    AppQuery(params): AppQuery<IssueQueryParams>,
) -> Result<Json<ApiResponse<Vec<IssueResponseDto>>>> {
    let (issues, total) = service.list(&params).await?;
    let meta = Meta::paginated(total, &params.pagination());
    Ok(Json(ApiResponse::success(Some(issues), None, Some(meta))))
}

/// List the caller's own issues
#[utoipa::path(
    get,
    path = "/api/issues/mine",
    params(IssueQueryParams),
    responses(
        (status = 200, description = "Issues reported by the caller", body = ApiResponse<Vec<IssueResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn list_my_issues(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    AppQuery(mut params): AppQuery<IssueQueryParams>,
) -> Result<Json<ApiResponse<Vec<IssueResponseDto>>>> {
    params.user_id = Some(user.user_id()?);
    let (issues, total) = service.list(&params).await?;
    let meta = Meta::paginated(total, &params.pagination());
    Ok(Json(ApiResponse::success(Some(issues), None, Some(meta))))
}

/// Get issue by ID
#[utoipa::path(
    get,
    path = "/api/issues/{id}",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Issue found", body = ApiResponse<IssueResponseDto>),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues"
)]
pub async fn get_issue(
    State(service): State<Arc<IssueService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    let issue = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(issue), None, None)))
}

/// Report a new issue
#[utoipa::path(
    post,
    path = "/api/issues",
    request_body = CreateIssueDto,
    responses(
        (status = 201, description = "Issue reported", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn create_issue(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    AppJson(dto): AppJson<CreateIssueDto>,
) -> Result<(StatusCode, Json<ApiResponse<IssueResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if dto.title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be blank".to_string()));
    }

    let issue = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(issue),
            Some("Issue reported successfully".to_string()),
            None,
        )),
    ))
}

/// Edit a pending issue
#[utoipa::path(
    put,
    path = "/api/issues/{id}",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    request_body = UpdateIssueDto,
    responses(
        (status = 200, description = "Issue updated", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Issue not found"),
        (status = 409, description = "Issue is no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn update_issue(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateIssueDto>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if dto.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("Title must not be blank".to_string()));
    }

    let issue = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(issue),
        Some("Issue updated successfully".to_string()),
        None,
    )))
}

/// Delete an issue
#[utoipa::path(
    delete,
    path = "/api/issues/{id}",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Issue deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Issue not found")
    ),
    security(("bearer_auth" = [])),
    tag = "issues"
)]
pub async fn delete_issue(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Issue deleted successfully".to_string()),
        None,
    )))
}
