use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::rewards::dtos::{LeaderboardEntryDto, LeaderboardQuery, RewardSummaryDto};
use crate::features::rewards::services::RewardService;
use crate::shared::types::ApiResponse;

/// Get the caller's reward balance
#[utoipa::path(
    get,
    path = "/api/rewards",
    responses(
        (status = 200, description = "Balance and recent transactions", body = ApiResponse<RewardSummaryDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "rewards"
)]
pub async fn get_rewards(
    user: AuthenticatedUser,
    State(service): State<Arc<RewardService>>,
) -> Result<Json<ApiResponse<RewardSummaryDto>>> {
    let summary = service.summary(user.user_id()?).await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

/// Top citizens by points
#[utoipa::path(
    get,
    path = "/api/rewards/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard", body = ApiResponse<Vec<LeaderboardEntryDto>>)
    ),
    tag = "rewards"
)]
pub async fn get_leaderboard(
    State(service): State<Arc<RewardService>>,
    AppQuery(query): AppQuery<LeaderboardQuery>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntryDto>>>> {
    let entries = service.leaderboard(query.limit()).await?;
    Ok(Json(ApiResponse::success(Some(entries), None, None)))
}
