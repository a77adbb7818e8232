use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::ai_proxy::handlers::proxy_handler;
use crate::features::auth;
use crate::features::health::{dtos as health_dtos, handlers::health_handler};
use crate::features::issues::{
    dtos as issues_dtos, handlers as issues_handlers, models as issues_models,
};
use crate::features::rewards::{dtos as rewards_dtos, handlers as rewards_handlers};
use crate::features::users::{dtos as users_dtos, handlers::profile_handler};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health_handler::health,
        health_handler::detailed_health,
        health_handler::readiness,
        health_handler::liveness,
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::refresh_token,
        auth::handlers::get_me,
        // Users
        profile_handler::get_profile,
        profile_handler::provision_profile,
        profile_handler::update_profile,
        // Issues
        issues_handlers::list_issues,
        issues_handlers::list_my_issues,
        issues_handlers::get_issue,
        issues_handlers::create_issue,
        issues_handlers::update_issue,
        issues_handlers::delete_issue,
        // Rewards
        rewards_handlers::get_rewards,
        rewards_handlers::get_leaderboard,
        // AI proxy
        proxy_handler::proxy,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Health
            health_dtos::ProbeStatus,
            health_dtos::ServiceStatus,
            health_dtos::BasicHealthDto,
            health_dtos::DetailedHealthDto,
            health_dtos::ReadinessDto,
            health_dtos::MemoryUsageDto,
            health_dtos::LivenessDto,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::RefreshTokenRequestDto,
            auth::dtos::SessionDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::AuthUserDto,
            auth::dtos::MeResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::SessionDto>,
            ApiResponse<auth::dtos::MeResponseDto>,
            // Users
            users_dtos::UserProfileResponseDto,
            users_dtos::UpdateProfileDto,
            ApiResponse<users_dtos::UserProfileResponseDto>,
            // Issues
            issues_models::IssueCategory,
            issues_models::IssueStatus,
            issues_dtos::CreateIssueDto,
            issues_dtos::UpdateIssueDto,
            issues_dtos::IssueResponseDto,
            ApiResponse<issues_dtos::IssueResponseDto>,
            ApiResponse<Vec<issues_dtos::IssueResponseDto>>,
            // Rewards
            rewards_dtos::RewardTransactionDto,
            rewards_dtos::RewardSummaryDto,
            rewards_dtos::LeaderboardEntryDto,
            ApiResponse<rewards_dtos::RewardSummaryDto>,
            ApiResponse<Vec<rewards_dtos::LeaderboardEntryDto>>,
        )
    ),
    tags(
        (name = "health", description = "Liveness, readiness and dependency health"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User profile management"),
        (name = "issues", description = "Civic issue reports"),
        (name = "rewards", description = "Reward points and leaderboard"),
        (name = "ai", description = "Proxy to the AI verification service"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Nivaran API",
        version = "0.1.0",
        description = "API documentation for Nivaran",
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` JWT scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Overrides the document info with deployment settings
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
