use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::rewards::handlers;
use crate::features::rewards::services::RewardService;

pub fn public_routes(service: Arc<RewardService>) -> Router {
    Router::new()
        .route("/api/rewards/leaderboard", get(handlers::get_leaderboard))
        .with_state(service)
}

/// Note: requires authentication
pub fn protected_routes(service: Arc<RewardService>) -> Router {
    Router::new()
        .route("/api/rewards", get(handlers::get_rewards))
        .with_state(service)
}
