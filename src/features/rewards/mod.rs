//! Reward points earned by reporting verified issues.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/rewards` | Caller's balance and recent transactions |
//! | GET | `/api/rewards/leaderboard` | Top citizens by points |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::RewardService;
