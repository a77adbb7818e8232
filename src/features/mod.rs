pub mod ai_proxy;
pub mod auth;
pub mod health;
pub mod issues;
pub mod rewards;
pub mod users;
