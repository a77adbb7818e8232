//! Application profiles of citizens.
//!
//! A session may exist before its `users` row does; the profile is provisioned
//! from token claims on first `POST /api/users/me` (or first issue report).
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Own profile (404 while not provisioned) |
//! | POST | `/api/users/me` | Provision own profile from token claims (idempotent) |
//! | PUT | `/api/users/me` | Update name and avatar |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserProfileService;
