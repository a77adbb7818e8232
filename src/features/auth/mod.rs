//! Authentication against the managed identity service.
//!
//! Register/login/refresh are relayed to the provider's GoTrue REST API;
//! protected routes validate the provider-issued JWT locally.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/auth/register` | No | Create an account |
//! | POST | `/api/auth/login` | No | Email/password sign-in |
//! | POST | `/api/auth/refresh` | No | Exchange a refresh token |
//! | GET | `/api/auth/me` | Yes | Claims of the current token |

mod validator;

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use validator::JwtValidator;
