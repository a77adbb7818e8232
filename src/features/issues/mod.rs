//! Civic issue reports.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/issues` | Public list with `category`/`status`/`user_id` filters |
//! | GET | `/api/issues/mine` | Issues reported by the caller |
//! | GET | `/api/issues/{id}` | Single issue |
//! | POST | `/api/issues` | Report an issue (awards points when verified) |
//! | PUT | `/api/issues/{id}` | Edit own issue while still pending |
//! | DELETE | `/api/issues/{id}` | Delete own issue |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::IssueService;
