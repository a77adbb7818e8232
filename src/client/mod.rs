//! Client core for the reporting app.
//!
//! Platform concerns (GPS, camera, identity SDK) stay behind the traits in
//! [`platform`]; everything else here is plain async Rust that a UI shell
//! drives and renders.

pub mod error;
pub mod http;
pub mod platform;
pub mod report;
pub mod session;

pub use error::ClientError;
pub use http::{ApiClient, ClientConfig};
pub use report::{Alert, ReportError, ReportForm, VerificationStatus};
pub use session::{
    AuthState, BackoffPolicy, ProfileFailurePolicy, SessionReconciler, SessionWatcher,
};
