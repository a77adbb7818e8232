/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// REWARDS
// =============================================================================

/// Points granted when a citizen files an AI-verified issue
pub const VERIFIED_ISSUE_POINTS: i32 = 10;

/// Reason recorded on the ledger for [`VERIFIED_ISSUE_POINTS`]
pub const REASON_VERIFIED_ISSUE: &str = "verified_issue_report";

/// Reason recorded when a verified issue is deleted and its points are taken back
pub const REASON_VERIFIED_ISSUE_DELETED: &str = "verified_issue_deleted";

pub const DEFAULT_LEADERBOARD_SIZE: i64 = 10;
pub const MAX_LEADERBOARD_SIZE: i64 = 50;

// =============================================================================
// OUTBOUND HTTP
// =============================================================================

/// User agent presented to the AI service
pub const BACKEND_USER_AGENT: &str = "Nivaran-Backend/1.0";

/// User agent presented by the client library
pub const CLIENT_USER_AGENT: &str = "Nivaran-Client/1.0";
