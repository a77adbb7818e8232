pub mod constants;
pub mod recent_logs;
pub mod test_helpers;
pub mod types;
pub mod validation;
