mod gotrue_client;

pub use gotrue_client::{GoTrueClient, GoTrueSession, GoTrueUser, SignupOutcome};
