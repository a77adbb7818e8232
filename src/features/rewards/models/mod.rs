mod reward_transaction;

pub use reward_transaction::*;
