mod reward_handler;

pub use reward_handler::*;
