mod issue;

pub use issue::*;
