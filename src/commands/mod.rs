pub mod match_works;
pub mod query;

pub use match_works::run_match;
pub use query::run_query;
