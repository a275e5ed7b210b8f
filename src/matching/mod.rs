pub mod authors;
pub mod config;
pub mod filter;
pub mod fuzz;
pub mod matcher;
pub mod normalize;
pub mod query;
pub mod scoring;
pub mod select;

pub use authors::{author_score, normalize_authors, NormalizedAuthor, DEFAULT_AUTHOR_PAIR_LIMIT};
pub use config::{MatchConfig, ScoreWeights};
pub use filter::{filter_candidates, POSTED_CONTENT};
pub use matcher::PreprintMatcher;
pub use normalize::{normalize_orcid, normalize_text};
pub use query::QueryBuilder;
pub use scoring::{title_score, year_score, PreparedArticle, ScoringEngine};
pub use select::MatchSelector;
