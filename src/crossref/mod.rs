pub mod candidate_log;
pub mod client;
pub mod work;

pub use candidate_log::{CandidateLogEntry, CandidateSink, JsonlCandidateLog};
pub use client::{backoff_delay, ClientConfig, CrossrefClient};
pub use work::{article_from_value, candidates_from_items, Work};

use serde_json::Value;

use crate::error::MatchError;

/// Anything that can answer a bibliographic query with raw Crossref works
#[allow(async_fn_in_trait)]
pub trait CandidateSource {
    async fn fetch_candidates(&self, query: &str, context_doi: &str) -> Result<Vec<Value>, MatchError>;
}

impl CandidateSource for CrossrefClient {
    async fn fetch_candidates(&self, query: &str, context_doi: &str) -> Result<Vec<Value>, MatchError> {
        self.search(query, context_doi).await
    }
}
