use log::{debug, info};

use crate::common::{ArticleRecord, MatchResult, ScoredCandidate};
use crate::crossref::{candidates_from_items, CandidateSource};
use crate::error::MatchError;

use super::config::MatchConfig;
use super::filter::filter_candidates;
use super::query::QueryBuilder;
use super::scoring::ScoringEngine;
use super::select::MatchSelector;

/// Query, search, filter, score and select for one article at a time
pub struct PreprintMatcher<S> {
    source: S,
    query_builder: QueryBuilder,
    engine: ScoringEngine,
    selector: MatchSelector,
}

impl<S: CandidateSource> PreprintMatcher<S> {
    pub fn new(source: S, config: &MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            source,
            query_builder: QueryBuilder::new(config.max_query_len),
            engine: ScoringEngine::from_config(config)?,
            selector: MatchSelector::new(config.min_score, config.max_score_diff),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn match_record(&self, article: &ArticleRecord) -> Result<MatchResult, MatchError> {
        let label = article.label();
        let query = self.query_builder.build(article)?;
        debug!("Query for {}: {}", label, query);

        let items = self.source.fetch_candidates(&query, label).await?;
        let retrieved = items.len();
        let candidates = filter_candidates(candidates_from_items(items, label));
        if candidates.len() < retrieved {
            debug!(
                "Filtered {} non-preprint candidates for {}",
                retrieved - candidates.len(),
                label
            );
        }
        if candidates.is_empty() {
            debug!("No preprint candidates for {}", label);
            return Ok(MatchResult::empty());
        }

        let prepared = self.engine.prepare(article);
        let scored: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|candidate| ScoredCandidate {
                doi: candidate.doi.clone(),
                breakdown: self.engine.score(&prepared, candidate),
            })
            .collect();

        let result = self.selector.select(scored);
        match result.best() {
            Some(best) => info!(
                "Match found for {}: {} (score {:.4}, {} accepted of {} candidates)",
                label,
                best.doi,
                best.score(),
                result.len(),
                candidates.len()
            ),
            None => debug!("No candidate above threshold for {}", label),
        }
        Ok(result)
    }
}
