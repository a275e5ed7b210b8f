use std::cmp::Ordering;

use crate::common::{MatchResult, ScoredCandidate};

use super::config::{DEFAULT_MAX_SCORE_DIFF, DEFAULT_MIN_SCORE};

/// Absorbs float noise at the `max_score_diff` boundary
const SCORE_EPSILON: f64 = 1e-9;

/// Turns scored candidates into the accepted match set
#[derive(Debug, Clone, Copy)]
pub struct MatchSelector {
    min_score: f64,
    max_score_diff: f64,
}

impl Default for MatchSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCORE, DEFAULT_MAX_SCORE_DIFF)
    }
}

impl MatchSelector {
    pub fn new(min_score: f64, max_score_diff: f64) -> Self {
        Self {
            min_score,
            max_score_diff,
        }
    }

    /// Keeps candidates at or above `min_score` that are within
    /// `max_score_diff` of the best one, highest first
    pub fn select(&self, candidates: Vec<ScoredCandidate>) -> MatchResult {
        let mut viable: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|c| c.score() >= self.min_score)
            .collect();

        if viable.is_empty() {
            return MatchResult::empty();
        }

        viable.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
        let top = viable[0].score();
        viable.retain(|c| top - c.score() <= self.max_score_diff + SCORE_EPSILON);

        MatchResult { matches: viable }
    }
}
