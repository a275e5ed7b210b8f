use crate::error::MatchError;

use super::authors::DEFAULT_AUTHOR_PAIR_LIMIT;

pub const DEFAULT_MIN_SCORE: f64 = 0.85;
pub const DEFAULT_MAX_SCORE_DIFF: f64 = 0.03;
pub const DEFAULT_MAX_QUERY_LEN: usize = 5000;
pub const DEFAULT_WEIGHT_YEAR: f64 = 0.4;
pub const DEFAULT_WEIGHT_TITLE: f64 = 2.0;
pub const DEFAULT_WEIGHT_AUTHOR: f64 = 0.8;

/// Relative weights of the three component scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub year: f64,
    pub title: f64,
    pub author: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            year: DEFAULT_WEIGHT_YEAR,
            title: DEFAULT_WEIGHT_TITLE,
            author: DEFAULT_WEIGHT_AUTHOR,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.year + self.title + self.author
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        for (name, weight) in [("year", self.year), ("title", self.title), ("author", self.author)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(MatchError::Configuration(format!(
                    "weight_{} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        if self.total() <= 0.0 {
            return Err(MatchError::Configuration(
                "at least one of weight_year, weight_title, weight_author must be positive"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for query building, scoring and selection
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    pub min_score: f64,
    pub max_score_diff: f64,
    pub weights: ScoreWeights,
    pub max_query_len: usize,
    pub author_pair_limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            max_score_diff: DEFAULT_MAX_SCORE_DIFF,
            weights: ScoreWeights::default(),
            max_query_len: DEFAULT_MAX_QUERY_LEN,
            author_pair_limit: DEFAULT_AUTHOR_PAIR_LIMIT,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        self.weights.validate()?;
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(MatchError::Configuration(format!(
                "min_score must be within [0, 1], got {}",
                self.min_score
            )));
        }
        if !self.max_score_diff.is_finite() || self.max_score_diff < 0.0 {
            return Err(MatchError::Configuration(format!(
                "max_score_diff must be a non-negative number, got {}",
                self.max_score_diff
            )));
        }
        if self.max_query_len == 0 {
            return Err(MatchError::Configuration(
                "max_query_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
