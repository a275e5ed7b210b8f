use log::warn;
use std::collections::BTreeSet;

use crate::common::{is_plausible_year, ArticleRecord};
use crate::error::MatchError;

use super::config::DEFAULT_MAX_QUERY_LEN;
use super::normalize::{collapse_whitespace, normalize_text};

/// Builds the free-text bibliographic query sent to Crossref for one article
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    max_len: usize,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUERY_LEN)
    }
}

impl QueryBuilder {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Title (with subtitle), year, then sorted unique family names.
    ///
    /// Fails with `EmptyQuery` when the record has neither a usable title nor
    /// any usable family name.
    pub fn build(&self, article: &ArticleRecord) -> Result<String, MatchError> {
        let title = normalize_text(&article.full_title());

        let families: BTreeSet<String> = article
            .authors
            .iter()
            .map(|author| normalize_text(&author.family))
            .filter(|family| !family.is_empty())
            .collect();

        if title.is_empty() && families.is_empty() {
            return Err(MatchError::EmptyQuery);
        }

        let mut parts: Vec<String> = Vec::with_capacity(families.len() + 2);
        if !title.is_empty() {
            parts.push(title);
        }
        if let Some(year) = article.year.filter(|&y| is_plausible_year(y)) {
            parts.push(year.to_string());
        }
        parts.extend(families);

        let query = collapse_whitespace(&parts.join(" "));
        let length = query.chars().count();
        if length > self.max_len {
            warn!(
                "Query for {} truncated from {} to {} characters",
                article.label(),
                length,
                self.max_len
            );
            return Ok(query.chars().take(self.max_len).collect());
        }

        Ok(query)
    }
}
