use log::debug;

use crate::common::{is_plausible_year, ArticleRecord, CandidateRecord, ScoreBreakdown};
use crate::error::MatchError;

use super::authors::{author_score, normalize_authors, NormalizedAuthor};
use super::config::{MatchConfig, ScoreWeights};
use super::fuzz::{token_set_ratio, token_sort_ratio, wratio};
use super::normalize::normalize_text;

/// First words marking notices about another work rather than the work itself
pub const ERRATUM_KEYWORDS: [&str; 10] = [
    "correction",
    "response",
    "reply",
    "appendix",
    "erratum",
    "corrigendum",
    "comment",
    "addendum",
    "retraction",
    "withdrawal",
];

/// Multiplier applied when only one of two titles is such a notice
pub const TITLE_KEYWORD_PENALTY: f64 = 0.7;

/// Year agreement score; a preprint is expected to precede its article by at most a few years
pub fn year_score(article_year: Option<i32>, candidate_year: Option<i32>) -> f64 {
    let (Some(article), Some(candidate)) = (article_year, candidate_year) else {
        return 0.0;
    };

    match i64::from(article) - i64::from(candidate) {
        d if d < 0 => 0.0,
        0..=2 => 1.0,
        3 => 0.9,
        4 => 0.8,
        _ => 0.0,
    }
}

fn starts_with_erratum_keyword(title_norm: &str) -> bool {
    title_norm
        .split(' ')
        .next()
        .is_some_and(|first| ERRATUM_KEYWORDS.contains(&first))
}

/// Title similarity in [0, 1] for two normalized titles
pub fn title_score(article_title: &str, candidate_title: &str) -> f64 {
    if article_title.is_empty() || candidate_title.is_empty() {
        return 0.0;
    }

    let score = (0.4 * token_set_ratio(article_title, candidate_title)
        + 0.4 * token_sort_ratio(article_title, candidate_title)
        + 0.2 * wratio(article_title, candidate_title))
        / 100.0;

    if starts_with_erratum_keyword(article_title) != starts_with_erratum_keyword(candidate_title) {
        score * TITLE_KEYWORD_PENALTY
    } else {
        score
    }
}

/// Article-side values derived once per record and reused for every candidate
#[derive(Debug, Clone)]
pub struct PreparedArticle<'a> {
    pub record: &'a ArticleRecord,
    pub title: String,
    pub year: Option<i32>,
    pub authors: Vec<NormalizedAuthor>,
}

/// Computes `ScoreBreakdown`s for article/candidate pairs
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: ScoreWeights,
    author_pair_limit: usize,
}

impl ScoringEngine {
    pub fn new(weights: ScoreWeights, author_pair_limit: usize) -> Result<Self, MatchError> {
        weights.validate()?;
        Ok(Self {
            weights,
            author_pair_limit,
        })
    }

    pub fn from_config(config: &MatchConfig) -> Result<Self, MatchError> {
        Self::new(config.weights, config.author_pair_limit)
    }

    pub fn prepare<'a>(&self, article: &'a ArticleRecord) -> PreparedArticle<'a> {
        PreparedArticle {
            record: article,
            title: normalize_text(&article.full_title()),
            year: article.year.filter(|&year| is_plausible_year(year)),
            authors: normalize_authors(&article.authors),
        }
    }

    pub fn score(&self, article: &PreparedArticle<'_>, candidate: &CandidateRecord) -> ScoreBreakdown {
        let year_source = candidate.dates.best_year();
        let candidate_year = year_source.map(|(_, year)| year);
        let candidate_title = normalize_text(&candidate.full_title());
        let candidate_authors = normalize_authors(&candidate.authors);

        let year = year_score(article.year, candidate_year);
        let title = title_score(&article.title, &candidate_title);
        let author = author_score(&article.authors, &candidate_authors, self.author_pair_limit);
        let weighted = self.combine(year, title, author);

        debug!(
            "Scores for {} vs {}: year={:.3} from {} (w={}), title={:.3} (w={}), author={:.3} (w={}) -> {:.4}",
            article.record.label(),
            candidate.doi,
            year,
            year_source.map_or("no date", |(field, _)| field.as_str()),
            self.weights.year,
            title,
            self.weights.title,
            author,
            self.weights.author,
            weighted
        );

        ScoreBreakdown {
            year_score: year,
            title_score: title,
            author_score: author,
            weighted_score: weighted,
        }
    }

    /// Weighted mean of the component scores
    pub fn combine(&self, year: f64, title: f64, author: f64) -> f64 {
        let weighted_sum =
            self.weights.year * year + self.weights.title * title + self.weights.author * author;
        (weighted_sum / self.weights.total()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Author, CandidateDates};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_year_score_table() {
        assert_eq!(year_score(Some(2021), Some(2021)), 1.0);
        assert_eq!(year_score(Some(2021), Some(2019)), 1.0);
        assert_eq!(year_score(Some(2021), Some(2018)), 0.9);
        assert_eq!(year_score(Some(2021), Some(2017)), 0.8);
        assert_eq!(year_score(Some(2021), Some(2016)), 0.0);
        assert_eq!(year_score(Some(2021), Some(2022)), 0.0);
        assert_eq!(year_score(None, Some(2020)), 0.0);
        assert_eq!(year_score(Some(2020), None), 0.0);
    }

    #[test]
    fn test_year_score_extreme_years() {
        assert_eq!(year_score(Some(i32::MAX), Some(-1)), 0.0);
        assert_eq!(year_score(Some(i32::MIN), Some(i32::MAX)), 0.0);
        assert_eq!(year_score(Some(i32::MAX), Some(i32::MAX - 1)), 1.0);
    }

    #[test]
    fn test_year_score_non_increasing_in_gap() {
        let mut previous = f64::INFINITY;
        for gap in 0..10 {
            let score = year_score(Some(2020), Some(2020 - gap));
            assert!(score <= previous, "score rose at gap {}", gap);
            previous = score;
        }
    }

    #[test]
    fn test_title_score_identical_and_empty() {
        assert!(approx(title_score("deep learning for x", "deep learning for x"), 1.0));
        assert_eq!(title_score("", "deep learning for x"), 0.0);
        assert_eq!(title_score("deep learning for x", ""), 0.0);
    }

    #[test]
    fn test_title_score_symmetric() {
        let a = "graph neural networks for molecule property prediction";
        let b = "molecular property prediction with graph networks";
        assert!(approx(title_score(a, b), title_score(b, a)));
    }

    #[test]
    fn test_title_keyword_penalty_is_exactly_point_seven() {
        let notice = "correction deep learning for x";
        let original = "deep learning for x";
        let unpenalized = (0.4 * token_set_ratio(notice, original)
            + 0.4 * token_sort_ratio(notice, original)
            + 0.2 * wratio(notice, original))
            / 100.0;

        assert!(approx(title_score(notice, original), unpenalized * 0.7));
        assert!(approx(title_score(original, notice), unpenalized * 0.7));
    }

    #[test]
    fn test_title_keyword_on_both_sides_not_penalized() {
        let a = "reply to comments on deep learning";
        let b = "reply to comments on deep learning";
        assert!(approx(title_score(a, b), 1.0));
    }

    #[test]
    fn test_engine_rejects_zero_weights() {
        let weights = ScoreWeights {
            year: 0.0,
            title: 0.0,
            author: 0.0,
        };
        assert!(matches!(
            ScoringEngine::new(weights, 625),
            Err(MatchError::Configuration(_))
        ));
    }

    #[test]
    fn test_combine_uses_weighted_mean() {
        let engine = ScoringEngine::from_config(&MatchConfig::default()).unwrap();
        // (0.4 * 1.0 + 2.0 * 0.5 + 0.8 * 0.0) / 3.2
        assert!(approx(engine.combine(1.0, 0.5, 0.0), 1.4 / 3.2));
        assert!(approx(engine.combine(1.0, 1.0, 1.0), 1.0));
    }

    #[test]
    fn test_deep_learning_example_is_accepted() {
        let article = ArticleRecord {
            doi: Some("10.1000/article".to_string()),
            title: "Deep Learning for X".to_string(),
            year: Some(2021),
            authors: vec![Author::new("Smith", Some("J"))],
            ..Default::default()
        };
        let candidate = CandidateRecord {
            doi: "10.1101/preprint".to_string(),
            work_type: "posted-content".to_string(),
            title: "Deep Learning for X".to_string(),
            dates: CandidateDates {
                issued: Some(2020),
                ..CandidateDates::default()
            },
            authors: vec![Author::new("Smith", Some("John"))],
            ..Default::default()
        };

        let engine = ScoringEngine::from_config(&MatchConfig::default()).unwrap();
        let prepared = engine.prepare(&article);
        let breakdown = engine.score(&prepared, &candidate);

        assert_eq!(breakdown.year_score, 1.0);
        assert!(approx(breakdown.title_score, 1.0));
        assert!(approx(breakdown.author_score, 1.0));
        assert!(breakdown.weighted_score >= 0.85);
    }

    #[test]
    fn test_implausible_article_year_is_ignored() {
        let article = ArticleRecord {
            title: "Deep Learning for X".to_string(),
            year: Some(3021),
            ..Default::default()
        };
        let engine = ScoringEngine::from_config(&MatchConfig::default()).unwrap();
        assert_eq!(engine.prepare(&article).year, None);
    }
}
