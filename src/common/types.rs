use serde::Serialize;

use crate::matching::normalize::{collapse_whitespace, unescape_entities};

/// Earliest and latest year accepted as a plausible publication year (exclusive bounds)
pub const MIN_PLAUSIBLE_YEAR: i32 = 1800;
pub const MAX_PLAUSIBLE_YEAR: i32 = 2100;

pub fn is_plausible_year(year: i32) -> bool {
    year > MIN_PLAUSIBLE_YEAR && year < MAX_PLAUSIBLE_YEAR
}

/// One contributor as read from the input or a candidate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Author {
    pub family: String,
    pub given: Option<String>,
    pub orcid: Option<String>, // Canonical form, e.g. 0000-0002-1825-0097
}

impl Author {
    pub fn new(family: &str, given: Option<&str>) -> Self {
        Self {
            family: family.to_string(),
            given: given.map(str::to_string),
            orcid: None,
        }
    }

    pub fn with_orcid(mut self, orcid: &str) -> Self {
        self.orcid = Some(orcid.to_string());
        self
    }
}

/// The published article we are looking for a preprint of
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArticleRecord {
    pub doi: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub year: Option<i32>,
    pub authors: Vec<Author>,
}

impl ArticleRecord {
    /// DOI for log messages
    pub fn label(&self) -> &str {
        self.doi.as_deref().unwrap_or("N/A")
    }

    /// Title with the subtitle appended, HTML entities decoded
    pub fn full_title(&self) -> String {
        compose_title(&self.title, self.subtitle.as_deref())
    }
}

/// Date fields a Crossref work may carry a year in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    PublishedOnline,
    PublishedPrint,
    Issued,
    Created,
}

impl DateField {
    /// Fields tried, in order, when looking for a candidate's year
    pub const YEAR_PRIORITY: [DateField; 4] = [
        DateField::PublishedOnline,
        DateField::PublishedPrint,
        DateField::Issued,
        DateField::Created,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::PublishedOnline => "published-online",
            DateField::PublishedPrint => "published-print",
            DateField::Issued => "issued",
            DateField::Created => "created",
        }
    }
}

/// Years found in a candidate's date fields (None when absent or unparseable)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CandidateDates {
    pub published_online: Option<i32>,
    pub published_print: Option<i32>,
    pub issued: Option<i32>,
    pub created: Option<i32>,
}

impl CandidateDates {
    pub fn year_of(&self, field: DateField) -> Option<i32> {
        match field {
            DateField::PublishedOnline => self.published_online,
            DateField::PublishedPrint => self.published_print,
            DateField::Issued => self.issued,
            DateField::Created => self.created,
        }
    }

    /// First plausible year in `DateField::YEAR_PRIORITY` order
    pub fn best_year(&self) -> Option<(DateField, i32)> {
        DateField::YEAR_PRIORITY.iter().find_map(|&field| {
            self.year_of(field)
                .filter(|&year| is_plausible_year(year))
                .map(|year| (field, year))
        })
    }
}

/// One search result returned by Crossref
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateRecord {
    pub doi: String,
    pub work_type: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub dates: CandidateDates,
    pub authors: Vec<Author>,
}

impl CandidateRecord {
    pub fn full_title(&self) -> String {
        compose_title(&self.title, self.subtitle.as_deref())
    }
}

fn compose_title(title: &str, subtitle: Option<&str>) -> String {
    let joined = match subtitle.map(str::trim).filter(|s| !s.is_empty()) {
        Some(sub) if !title.trim().is_empty() => format!("{}: {}", title.trim(), sub),
        _ => title.trim().to_string(),
    };
    collapse_whitespace(&unescape_entities(&joined))
}

/// Component scores for one (article, candidate) pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub year_score: f64,
    pub title_score: f64,
    pub author_score: f64,
    pub weighted_score: f64,
}

/// A candidate together with its scores
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub doi: String,
    pub breakdown: ScoreBreakdown,
}

impl ScoredCandidate {
    pub fn score(&self) -> f64 {
        self.breakdown.weighted_score
    }
}

/// Candidates accepted as matches for one article (possibly none)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchResult {
    pub matches: Vec<ScoredCandidate>, // Highest score first
}

impl MatchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn best(&self) -> Option<&ScoredCandidate> {
        self.matches.first()
    }
}

/// Per-file counts
#[derive(Debug, Clone, Default)]
pub struct FileStats {
    pub total_records: usize,
    pub matched: usize,
    pub no_match: usize,
    pub failed: usize,
    pub skipped: usize,
    pub halted: bool,
}

/// Totals across a batch run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub files_total: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_records: usize,
    pub matched: usize,
    pub no_match: usize,
    pub failed: usize,
    pub skipped: usize,
    pub run_halted: bool,
}

impl RunStats {
    pub fn absorb(&mut self, file: &FileStats) {
        self.total_records += file.total_records;
        self.matched += file.matched;
        self.no_match += file.no_match;
        self.failed += file.failed;
        self.skipped += file.skipped;
    }
}
