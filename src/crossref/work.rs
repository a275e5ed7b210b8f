use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::common::{Author, ArticleRecord, CandidateDates, CandidateRecord};
use crate::error::MatchError;
use crate::matching::normalize::normalize_orcid;

/// Crossref fields that are usually arrays but occasionally plain strings
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(untagged)]
pub enum TextField {
    Many(Vec<String>),
    One(String),
    #[default]
    Missing,
}

impl TextField {
    pub fn first(&self) -> Option<&str> {
        match self {
            TextField::Many(values) => values.iter().map(|v| v.trim()).find(|v| !v.is_empty()),
            TextField::One(value) => Some(value.trim()).filter(|v| !v.is_empty()),
            TextField::Missing => None,
        }
    }
}

/// `{"date-parts": [[2020, 1, 31]]}`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DateParts {
    #[serde(rename = "date-parts", default)]
    pub date_parts: Vec<Vec<Value>>,
}

impl DateParts {
    /// First element of the first date part, as a number or numeric string
    pub fn year(&self) -> Option<i32> {
        let first = self.date_parts.first()?.first()?;
        match first {
            Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WorkAuthor {
    #[serde(default)]
    pub given: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "ORCID", default)]
    pub orcid: Option<String>,
}

impl WorkAuthor {
    /// Converts to an `Author`; organizations (only `name` set) yield None
    pub fn to_author(&self) -> Option<Author> {
        let given = self.given.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let family = self.family.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let name = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty());

        if self.given.is_none() && self.family.is_none() && name.is_some() {
            return None;
        }

        let (family, given) = match (family, name) {
            (Some(family), _) => (family.to_string(), given.map(str::to_string)),
            (None, Some(name)) => {
                let (split_family, split_given) = split_name(name);
                (split_family, given.map(str::to_string).or(split_given))
            }
            (None, None) => (String::new(), given.map(str::to_string)),
        };

        let orcid = self.orcid.as_deref().and_then(normalize_orcid);

        if family.is_empty() && given.is_none() && orcid.is_none() {
            return None;
        }

        Some(Author { family, given, orcid })
    }
}

/// "Family, Given" or "Given Names Family"
fn split_name(name: &str) -> (String, Option<String>) {
    if let Some((family, given)) = name.split_once(',') {
        let given = given.trim();
        return (
            family.trim().to_string(),
            Some(given.to_string()).filter(|g| !g.is_empty()),
        );
    }

    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.split_last() {
        Some((family, rest)) if !rest.is_empty() => (family.to_string(), Some(rest.join(" "))),
        Some((family, _)) => (family.to_string(), None),
        None => (String::new(), None),
    }
}

/// The subset of a Crossref work used for matching
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Work {
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,
    #[serde(rename = "type", default)]
    pub work_type: Option<String>,
    #[serde(default)]
    pub title: TextField,
    #[serde(default)]
    pub subtitle: TextField,
    #[serde(default)]
    pub author: Vec<WorkAuthor>,
    #[serde(rename = "published-online", default)]
    pub published_online: Option<DateParts>,
    #[serde(rename = "published-print", default)]
    pub published_print: Option<DateParts>,
    #[serde(default)]
    pub issued: Option<DateParts>,
    #[serde(default)]
    pub created: Option<DateParts>,
}

impl Work {
    fn authors(&self) -> Vec<Author> {
        let authors: Vec<Author> = self.author.iter().filter_map(WorkAuthor::to_author).collect();
        if authors.len() < self.author.len() {
            debug!(
                "Skipped {} organizational or empty authors for {}",
                self.author.len() - authors.len(),
                self.doi.as_deref().unwrap_or("N/A")
            );
        }
        authors
    }

    fn year_of(dates: &Option<DateParts>) -> Option<i32> {
        dates.as_ref().and_then(DateParts::year)
    }

    /// Article side: the year comes from `issued`
    pub fn into_article(self) -> ArticleRecord {
        ArticleRecord {
            doi: self.doi.as_deref().map(str::trim).filter(|d| !d.is_empty()).map(str::to_string),
            title: self.title.first().unwrap_or_default().to_string(),
            subtitle: self.subtitle.first().map(str::to_string),
            year: Self::year_of(&self.issued),
            authors: self.authors(),
        }
    }

    /// Candidate side; works without a DOI cannot be reported and yield None
    pub fn into_candidate(self) -> Option<CandidateRecord> {
        let doi = self.doi.as_deref().map(str::trim).filter(|d| !d.is_empty())?.to_string();
        Some(CandidateRecord {
            work_type: self.work_type.clone().unwrap_or_default(),
            title: self.title.first().unwrap_or_default().to_string(),
            subtitle: self.subtitle.first().map(str::to_string),
            dates: CandidateDates {
                published_online: Self::year_of(&self.published_online),
                published_print: Self::year_of(&self.published_print),
                issued: Self::year_of(&self.issued),
                created: Self::year_of(&self.created),
            },
            authors: self.authors(),
            doi,
        })
    }
}

/// Parses an input record given either as a JSON string or as an inline object
pub fn article_from_value(input: &Value) -> Result<ArticleRecord, MatchError> {
    let work: Work = match input {
        Value::String(raw) => serde_json::from_str(raw)
            .map_err(|e| MatchError::InvalidRecord(format!("input is not valid JSON: {}", e)))?,
        Value::Object(_) => serde_json::from_value(input.clone())
            .map_err(|e| MatchError::InvalidRecord(format!("unexpected work structure: {}", e)))?,
        other => {
            return Err(MatchError::InvalidRecord(format!(
                "expected a JSON object or string, found {}",
                json_type_name(other)
            )))
        }
    };
    Ok(work.into_article())
}

/// Converts raw search results, dropping items that are not usable works
pub fn candidates_from_items(items: Vec<Value>, context_doi: &str) -> Vec<CandidateRecord> {
    let total = items.len();
    let candidates: Vec<CandidateRecord> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Work>(item).ok())
        .filter_map(Work::into_candidate)
        .collect();
    if candidates.len() < total {
        debug!(
            "Dropped {} malformed candidates for {}",
            total - candidates.len(),
            context_doi
        );
    }
    candidates
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
