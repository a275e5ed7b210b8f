use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::types::MatchResult;
use crate::error::MatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// `<dir>/<stem>.output.<ext>`
pub fn output_path_for(output_dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("{}.output.{}", stem, format.extension()))
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Matched,
    NoMatch,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub doi: String,
    pub confidence: f64,
    pub year_score: f64,
    pub title_score: f64,
    pub author_score: f64,
}

/// One line of a result file; every input record produces exactly one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub input_doi: String,
    pub matched_doi: String,
    pub confidence: Option<f64>,
    pub status: RecordStatus,
    pub matches: Vec<MatchSummary>,
    pub error: Option<String>,
}

impl OutputRecord {
    pub fn from_result(input_doi: &str, result: &MatchResult) -> Self {
        let matches: Vec<MatchSummary> = result
            .matches
            .iter()
            .map(|m| MatchSummary {
                doi: m.doi.clone(),
                confidence: round4(m.score()),
                year_score: round4(m.breakdown.year_score),
                title_score: round4(m.breakdown.title_score),
                author_score: round4(m.breakdown.author_score),
            })
            .collect();

        match matches.first() {
            Some(best) => Self {
                input_doi: input_doi.to_string(),
                matched_doi: best.doi.clone(),
                confidence: Some(best.confidence),
                status: RecordStatus::Matched,
                matches,
                error: None,
            },
            None => Self::bare(input_doi, RecordStatus::NoMatch, None),
        }
    }

    pub fn failed(input_doi: &str, error: &MatchError) -> Self {
        Self::bare(
            input_doi,
            RecordStatus::Failed,
            Some(format!("{}: {}", error.kind(), error)),
        )
    }

    pub fn skipped(input_doi: &str) -> Self {
        Self::bare(input_doi, RecordStatus::Skipped, None)
    }

    fn bare(input_doi: &str, status: RecordStatus, error: Option<String>) -> Self {
        Self {
            input_doi: input_doi.to_string(),
            matched_doi: String::new(),
            confidence: None,
            status,
            matches: Vec::new(),
            error,
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    input_doi: &'a str,
    matched_doi: &'a str,
    confidence: String,
    status: RecordStatus,
    error: &'a str,
}

impl<'a> From<&'a OutputRecord> for CsvRow<'a> {
    fn from(record: &'a OutputRecord) -> Self {
        Self {
            input_doi: &record.input_doi,
            matched_doi: &record.matched_doi,
            confidence: record
                .confidence
                .map(|c| format!("{:.4}", c))
                .unwrap_or_default(),
            status: record.status,
            error: record.error.as_deref().unwrap_or(""),
        }
    }
}

/// Writes all records of one input file in the chosen format
pub fn write_results(path: &Path, format: OutputFormat, records: &[OutputRecord]) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, records)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            for record in records {
                writer
                    .serialize(CsvRow::from(record))
                    .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
