use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Longest error text kept in a log entry
const MAX_ERROR_DETAILS_LEN: usize = 1000;

/// One search as recorded in the candidate log
#[derive(Debug, Serialize)]
pub struct CandidateLogEntry<'a> {
    pub timestamp: String,
    pub input_doi: &'a str,
    pub query: &'a str,
    pub api_status_code: Option<u16>,
    pub retrieved_candidates: &'a [Value],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl<'a> CandidateLogEntry<'a> {
    pub fn new(
        input_doi: &'a str,
        query: &'a str,
        api_status_code: Option<u16>,
        retrieved_candidates: &'a [Value],
        error_details: Option<&str>,
    ) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            input_doi,
            query,
            api_status_code,
            retrieved_candidates,
            error_details: error_details.map(|e| e.chars().take(MAX_ERROR_DETAILS_LEN).collect()),
        }
    }
}

/// Destination for candidate log entries
pub trait CandidateSink: Send + Sync {
    fn record(&self, entry: &CandidateLogEntry<'_>) -> Result<()>;
}

/// Appends entries as JSON lines to a file
pub struct JsonlCandidateLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlCandidateLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open candidate log: {}", path.display()))?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CandidateSink for JsonlCandidateLog {
    fn record(&self, entry: &CandidateLogEntry<'_>) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow!("Candidate log writer lock poisoned"))?;
        serde_json::to_writer(&mut *writer, entry)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
