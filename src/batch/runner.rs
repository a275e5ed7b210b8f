use anyhow::{Context, Result};
use log::{error, info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::common::{
    create_count_progress_bar, create_hidden_progress_bar, format_elapsed, output_path_for,
    write_results, FileStats, OutputFormat, OutputRecord, RecordStatus, RunStats,
};
use crate::crossref::CandidateSource;
use crate::error::MatchError;
use crate::matching::PreprintMatcher;

use super::governor::{FailureGovernor, GovernorConfig};
use super::input::{item_doi, load_items, output_stems, parse_item};

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub show_progress: bool,
}

/// Processes input files one record at a time, in order, under a `FailureGovernor`
pub struct BatchRunner<S> {
    matcher: PreprintMatcher<S>,
    governor: FailureGovernor,
    config: RunnerConfig,
}

impl<S: CandidateSource> BatchRunner<S> {
    pub fn new(matcher: PreprintMatcher<S>, governor: GovernorConfig, config: RunnerConfig) -> Self {
        Self {
            matcher,
            governor: FailureGovernor::new(governor),
            config,
        }
    }

    pub async fn run(&mut self, files: &[PathBuf]) -> Result<RunStats> {
        fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.config.output_dir.display()
            )
        })?;

        let mut stats = RunStats {
            files_total: files.len(),
            ..Default::default()
        };

        let stems = output_stems(files);
        for (i, (path, stem)) in files.iter().zip(&stems).enumerate() {
            if self.governor.run_halted() {
                warn!(
                    "Run halted, {} remaining file(s) not processed",
                    files.len() - i
                );
                break;
            }

            info!("Processing file {}/{}: {}", i + 1, files.len(), path.display());
            let (file_stats, failed) = self.process_file(path, stem).await;
            stats.files_processed += 1;
            if failed {
                stats.files_failed += 1;
            }
            stats.absorb(&file_stats);
        }

        stats.run_halted = self.governor.run_halted();
        Ok(stats)
    }

    /// Returns the file's counts and whether it counted as a failed file
    async fn process_file(&mut self, path: &Path, stem: &str) -> (FileStats, bool) {
        let start = Instant::now();
        self.governor.begin_file();

        let items = match load_items(path) {
            Ok(items) => items,
            Err(e) => {
                error!("Could not load {}: {:#}", path.display(), e);
                let failed = self.governor.finish_file(true);
                return (FileStats::default(), failed);
            }
        };
        if items.is_empty() {
            warn!("No items found in input file: {}", path.display());
        }

        let pb = if self.config.show_progress {
            create_count_progress_bar(items.len() as u64, stem)
        } else {
            create_hidden_progress_bar(items.len() as u64)
        };

        let mut stats = FileStats {
            total_records: items.len(),
            ..Default::default()
        };
        let mut records = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            if self.governor.file_halted() {
                records.push(OutputRecord::skipped(&item_doi(item).unwrap_or_default()));
                stats.skipped += 1;
                pb.inc(1);
                continue;
            }

            let record = self.process_item(index + 1, item).await;
            match record.status {
                RecordStatus::Matched => stats.matched += 1,
                RecordStatus::NoMatch => stats.no_match += 1,
                _ => stats.failed += 1,
            }
            records.push(record);
            pb.inc(1);
        }
        pb.finish_and_clear();

        stats.halted = self.governor.file_halted();
        if stats.halted {
            warn!(
                "Processing of {} halted after repeated failures; {} record(s) skipped",
                path.display(),
                stats.skipped
            );
        }

        let output_path = output_path_for(&self.config.output_dir, stem, self.config.format);
        let io_failed = match write_results(&output_path, self.config.format, &records) {
            Ok(()) => false,
            Err(e) => {
                error!("{:#}", e);
                true
            }
        };

        info!(
            "Finished {} in {}: {} records, {} matched, {} no match, {} failed, {} skipped -> {}",
            path.display(),
            format_elapsed(start.elapsed()),
            stats.total_records,
            stats.matched,
            stats.no_match,
            stats.failed,
            stats.skipped,
            output_path.display()
        );

        let failed = self.governor.finish_file(io_failed);
        (stats, failed)
    }

    async fn process_item(&mut self, item_number: usize, item: &Value) -> OutputRecord {
        let outcome = match parse_item(item) {
            Ok(article) => {
                let input_doi = article.doi.clone().unwrap_or_default();
                self.matcher
                    .match_record(&article)
                    .await
                    .map(|result| OutputRecord::from_result(&input_doi, &result))
                    .map_err(|e| (input_doi, e))
            }
            Err(e) => Err((item_doi(item).unwrap_or_default(), e)),
        };

        match outcome {
            Ok(record) => {
                self.governor.record_success();
                record
            }
            Err((input_doi, e)) => {
                self.report_failure(item_number, &input_doi, &e);
                self.governor.record_failure();
                OutputRecord::failed(&input_doi, &e)
            }
        }
    }

    fn report_failure(&self, item_number: usize, input_doi: &str, e: &MatchError) {
        let label = if input_doi.is_empty() { "N/A" } else { input_doi };
        warn!(
            "Item {} ({}) failed: {} (consecutive failures: {})",
            item_number,
            label,
            e,
            self.governor.line_failures() + 1
        );
    }
}
