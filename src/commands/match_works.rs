use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use preprint_matching::batch::{collect_input_files, BatchRunner, GovernorConfig, RunnerConfig};
use preprint_matching::common::{format_elapsed, setup_logging, RunStats};
use preprint_matching::crossref::{ClientConfig, CrossrefClient, JsonlCandidateLog};
use preprint_matching::error::MatchError;
use preprint_matching::matching::{MatchConfig, PreprintMatcher, ScoreWeights};

use crate::cli::MatchArgs;

fn match_config(args: &MatchArgs) -> Result<MatchConfig, MatchError> {
    let config = MatchConfig {
        min_score: args.min_score,
        max_score_diff: args.max_score_diff,
        weights: ScoreWeights {
            year: args.weight_year,
            title: args.weight_title,
            author: args.weight_author,
        },
        max_query_len: args.max_query_len,
        author_pair_limit: args.author_pair_limit,
    };
    config.validate()?;
    Ok(config)
}

fn timeout(secs: f64, name: &str) -> Result<Duration, MatchError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| MatchError::Configuration(format!("invalid {} timeout: {}", name, secs)))
}

fn client_config(args: &MatchArgs) -> Result<ClientConfig, MatchError> {
    let (connect, read) = match args.timeout.as_slice() {
        [connect, read] => (*connect, *read),
        other => {
            return Err(MatchError::Configuration(format!(
                "--timeout expects CONNECT and READ, got {} value(s)",
                other.len()
            )))
        }
    };

    let config = ClientConfig {
        base_url: args.base_url.clone(),
        mailto: args.mailto.clone(),
        user_agent: args.user_agent.clone(),
        connect_timeout: timeout(connect, "connect")?,
        read_timeout: timeout(read, "read")?,
        max_retries: args.max_retries,
        backoff_factor: args.backoff_factor,
        rows: args.rows,
    };
    config.validate()?;
    Ok(config)
}

pub async fn run_match_async(args: MatchArgs) -> Result<RunStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level, args.log_file.as_deref())?;

    info!("Starting preprint matching");
    info!("Inputs: {:?}", args.input);
    info!("Output: {} ({:?})", args.output.display(), args.format);
    info!(
        "Scoring: min_score={}, max_score_diff={}, weights year/title/author={}/{}/{}",
        args.min_score, args.max_score_diff, args.weight_year, args.weight_title, args.weight_author
    );
    info!(
        "API: {} rows={}, timeout={:?}, max_retries={}, backoff_factor={}",
        args.base_url, args.rows, args.timeout, args.max_retries, args.backoff_factor
    );

    let match_config = match_config(&args)?;
    let mut client = CrossrefClient::new(client_config(&args)?)?;
    if args.log_candidates {
        let sink = JsonlCandidateLog::open(&args.candidate_log_file)?;
        info!("Logging raw candidates to: {}", sink.path().display());
        client = client.with_candidate_log(Arc::new(sink));
    }
    let matcher = PreprintMatcher::new(client, &match_config)?;

    let files = collect_input_files(&args.input).context("Failed to collect input files")?;
    if files.is_empty() {
        warn!("No input files found");
    }

    let governor = GovernorConfig {
        max_consecutive_line_failures: args.max_consecutive_line_failures,
        max_consecutive_file_failures: args.max_consecutive_file_failures,
    };
    if governor.max_consecutive_file_failures == 0 {
        info!("File-level failure limit disabled");
    }

    let mut runner = BatchRunner::new(
        matcher,
        governor,
        RunnerConfig {
            output_dir: args.output.clone(),
            format: args.format,
            show_progress: !args.no_progress,
        },
    );
    let stats = runner.run(&files).await?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!(
        "Files: {} processed of {}, {} failed",
        stats.files_processed, stats.files_total, stats.files_failed
    );
    info!("Records: {}", stats.total_records);
    info!("Matched: {}", stats.matched);
    info!("No match: {}", stats.no_match);
    if stats.failed > 0 || stats.skipped > 0 {
        warn!("Failed: {}, skipped: {}", stats.failed, stats.skipped);
    }
    info!("Output directory: {}", args.output.display());
    info!("========================================================");

    if stats.run_halted {
        bail!(
            "Run halted after {} consecutive failed files",
            args.max_consecutive_file_failures
        );
    }

    Ok(stats)
}

pub fn run_match(args: MatchArgs) -> Result<RunStats> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_match_async(args))
}
