use clap::{Parser, Subcommand};
use std::path::PathBuf;

use preprint_matching::common::OutputFormat;

#[derive(Parser)]
#[command(name = "preprint-matching")]
#[command(about = "Match published articles to their preprints using the Crossref REST API")]
#[command(version = "1.0.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search Crossref for preprints of every article in the input files
    Match(MatchArgs),

    /// Print the bibliographic query built for each input record without calling the API
    Query(QueryArgs),
}

#[derive(Parser, Clone)]
pub struct MatchArgs {
    /// Input JSON files (optionally .gz) or directories containing them
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Output directory, created if missing
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: OutputFormat,

    /// Contact email sent to Crossref with every request
    #[arg(short, long)]
    pub mailto: String,

    /// User-Agent header for Crossref requests
    #[arg(short, long)]
    pub user_agent: String,

    /// Logging level (DEBUG, INFO, WARN, ERROR, NONE)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,

    /// Write log lines to this file (truncated) instead of stdout
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Append raw Crossref search results to the candidate log
    #[arg(long, default_value = "false")]
    pub log_candidates: bool,

    /// Candidate log file (JSON lines, appended)
    #[arg(long, default_value = "crossref_candidates.log")]
    pub candidate_log_file: PathBuf,

    /// Minimum weighted score for a match
    #[arg(long, default_value = "0.85")]
    pub min_score: f64,

    /// Maximum score gap to the best candidate for additional matches
    #[arg(long, default_value = "0.03")]
    pub max_score_diff: f64,

    /// Weight of the year score
    #[arg(long, default_value = "0.4")]
    pub weight_year: f64,

    /// Weight of the title score
    #[arg(long, default_value = "2.0")]
    pub weight_title: f64,

    /// Weight of the author score
    #[arg(long, default_value = "0.8")]
    pub weight_author: f64,

    /// Maximum query length in characters
    #[arg(long, default_value = "5000")]
    pub max_query_len: usize,

    /// Author pair count above which only family names are compared
    #[arg(long, default_value = "625")]
    pub author_pair_limit: usize,

    /// Candidates requested per search
    #[arg(long, default_value = "25")]
    pub rows: usize,

    /// Connect and read timeouts in seconds
    #[arg(long, num_args = 2, value_names = ["CONNECT", "READ"], default_values_t = [10.0, 30.0])]
    pub timeout: Vec<f64>,

    /// Retries after the first attempt for transient API failures
    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    /// Exponential backoff factor in seconds
    #[arg(long, default_value = "0.5")]
    pub backoff_factor: f64,

    /// Consecutive record failures that halt the current file (0 disables)
    #[arg(long, default_value = "10")]
    pub max_consecutive_line_failures: u32,

    /// Consecutive failed files that halt the run (0 disables)
    #[arg(long, default_value = "3")]
    pub max_consecutive_file_failures: u32,

    /// Crossref API base URL
    #[arg(long, default_value = "https://api.crossref.org")]
    pub base_url: String,

    /// Disable progress bars
    #[arg(long, default_value = "false")]
    pub no_progress: bool,
}

#[derive(Parser, Clone)]
pub struct QueryArgs {
    /// Input JSON files (optionally .gz) or directories containing them
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Maximum query length in characters
    #[arg(long, default_value = "5000")]
    pub max_query_len: usize,

    /// Logging level (DEBUG, INFO, WARN, ERROR, NONE); log lines share stdout with the queries
    #[arg(short, long, default_value = "ERROR")]
    pub log_level: String,

    /// Write log lines to this file (truncated) instead of stdout
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
