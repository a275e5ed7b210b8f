use anyhow::{Context, Result};
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::error::MatchError;

use super::candidate_log::{CandidateLogEntry, CandidateSink};

pub const DEFAULT_BASE_URL: &str = "https://api.crossref.org";
pub const DEFAULT_USER_AGENT: &str = concat!("preprint-matching/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_ROWS: usize = 25;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.5;

/// Upper bound on a single exponential backoff wait
const MAX_BACKOFF_SECS: f64 = 120.0;
/// Upper bound on a server-requested Retry-After wait
const MAX_RETRY_AFTER_SECS: u64 = 60;
/// Response text kept in error messages
const MAX_ERROR_BODY_LEN: usize = 300;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub mailto: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub rows: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            mailto: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            rows: DEFAULT_ROWS,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.base_url.trim().is_empty() {
            return Err(MatchError::Configuration("base_url must not be empty".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(MatchError::Configuration("user_agent must not be empty".to_string()));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(MatchError::Configuration(format!(
                "backoff_factor must be a non-negative number, got {}",
                self.backoff_factor
            )));
        }
        if self.rows == 0 {
            return Err(MatchError::Configuration("rows must be greater than zero".to_string()));
        }
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(MatchError::Configuration("timeouts must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Wait before retry number `retry` (1-based): `factor * 2^(retry - 1)` seconds, capped
pub fn backoff_delay(backoff_factor: f64, retry: u32) -> Duration {
    let exponent = retry.saturating_sub(1).min(31) as i32;
    let secs = (backoff_factor * 2f64.powi(exponent)).min(MAX_BACKOFF_SECS);
    Duration::from_secs_f64(secs.max(0.0))
}

/// Numeric `Retry-After` header in seconds, capped
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS)))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// `message.items` of a Crossref list response
fn parse_items(body: &str) -> Result<Vec<Value>, String> {
    let mut value: Value = serde_json::from_str(body)
        .map_err(|e| format!("response is not valid JSON: {}", e))?;
    match value
        .get_mut("message")
        .and_then(|message| message.get_mut("items"))
        .map(Value::take)
    {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err("'message.items' is not a list".to_string()),
        None => Err(format!(
            "response has no 'message.items': {}",
            truncate(body, MAX_ERROR_BODY_LEN)
        )),
    }
}

enum Attempt {
    Done { status: u16, items: Vec<Value> },
    Retry {
        status: Option<u16>,
        error: String,
        wait_hint: Option<Duration>,
    },
    Fatal { status: u16, error: MatchError },
}

/// Crossref `/works` search client with retries and backoff
pub struct CrossrefClient {
    client: Client,
    config: ClientConfig,
    candidate_log: Option<Arc<dyn CandidateSink>>,
}

impl CrossrefClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            config,
            candidate_log: None,
        })
    }

    pub fn with_candidate_log(mut self, sink: Arc<dyn CandidateSink>) -> Self {
        self.candidate_log = Some(sink);
        self
    }

    fn works_url(&self) -> String {
        format!("{}/works", self.config.base_url.trim_end_matches('/'))
    }

    /// Runs one bibliographic search, retrying transient failures.
    ///
    /// Returns the raw `message.items` of the response.
    pub async fn search(&self, query: &str, context_doi: &str) -> Result<Vec<Value>, MatchError> {
        let url = self.works_url();
        let total_attempts = self.config.max_retries.saturating_add(1);
        let mut last_status = None;
        let mut last_error = String::new();

        for attempt in 1..=total_attempts {
            match self.attempt(&url, query).await {
                Attempt::Done { status, items } => {
                    debug!("Retrieved {} raw candidates for {}", items.len(), context_doi);
                    self.log_candidates(context_doi, query, Some(status), &items, None);
                    return Ok(items);
                }
                Attempt::Fatal { status, error } => {
                    warn!("Crossref search for {} failed: {}", context_doi, error);
                    self.log_candidates(context_doi, query, Some(status), &[], Some(&error.to_string()));
                    return Err(error);
                }
                Attempt::Retry {
                    status,
                    error,
                    wait_hint,
                } => {
                    if attempt < total_attempts {
                        let mut delay = backoff_delay(self.config.backoff_factor, attempt);
                        if let Some(hint) = wait_hint {
                            delay = delay.max(hint);
                        }
                        warn!(
                            "Crossref search for {} failed (attempt {}/{}): {}. Retrying in {:.1}s",
                            context_doi,
                            attempt,
                            total_attempts,
                            error,
                            delay.as_secs_f64()
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_status = status;
                    last_error = error;
                }
            }
        }

        error!(
            "Crossref search for {} failed after {} attempts: {}",
            context_doi, total_attempts, last_error
        );
        self.log_candidates(context_doi, query, last_status, &[], Some(&last_error));
        Err(MatchError::TransientApi {
            attempts: total_attempts,
            last_error,
        })
    }

    async fn attempt(&self, url: &str, query: &str) -> Attempt {
        let rows = self.config.rows.to_string();
        let mut params: Vec<(&str, &str)> = vec![("query.bibliographic", query), ("rows", rows.as_str())];
        if !self.config.mailto.is_empty() {
            params.push(("mailto", self.config.mailto.as_str()));
        }

        let response = match self.client.get(url).query(&params).send().await {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Retry {
                    status: None,
                    error: format!("request error: {}", e),
                    wait_hint: None,
                }
            }
        };

        let status = response.status();
        let code = status.as_u16();

        if status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    return Attempt::Retry {
                        status: Some(code),
                        error: format!("failed to read response body: {}", e),
                        wait_hint: None,
                    }
                }
            };
            return match parse_items(&body) {
                Ok(items) => Attempt::Done { status: code, items },
                Err(message) => Attempt::Fatal {
                    status: code,
                    error: MatchError::NonRetriableApi {
                        status: code,
                        message,
                    },
                },
            };
        }

        let wait_hint = if status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::SERVICE_UNAVAILABLE
        {
            retry_after(response.headers())
        } else {
            None
        };
        let body = response.text().await.unwrap_or_default();
        let message = truncate(body.trim(), MAX_ERROR_BODY_LEN);

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Attempt::Retry {
                status: Some(code),
                error: format!("HTTP {}: {}", code, message),
                wait_hint,
            }
        } else {
            Attempt::Fatal {
                status: code,
                error: MatchError::NonRetriableApi {
                    status: code,
                    message,
                },
            }
        }
    }

    fn log_candidates(
        &self,
        context_doi: &str,
        query: &str,
        status: Option<u16>,
        items: &[Value],
        error_details: Option<&str>,
    ) {
        if let Some(sink) = &self.candidate_log {
            let entry = CandidateLogEntry::new(context_doi, query, status, items, error_details);
            if let Err(e) = sink.record(&entry) {
                error!("Failed to write candidate log entry for {}: {}", context_doi, e);
            }
        }
    }
}
