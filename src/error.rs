use thiserror::Error;

/// Failure kinds of the matching engine.
///
/// Every variant except `Configuration` is a per-record failure: the record is
/// reported as failed and counted by the governor, and the batch moves on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// The record has neither a title nor any author family name to query with
    #[error("record has no usable title or author names to build a query from")]
    EmptyQuery,

    /// The input item could not be turned into an article record
    #[error("invalid input record: {0}")]
    InvalidRecord(String),

    /// Network errors, 429 or 5xx responses that outlived the retry budget
    #[error("Crossref API still failing after {attempts} attempt(s): {last_error}")]
    TransientApi { attempts: u32, last_error: String },

    /// 4xx other than 429, or a response that could not be understood
    #[error("Crossref API returned status {status}: {message}")]
    NonRetriableApi { status: u16, message: String },

    /// Invalid settings; fatal before any record is processed
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MatchError {
    /// Short machine-friendly label used in output files
    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::EmptyQuery => "empty_query",
            MatchError::InvalidRecord(_) => "invalid_record",
            MatchError::TransientApi { .. } => "transient_api",
            MatchError::NonRetriableApi { .. } => "non_retriable_api",
            MatchError::Configuration(_) => "configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MatchError::TransientApi {
            attempts: 4,
            last_error: "HTTP 503".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Crossref API still failing after 4 attempt(s): HTTP 503"
        );

        let err = MatchError::NonRetriableApi {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "Crossref API returned status 404: not found");
    }

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(MatchError::EmptyQuery.kind(), "empty_query");
        assert_eq!(
            MatchError::Configuration("x".to_string()).kind(),
            "configuration"
        );
        assert_eq!(
            MatchError::NonRetriableApi {
                status: 400,
                message: String::new()
            }
            .kind(),
            "non_retriable_api"
        );
    }
}
