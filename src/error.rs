//! Error types for the geocoding SDK
//!
//! Providers add no error kinds of their own: everything a lookup can fail
//! with is produced by the HTTP layer, response decoding or configuration.

use thiserror::Error;

/// Result type alias for search and reverse lookups
pub type Result<T> = std::result::Result<T, SearchError>;

/// HTTP timeout applied when a provider config does not set one
pub const DEFAULT_TIMEOUT_MS: u64 = 15000;

/// Why a geocoding request produced no results
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Transport failure or non-2xx answer from the geocoding API
    #[error("HTTP request failed: {message}")]
    HttpError {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },

    /// Rejected before any request, e.g. coordinates out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider configuration is unusable, e.g. an unparseable endpoint URL
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Response body could not be decoded or is missing required fields
    #[error("Parsing error: {0}")]
    ParseError(String),

    /// No response within the provider's configured timeout
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The API answered 429
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Anything that fits none of the above
    #[error("Search error: {0}")]
    Other(String),
}

impl SearchError {
    /// HTTP status code carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SearchError::HttpError { status_code, .. } => *status_code,
            SearchError::RateLimit(_) => Some(429),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            SearchError::ParseError(format!("JSON parsing failed: {error}"))
        } else if error.is_status() {
            let status_code = error.status().map(|s| s.as_u16());
            let message = error.to_string();

            if let Some(429) = status_code {
                SearchError::RateLimit(message)
            } else {
                SearchError::HttpError {
                    message,
                    status_code,
                    response_body: None,
                }
            }
        } else {
            SearchError::HttpError {
                message: error.to_string(),
                status_code: None,
                response_body: None,
            }
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        SearchError::ParseError(format!("JSON parsing failed: {error}"))
    }
}

impl From<url::ParseError> for SearchError {
    fn from(error: url::ParseError) -> Self {
        SearchError::InvalidInput(format!("Invalid URL: {error}"))
    }
}
