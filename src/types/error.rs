//! Unified Error Type System
//!
//! A single error type for the whole crate, with transiency classification
//! driving the retry decisions in the HTTP client.
//!
//! Collectors never let errors cross their work-item boundary: a failed
//! page scores 0.0 and the failure is logged. `WikiError` therefore mostly
//! travels between the client and the collectors.

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

/// HTTP status codes retried with exponential backoff.
///
/// 403 is included: the Wikimedia edge occasionally answers bursts with
/// 403 instead of 429.
pub const TRANSIENT_STATUS: [u16; 6] = [403, 429, 500, 502, 503, 504];

#[derive(Debug, Error)]
pub enum WikiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// Structured error block returned by the MediaWiki Action API
    #[error("MediaWiki API error [{code}]: {info}")]
    Api { code: String, info: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsed as JSON but did not have the expected shape
    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("invalid date range: {start} is after {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },
}

pub type Result<T> = std::result::Result<T, WikiError>;

impl WikiError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a shape error
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Parse errors count as transient: the retry utility allows them one
    /// extra attempt before treating them as permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => TRANSIENT_STATUS.contains(status),
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } => true,
            Self::Json(_) | Self::Shape(_) => true,
            _ => false,
        }
    }

    /// Parse failures get a single retry, unlike network-level transients
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Json(_) | Self::Shape(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        for status in [403, 429, 500, 502, 503, 504] {
            let err = WikiError::Status {
                status,
                url: "https://fr.wikipedia.org/w/api.php".into(),
            };
            assert!(err.is_transient(), "{status} should be transient");
        }
    }

    #[test]
    fn test_permanent_statuses() {
        for status in [400, 404] {
            let err = WikiError::Status {
                status,
                url: "https://fr.wikipedia.org/w/api.php".into(),
            };
            assert!(!err.is_transient(), "{status} should be permanent");
        }
    }

    #[test]
    fn test_api_error_is_permanent() {
        let err = WikiError::Api {
            code: "missingtitle".into(),
            info: "The page you specified doesn't exist.".into(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_shape_error_is_parse() {
        let err = WikiError::shape("no query object");
        assert!(err.is_transient());
        assert!(err.is_parse());
    }

    #[test]
    fn test_timeout_display() {
        let err = WikiError::timeout("pageviews fetch", Duration::from_secs(20));
        assert!(err.to_string().contains("pageviews fetch"));
    }
}
