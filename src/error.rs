//! Error types for mugimugi-image
//!
//! This module provides the error taxonomy for the library:
//! - Transport failures from the HTTP client (timeouts, connection errors)
//! - Non-success HTTP responses from the image server
//! - The aggregated failure raised once an item has used up its retry budget
//! - Configuration and file system errors
//!
//! Every variant maps to an [`ErrorKind`], which is what retry policies match on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ImageId;

/// Result type alias for mugimugi-image operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mugimugi-image
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "parallel")
        key: Option<String>,
    },

    /// Transport-level failure reported by the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The image server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Http {
        /// Status code returned by the server
        status: u16,
        /// Requested URL
        url: String,
    },

    /// An operation gave up waiting
    #[error("timed out: {0}")]
    Timeout(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every attempt allowed by the retry budget failed with a retryable error
    #[error("failed to execute {operation} for {item}: {attempts} attempts failed, last error: {source}")]
    RetriesExhausted {
        /// Name of the operation that was retried
        operation: String,
        /// Debug rendering of the item the operation was applied to
        item: String,
        /// Number of attempts made
        attempts: u32,
        /// Error returned by the final attempt
        #[source]
        source: Box<Error>,
    },

    /// A fetched image has no destination recorded for its id
    #[error("no destination recorded for image {0}")]
    UnmappedImage(ImageId),

    /// A spawned pool task panicked or was cancelled
    #[error("task failed: {0}")]
    Task(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failure category used to decide whether an error may be retried
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request or operation timed out
    Timeout,
    /// Connection could not be established
    Connect,
    /// Any other transport failure
    Network,
    /// Server answered with a non-success status
    HttpStatus,
    /// File system failure
    Io,
    /// Invalid configuration
    Config,
    /// Retry budget already spent
    RetriesExhausted,
    /// Task panicked or was cancelled
    Task,
    /// Anything else
    Other,
}

impl Error {
    /// Classify this error into the category retry policies match on
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(e) if e.is_timeout() => ErrorKind::Timeout,
            Error::Network(e) if e.is_connect() => ErrorKind::Connect,
            Error::Network(_) => ErrorKind::Network,
            Error::Http { .. } => ErrorKind::HttpStatus,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => ErrorKind::Timeout,
            Error::Io(_) => ErrorKind::Io,
            Error::Config { .. } => ErrorKind::Config,
            Error::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
            Error::Task(_) => ErrorKind::Task,
            Error::UnmappedImage(_) | Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Returns true if this error's kind appears in `retry_on`
    ///
    /// An empty list means nothing is retryable.
    pub fn is_retryable_in(&self, retry_on: &[ErrorKind]) -> bool {
        retry_on.contains(&self.kind())
    }

    pub(crate) fn config(message: impl Into<String>, key: &str) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        if e.is_cancelled() {
            Error::Task("task was cancelled".to_string())
        } else {
            Error::Task(format!("task panicked: {e}"))
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_is_its_own_kind() {
        let err = Error::Http {
            status: 503,
            url: "https://img.example/big/0/1.jpg".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::HttpStatus);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn io_timed_out_counts_as_timeout() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow"));
        assert_eq!(err.kind(), ErrorKind::Timeout);

        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn empty_retry_list_retries_nothing() {
        let err = Error::Timeout("slow".to_string());
        assert!(!err.is_retryable_in(&[]));
        assert!(err.is_retryable_in(&[ErrorKind::Connect, ErrorKind::Timeout]));
        assert!(!err.is_retryable_in(&[ErrorKind::HttpStatus]));
    }

    #[test]
    fn retries_exhausted_names_operation_and_item() {
        let err = Error::RetriesExhausted {
            operation: "get_image".to_string(),
            item: "42".to_string(),
            attempts: 2,
            source: Box::new(Error::Timeout("slow".to_string())),
        };
        let msg = err.to_string();
        assert!(msg.contains("get_image"));
        assert!(msg.contains("42"));
        assert!(msg.contains("2 attempts"));
        assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::HttpStatus).unwrap();
        assert_eq!(json, "\"http_status\"");
        let kind: ErrorKind = serde_json::from_str("\"timeout\"").unwrap();
        assert_eq!(kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn panicked_task_becomes_task_error() {
        let handle = tokio::spawn(async { panic!("boom") });
        let join_err = handle.await.unwrap_err();
        let err = Error::from(join_err);
        assert_eq!(err.kind(), ErrorKind::Task);
        assert!(err.to_string().contains("panicked"));
    }
}
