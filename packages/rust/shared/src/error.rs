//! Error types for Inspectors.
//!
//! Library crates use [`InspectorError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Inspectors operations.
#[derive(Debug, thiserror::Error)]
pub enum InspectorError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while downloading a report.
    #[error("network error: {0}")]
    Network(String),

    /// Text extraction error (PDF or HTML).
    #[error("extraction error: {0}")]
    Extraction(String),

    /// JSON or record parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Generic data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A report record failed validation. Fatal for that record.
    #[error("[{report_type}][{published_on}][{report_id}] Invalid report: {reason}\n\n{record}")]
    InvalidReport {
        report_type: String,
        published_on: String,
        report_id: String,
        reason: String,
        /// The full record as received (after inference), rendered as JSON.
        record: String,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InspectorError>;

impl InspectorError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from record validation.
    pub fn is_invalid_report(&self) -> bool {
        matches!(self, Self::InvalidReport { .. })
    }
}
