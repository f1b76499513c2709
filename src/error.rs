//! Unified error types for the master data store.
//!
//! This module provides a clean error type that wraps provider errors
//! and presents a consistent interface to users.
//!
//! Registry mutations (`insert`/`update`) do not surface provider failures
//! through this type: they report them as `Ok(false)` and log. Everything
//! else propagates.

use masterdata_core::StoreError;
use thiserror::Error;

/// All master data errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider-level failure (connectivity, constraint violation, I/O)
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Caller-supplied entity is missing required fields
    #[error("validation error: {0}")]
    Validation(String),

    /// A bulk reconciliation was aborted; nothing from it was committed
    #[error("reconciliation aborted after {processed} candidates: {source}")]
    BatchAborted {
        /// Candidates staged before the failure
        processed: usize,
        /// Underlying provider error
        #[source]
        source: StoreError,
    },

    /// An import row could not be parsed
    #[error("import error at line {line}: {message}")]
    Import {
        /// 1-based line number in the input
        line: usize,
        /// What was wrong with it
        message: String,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error outside the provider (reading import files, config)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for master data operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Conflicts detected at commit time may succeed on retry with fresh data.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Persistence(e) | Error::BatchAborted { source: e, .. } => e.is_conflict(),
            _ => false,
        }
    }

    /// Check if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// The provider error behind this error, if any
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Error::Persistence(e) | Error::BatchAborted { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Import {
            line: e.line(),
            message: e.to_string(),
        }
    }
}
