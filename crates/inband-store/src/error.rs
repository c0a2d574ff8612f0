//! Error types for the store module.

use inband_core::{CoreError, HashId, ValidationError};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed persisted text.
    #[error("decode error at line {line}: {reason}")]
    Decode { line: usize, reason: String },

    /// A claim or statement failed verification.
    #[error("integrity error in {id}: {source}")]
    Integrity {
        id: HashId,
        #[source]
        source: ValidationError,
    },

    /// An identity or name anchor does not resolve.
    #[error("missing anchor: {0}")]
    MissingAnchor(String),

    /// Lookup miss.
    #[error("not found: {0}")]
    NotFound(String),

    /// Signature engine failure.
    #[error("signature error: {0}")]
    Signature(#[from] CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn decode(line: usize, reason: impl Into<String>) -> Self {
        StoreError::Decode {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
