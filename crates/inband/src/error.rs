//! Error types for the engine.

use inband_core::{CoreError, HashId, ValidationError};
use inband_membership::MembershipError;
use inband_store::StoreError;
use thiserror::Error;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum InbandError {
    /// Key files missing, unreadable, malformed, or mismatched.
    #[error("key load error: {0}")]
    KeyLoad(String),

    /// Signing or key handling failed.
    #[error("signature error: {0}")]
    Signature(#[from] CoreError),

    /// Store file present or absent contrary to the init/force flags.
    #[error("store state error: {0}")]
    StoreState(String),

    /// Malformed persisted record.
    #[error("decode error at line {line}: {reason}")]
    Decode { line: usize, reason: String },

    /// A claim or statement failed verification.
    #[error(
        "integrity error{}: {source}",
        .id.map(|id| format!(" in {id}")).unwrap_or_default()
    )]
    Integrity {
        id: Option<HashId>,
        #[source]
        source: ValidationError,
    },

    /// A persisted anchor (private key, identity, name) is absent or dangling.
    #[error("integrity error: {0}")]
    MissingAnchor(String),

    /// Lookup miss.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Bundle (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for InbandError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Decode { line, reason } => InbandError::Decode { line, reason },
            StoreError::Integrity { id, source } => InbandError::Integrity {
                id: Some(id),
                source,
            },
            StoreError::MissingAnchor(msg) => InbandError::MissingAnchor(msg),
            StoreError::NotFound(msg) => InbandError::NotFound(msg),
            StoreError::Signature(e) => InbandError::Signature(e),
            StoreError::Io(e) => InbandError::Io(e),
        }
    }
}

impl From<ValidationError> for InbandError {
    fn from(source: ValidationError) -> Self {
        let id = match &source {
            ValidationError::MissingStatement(id)
            | ValidationError::NotAKey(id)
            | ValidationError::IdConflict(id) => Some(*id),
            ValidationError::IdMismatch { stored, .. }
            | ValidationError::StatementHashMismatch { stored, .. } => Some(*stored),
            ValidationError::SignatureFailed => None,
        };
        InbandError::Integrity { id, source }
    }
}

impl From<MembershipError> for InbandError {
    fn from(e: MembershipError) -> Self {
        match e {
            MembershipError::UnknownBand(band) => {
                InbandError::NotFound(format!("band {band}"))
            }
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, InbandError>;
