//! Error types for the Inband core.

use thiserror::Error;

use crate::types::HashId;

/// Errors raised by the signature engine and key handling.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("signing key does not match the key held by statement {0}")]
    KeyMismatch(HashId),
}

/// Reasons a single claim or statement is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("statement {0} is not known")]
    MissingStatement(HashId),

    #[error("statement {0} does not hold a public key")]
    NotAKey(HashId),

    #[error("signature verification failed")]
    SignatureFailed,

    #[error("claim id mismatch: stored {stored}, computed {computed}")]
    IdMismatch { stored: HashId, computed: HashId },

    #[error("statement hash mismatch: stored {stored}, computed {computed}")]
    StatementHashMismatch { stored: HashId, computed: HashId },

    #[error("claim {0} differs from the stored claim with the same id")]
    IdConflict(HashId),
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::KeyMismatch(id) => ValidationError::NotAKey(id),
            CoreError::UnsupportedAlgorithm(_)
            | CoreError::InvalidPublicKey(_)
            | CoreError::InvalidPrivateKey(_)
            | CoreError::SigningFailed(_)
            | CoreError::InvalidSignature => ValidationError::SignatureFailed,
        }
    }
}
