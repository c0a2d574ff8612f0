//! Error types for the membership module.

use inband_core::HashId;
use thiserror::Error;

/// Errors that can occur during membership resolution.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// No founder claim or vote names this band.
    #[error("unknown band: {0}")]
    UnknownBand(HashId),
}

/// Result type for membership operations.
pub type Result<T> = std::result::Result<T, MembershipError>;
