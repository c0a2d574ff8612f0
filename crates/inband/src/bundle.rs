//! Claim bundles: statements and claims exchanged out of band.
//!
//! A bundle carries no trust. Every statement hash and claim signature in
//! it is checked again when the bundle is ingested.

use inband_core::{Claim, Statement};
use inband_store::Rejection;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Statements and the claims that reference them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimBundle {
    pub statements: Vec<Statement>,
    pub claims: Vec<Claim>,
}

impl ClaimBundle {
    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.claims.is_empty()
    }
}

/// Outcome of ingesting a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Statements not previously known.
    pub statements: usize,
    /// Claims that became authoritative for a new tuple.
    pub accepted: usize,
    /// Claims that replaced an authoritative claim.
    pub superseded: usize,
    /// Claims kept for audit behind a higher-ranked claim.
    pub outranked: usize,
    /// Claims already held.
    pub duplicates: usize,
    /// Statements and claims that failed verification.
    pub rejected: Vec<Rejection>,
}

impl IngestReport {
    /// Whether nothing was rejected.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}
