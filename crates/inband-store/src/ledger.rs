//! The ledger: statement store and claim store together.
//!
//! Claims enter the claim store only through [`Ledger::accept`], which
//! verifies them against the statements held here. A ledger loaded from a
//! snapshot has its indices built from scratch by replaying every claim.

use inband_core::{
    validate_claim, Claim, ClaimBuilder, CoreError, HashId, KeyLookup, PrivateKey, Statement,
    ValidationError,
};
use tracing::{debug, warn};

use crate::claims::{ClaimStore, InsertResult};
use crate::codec::{RawStatement, Snapshot};
use crate::error::{Result, StoreError};
use crate::statements::StatementStore;

/// A claim or statement excluded during loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The id as written in the snapshot.
    pub id: HashId,
    pub error: ValidationError,
}

/// Outcome of loading a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Claims accepted into the claim store.
    pub accepted: usize,
    /// Records repeating a claim already loaded.
    pub duplicates: usize,
    /// Statements and claims that failed verification, in file order.
    pub rejected: Vec<Rejection>,
}

impl LoadReport {
    /// The first rejection, as an integrity error.
    pub fn first_error(&self) -> Option<StoreError> {
        self.rejected.first().map(|r| StoreError::Integrity {
            id: r.id,
            source: r.error.clone(),
        })
    }
}

/// Statements and claims held by one participant.
pub struct Ledger {
    pub statements: StatementStore,
    pub claims: ClaimStore,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// An empty ledger with the topic labels interned.
    pub fn new() -> Self {
        Self {
            statements: StatementStore::with_topics(),
            claims: ClaimStore::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Claims
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify a claim and insert it.
    ///
    /// A claim whose id is already held is a duplicate only if it is
    /// identical to the stored one; otherwise it is verified and rejected.
    pub fn accept(&mut self, claim: Claim) -> Result<InsertResult> {
        if self.is_duplicate(&claim, true)? {
            return Ok(InsertResult::AlreadyExists);
        }
        validate_claim(&claim, &self.statements).map_err(|source| StoreError::Integrity {
            id: claim.id,
            source,
        })?;
        Ok(self.claims.insert(claim))
    }

    /// Insert a claim without verifying its signature.
    ///
    /// The referenced statements must still be present, and a claim that
    /// reuses a stored id with different content is rejected.
    pub fn accept_unverified(&mut self, claim: Claim) -> Result<InsertResult> {
        if self.is_duplicate(&claim, false)? {
            return Ok(InsertResult::AlreadyExists);
        }
        self.require_statements(&claim)?;
        Ok(self.claims.insert(claim))
    }

    fn is_duplicate(&self, claim: &Claim, verify: bool) -> Result<bool> {
        let Some(stored) = self.claims.get(&claim.id) else {
            return Ok(false);
        };
        if stored.claim == *claim {
            return Ok(true);
        }
        let conflict = ValidationError::IdConflict(claim.id);
        let source = if verify {
            validate_claim(claim, &self.statements).err().unwrap_or(conflict)
        } else {
            conflict
        };
        Err(StoreError::Integrity {
            id: claim.id,
            source,
        })
    }

    /// Sign a claim with `key`, which must match the key held by `by`.
    ///
    /// The claim is returned, not inserted.
    pub fn make_claim(&self, builder: ClaimBuilder, key: &PrivateKey) -> Result<Claim> {
        let t = builder.tuple();
        for id in [&t.by, &t.er, &t.ee, &t.subject] {
            if !self.statements.contains(id) {
                return Err(StoreError::NotFound(format!("statement {id}")));
            }
        }
        if self.statements.public_key(&t.by) != Some(&key.public_key()) {
            return Err(CoreError::KeyMismatch(t.by).into());
        }
        Ok(builder.sign(key)?)
    }

    fn require_statements(&self, claim: &Claim) -> Result<()> {
        for id in [&claim.by, &claim.er, &claim.ee, &claim.subject] {
            if !self.statements.contains(id) {
                return Err(StoreError::Integrity {
                    id: claim.id,
                    source: ValidationError::MissingStatement(*id),
                });
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a ledger from a decoded snapshot.
    ///
    /// Statements whose hash does not match their content and claims that
    /// fail verification are excluded and listed in the report; loading
    /// continues past them. The identity anchor must name a key statement,
    /// and the name anchor must name a claim present in the file.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<(Self, LoadReport)> {
        let mut ledger = Self::new();
        let mut report = LoadReport::default();

        for raw in &snapshot.statements {
            match Statement::from_parts(raw.content.clone(), raw.id) {
                Ok(statement) => {
                    ledger.statements.insert(statement);
                }
                Err(error) => {
                    warn!(statement = %raw.id, %error, "rejected statement");
                    report.rejected.push(Rejection { id: raw.id, error });
                }
            }
        }

        for claim in &snapshot.claims {
            let id = claim.id;
            match ledger.accept(claim.clone()) {
                Ok(InsertResult::AlreadyExists) => report.duplicates += 1,
                Ok(_) => report.accepted += 1,
                Err(StoreError::Integrity { source, .. }) => {
                    warn!(claim = %id, error = %source, "rejected claim");
                    report.rejected.push(Rejection { id, error: source });
                }
                Err(other) => return Err(other),
            }
        }

        if let Some(me) = &snapshot.me {
            if ledger.statements.public_key(me).is_none() {
                return Err(StoreError::MissingAnchor(format!(
                    "identity {me} is not a known key statement"
                )));
            }
        }
        if let Some(name) = &snapshot.name_claim {
            let rejected = report.rejected.iter().any(|r| r.id == *name);
            if !ledger.claims.contains(name) && !rejected {
                return Err(StoreError::MissingAnchor(format!(
                    "name claim {name} is not in the store"
                )));
            }
        }

        debug!(
            statements = ledger.statements.len(),
            claims = report.accepted,
            rejected = report.rejected.len(),
            "ledger loaded"
        );
        Ok((ledger, report))
    }

    /// Every statement and claim, ordered by id, with the given anchors.
    pub fn to_snapshot(
        &self,
        private_key: Option<String>,
        me: Option<HashId>,
        name_claim: Option<HashId>,
    ) -> Snapshot {
        let mut statements: Vec<RawStatement> = self
            .statements
            .iter()
            .map(|s| RawStatement {
                content: s.content_bytes(),
                id: s.id(),
            })
            .collect();
        statements.sort_by_key(|s| s.id);

        let mut claims: Vec<Claim> = self.claims.iter().map(|s| s.claim.clone()).collect();
        claims.sort_by_key(|c| c.id);

        Snapshot {
            private_key,
            me,
            name_claim,
            statements,
            claims,
        }
    }
}
