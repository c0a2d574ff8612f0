//! Claims: signed assertions relating four statements.
//!
//! A claim says: "the key in statement `by` asserts (or denies), as of
//! `counter`, that `er` relates to `ee` under the predicate `subject`."
//!
//! Claims are immutable. An update is a new claim over the same
//! `(by, er, ee, subject)` tuple with a higher counter.

use std::cmp::Reverse;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_bytes, CANONICAL_LEN};
use crate::crypto::PrivateKey;
use crate::error::CoreError;
use crate::types::HashId;

/// Counter used by identity, band-name and founder claims. Never superseded.
pub const COUNTER_SENTINEL: u64 = u64::MAX;

/// The four statement references that identify a line of supersession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimTuple {
    pub by: HashId,
    pub er: HashId,
    pub ee: HashId,
    pub subject: HashId,
}

impl ClaimTuple {
    /// The shape implied by this tuple.
    pub fn kind(&self) -> ClaimKind {
        ClaimKind::classify(self)
    }
}

/// The shape of a claim, determined by which references are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimKind {
    /// `by == er == ee`; `subject` is the identity's name.
    Identity,
    /// `by == er == subject`; `ee` is the band's name.
    BandName,
    /// `by == ee == subject`; `er` is the founding identity.
    Founder,
    /// Anything else: a vote or relation between `er` and `ee`.
    Association,
}

impl ClaimKind {
    /// Classify a tuple. A tuple with all four references equal carries no
    /// meaning and is treated as an association.
    pub fn classify(t: &ClaimTuple) -> Self {
        let self_ref = t.by == t.er && t.er == t.ee && t.ee == t.subject;
        if self_ref {
            ClaimKind::Association
        } else if t.by == t.er && t.er == t.ee {
            ClaimKind::Identity
        } else if t.by == t.er && t.er == t.subject {
            ClaimKind::BandName
        } else if t.by == t.ee && t.ee == t.subject {
            ClaimKind::Founder
        } else {
            ClaimKind::Association
        }
    }
}

/// A signed claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Assert (true) or deny (false).
    pub affirm: bool,
    /// Supersession counter; the highest counter per tuple wins.
    pub counter: u64,
    /// Statement holding the signer's public key.
    pub by: HashId,
    pub er: HashId,
    pub ee: HashId,
    /// Statement naming the predicate.
    pub subject: HashId,
    /// Detached signature over the canonical encoding.
    pub signature: Bytes,
    /// SHA-256 of the signature. Untrusted until checked.
    pub id: HashId,
}

impl Claim {
    /// The supersession tuple.
    pub fn tuple(&self) -> ClaimTuple {
        ClaimTuple {
            by: self.by,
            er: self.er,
            ee: self.ee,
            subject: self.subject,
        }
    }

    /// Classify this claim's shape.
    pub fn classify(&self) -> ClaimKind {
        ClaimKind::classify(&self.tuple())
    }

    /// The bytes the signature covers.
    pub fn canonical_bytes(&self) -> [u8; CANONICAL_LEN] {
        canonical_bytes(
            self.affirm,
            self.counter,
            &self.by,
            &self.er,
            &self.ee,
            &self.subject,
        )
    }

    /// Recompute the id from the signature.
    pub fn compute_id(&self) -> HashId {
        HashId::of(&self.signature)
    }

    /// Whether this claim takes precedence over `other` for the same tuple.
    ///
    /// Higher counter wins. Equal counters fall back to the smaller id so
    /// the outcome does not depend on arrival order.
    pub fn outranks(&self, other: &Claim) -> bool {
        (self.counter, Reverse(self.id)) > (other.counter, Reverse(other.id))
    }
}

/// Builder for creating and signing claims.
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    affirm: bool,
    counter: u64,
    tuple: ClaimTuple,
}

impl ClaimBuilder {
    /// Start an affirmative claim with counter 1.
    pub fn new(by: HashId, er: HashId, ee: HashId, subject: HashId) -> Self {
        Self {
            affirm: true,
            counter: 1,
            tuple: ClaimTuple { by, er, ee, subject },
        }
    }

    /// An identity claim binding `key` to `name`.
    pub fn identity(key: HashId, name: HashId) -> Self {
        Self::new(key, key, key, name).counter(COUNTER_SENTINEL)
    }

    /// A band-name claim binding `band_key` to `name`.
    pub fn band_name(band_key: HashId, name: HashId) -> Self {
        Self::new(band_key, band_key, name, band_key).counter(COUNTER_SENTINEL)
    }

    /// A founder claim: `founder` founded the band keyed by `band_key`.
    pub fn founder(band_key: HashId, founder: HashId) -> Self {
        Self::new(band_key, founder, band_key, band_key).counter(COUNTER_SENTINEL)
    }

    /// Set polarity.
    pub fn affirm(mut self, affirm: bool) -> Self {
        self.affirm = affirm;
        self
    }

    /// Set the counter.
    pub fn counter(mut self, counter: u64) -> Self {
        self.counter = counter;
        self
    }

    /// The tuple this claim will occupy.
    pub fn tuple(&self) -> ClaimTuple {
        self.tuple
    }

    /// Sign with the private key matching the `by` statement.
    pub fn sign(self, key: &PrivateKey) -> Result<Claim, CoreError> {
        let t = self.tuple;
        let message = canonical_bytes(self.affirm, self.counter, &t.by, &t.er, &t.ee, &t.subject);
        let signature = Bytes::from(key.sign(&message)?);
        let id = HashId::of(&signature);

        Ok(Claim {
            affirm: self.affirm,
            counter: self.counter,
            by: t.by,
            er: t.er,
            ee: t.ee,
            subject: t.subject,
            signature,
            id,
        })
    }
}
