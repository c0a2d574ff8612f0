//! The claim store and its derived indices.
//!
//! Every accepted claim is kept. For each `(by, er, ee, subject)` tuple one
//! claim is authoritative, and only authoritative claims appear in the
//! indices. Identity, band and founder indices hold affirmative claims only;
//! the association index holds both polarities, since a denial is a vote.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use inband_core::{Claim, ClaimKind, ClaimTuple, HashId};
use tracing::debug;

/// A claim together with its shape, computed once at insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredClaim {
    pub claim: Claim,
    pub kind: ClaimKind,
}

/// Result of inserting a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// First claim for its tuple.
    Inserted { kind: ClaimKind },
    /// Replaced the previously authoritative claim for its tuple.
    Superseded { kind: ClaimKind, previous: HashId },
    /// Kept for audit; an existing claim outranks it.
    Outranked { current: HashId },
    /// Already present (idempotent - not an error).
    AlreadyExists,
}

impl InsertResult {
    /// Whether the inserted claim is now authoritative.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, Self::Inserted { .. } | Self::Superseded { .. })
    }
}

/// All known claims plus the authoritative indices.
#[derive(Default)]
pub struct ClaimStore {
    /// Every accepted claim, including superseded ones.
    claims: HashMap<HashId, StoredClaim>,

    /// Tuple -> authoritative claim id.
    authoritative: HashMap<ClaimTuple, HashId>,

    idents: BTreeSet<HashId>,
    bands: BTreeSet<HashId>,
    founders: BTreeSet<HashId>,
    associations: BTreeSet<HashId>,

    /// Name statement -> identity claim currently asserting it.
    names: HashMap<HashId, HashId>,
}

impl ClaimStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Insertion
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert an already-verified claim.
    pub fn insert(&mut self, claim: Claim) -> InsertResult {
        if self.claims.contains_key(&claim.id) {
            return InsertResult::AlreadyExists;
        }

        let kind = claim.classify();
        let tuple = claim.tuple();
        let id = claim.id;

        let current = self.authoritative.get(&tuple).copied();
        let outranked = current.filter(|cur| {
            self.claims
                .get(cur)
                .is_some_and(|existing| !claim.outranks(&existing.claim))
        });

        self.claims.insert(id, StoredClaim { claim, kind });

        if let Some(current) = outranked {
            debug!(claim = %id, current = %current, "claim outranked, kept for audit");
            return InsertResult::Outranked { current };
        }

        if let Some(previous) = current {
            self.unindex(&previous);
        }
        self.authoritative.insert(tuple, id);
        self.index(&id);

        match current {
            Some(previous) => {
                debug!(claim = %id, previous = %previous, ?kind, "claim superseded");
                InsertResult::Superseded { kind, previous }
            }
            None => {
                debug!(claim = %id, ?kind, "claim accepted");
                InsertResult::Inserted { kind }
            }
        }
    }

    /// Recompute the authoritative set and every index from the claim set.
    pub fn rebuild(&mut self) {
        let mut claims: Vec<Claim> = std::mem::take(&mut self.claims)
            .into_values()
            .map(|stored| stored.claim)
            .collect();
        claims.sort_by_key(|c| c.id);

        *self = Self::default();
        for claim in claims {
            self.insert(claim);
        }
    }

    fn index(&mut self, id: &HashId) {
        let Some(stored) = self.claims.get(id) else {
            return;
        };
        let (kind, affirm, subject) = (stored.kind, stored.claim.affirm, stored.claim.subject);

        match kind {
            ClaimKind::Identity if affirm => {
                self.idents.insert(*id);
                self.refresh_name(&subject);
            }
            ClaimKind::BandName if affirm => {
                self.bands.insert(*id);
            }
            ClaimKind::Founder if affirm => {
                self.founders.insert(*id);
            }
            ClaimKind::Association => {
                self.associations.insert(*id);
            }
            _ => {}
        }
    }

    fn unindex(&mut self, id: &HashId) {
        self.bands.remove(id);
        self.founders.remove(id);
        self.associations.remove(id);
        if self.idents.remove(id) {
            if let Some(subject) = self.claims.get(id).map(|s| s.claim.subject) {
                self.refresh_name(&subject);
            }
        }
    }

    fn refresh_name(&mut self, subject: &HashId) {
        let best = self
            .idents
            .iter()
            .filter_map(|id| self.claims.get(id))
            .map(|stored| &stored.claim)
            .filter(|claim| claim.subject == *subject)
            .max_by_key(|claim| (claim.counter, Reverse(claim.id)))
            .map(|claim| claim.id);

        match best {
            Some(id) => self.names.insert(*subject, id),
            None => self.names.remove(subject),
        };
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Get any claim by id, superseded or not.
    pub fn get(&self, id: &HashId) -> Option<&StoredClaim> {
        self.claims.get(id)
    }

    /// Whether the claim is known.
    pub fn contains(&self, id: &HashId) -> bool {
        self.claims.contains_key(id)
    }

    /// Whether the claim is the authoritative one for its tuple.
    pub fn is_authoritative(&self, id: &HashId) -> bool {
        self.claims
            .get(id)
            .and_then(|s| self.authoritative.get(&s.claim.tuple()))
            == Some(id)
    }

    /// The authoritative claim for a tuple.
    pub fn authoritative(&self, tuple: &ClaimTuple) -> Option<&Claim> {
        self.authoritative
            .get(tuple)
            .and_then(|id| self.claims.get(id))
            .map(|s| &s.claim)
    }

    /// The highest counter used on a tuple.
    pub fn latest_counter(&self, tuple: &ClaimTuple) -> Option<u64> {
        self.authoritative(tuple).map(|c| c.counter)
    }

    /// Every claim, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &StoredClaim> {
        self.claims.values()
    }

    /// Every authoritative claim, in no particular order.
    pub fn iter_authoritative(&self) -> impl Iterator<Item = &StoredClaim> {
        self.authoritative
            .values()
            .filter_map(|id| self.claims.get(id))
    }

    /// Number of claims held, including superseded ones.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether no claims are held.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Indices
    // ─────────────────────────────────────────────────────────────────────────

    /// Authoritative identity claims, ordered by claim id.
    pub fn identities(&self) -> impl Iterator<Item = &Claim> {
        self.resolve(&self.idents)
    }

    /// Authoritative band-name claims, ordered by claim id.
    pub fn bands(&self) -> impl Iterator<Item = &Claim> {
        self.resolve(&self.bands)
    }

    /// Authoritative founder claims, ordered by claim id.
    pub fn founders(&self) -> impl Iterator<Item = &Claim> {
        self.resolve(&self.founders)
    }

    /// Authoritative association claims of either polarity.
    pub fn associations(&self) -> impl Iterator<Item = &Claim> {
        self.resolve(&self.associations)
    }

    /// The identity claim currently asserting a name.
    pub fn name_claim(&self, name: &HashId) -> Option<&Claim> {
        self.names
            .get(name)
            .and_then(|id| self.claims.get(id))
            .map(|s| &s.claim)
    }

    /// The identity claim with the highest precedence for a key.
    pub fn identity_claim(&self, key: &HashId) -> Option<&Claim> {
        self.identities()
            .filter(|c| c.by == *key)
            .max_by_key(|c| (c.counter, Reverse(c.id)))
    }

    /// The band-name claim with the highest precedence for a band key.
    pub fn band_claim(&self, band: &HashId) -> Option<&Claim> {
        self.bands()
            .filter(|c| c.by == *band)
            .max_by_key(|c| (c.counter, Reverse(c.id)))
    }

    fn resolve<'a>(&'a self, ids: &'a BTreeSet<HashId>) -> impl Iterator<Item = &'a Claim> {
        ids.iter()
            .filter_map(|id| self.claims.get(id))
            .map(|s| &s.claim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inband_core::{ClaimBuilder, PrivateKey};
    use proptest::prelude::*;

    fn h(b: u8) -> HashId {
        HashId::from_bytes([b; 32])
    }

    fn key() -> PrivateKey {
        PrivateKey::from_ed25519_seed(&[9; 32])
    }

    fn vote(counter: u64, affirm: bool) -> Claim {
        ClaimBuilder::new(h(1), h(2), h(3), h(4))
            .counter(counter)
            .affirm(affirm)
            .sign(&key())
            .unwrap()
    }

    #[test]
    fn test_insert_and_duplicate() {
        let mut store = ClaimStore::new();
        let claim = vote(1, true);

        assert_eq!(
            store.insert(claim.clone()),
            InsertResult::Inserted {
                kind: ClaimKind::Association
            }
        );
        assert_eq!(store.insert(claim), InsertResult::AlreadyExists);
        assert_eq!(store.len(), 1);
        assert_eq!(store.associations().count(), 1);
    }

    #[test]
    fn test_higher_counter_supersedes() {
        let mut store = ClaimStore::new();
        let first = vote(1, true);
        let second = vote(2, false);

        store.insert(first.clone());
        let result = store.insert(second.clone());

        assert_eq!(
            result,
            InsertResult::Superseded {
                kind: ClaimKind::Association,
                previous: first.id
            }
        );
        assert!(store.is_authoritative(&second.id));
        assert!(!store.is_authoritative(&first.id));
        assert!(store.contains(&first.id), "superseded claims are retained");

        let assocs: Vec<_> = store.associations().collect();
        assert_eq!(assocs, vec![&second]);
        assert_eq!(store.latest_counter(&second.tuple()), Some(2));
    }

    #[test]
    fn test_lower_counter_is_outranked() {
        let mut store = ClaimStore::new();
        let newer = vote(5, true);
        let older = vote(3, false);

        store.insert(newer.clone());
        assert_eq!(
            store.insert(older.clone()),
            InsertResult::Outranked { current: newer.id }
        );
        assert_eq!(store.associations().collect::<Vec<_>>(), vec![&newer]);
    }

    #[test]
    fn test_names_follow_authoritative_identity() {
        let mut store = ClaimStore::new();
        let (me, alice) = (h(1), h(2));
        let claim = ClaimBuilder::identity(me, alice).sign(&key()).unwrap();

        store.insert(claim.clone());

        assert_eq!(store.name_claim(&alice), Some(&claim));
        assert_eq!(store.identity_claim(&me), Some(&claim));
        assert_eq!(store.identities().count(), 1);
    }

    #[test]
    fn test_denied_identity_is_not_indexed() {
        let mut store = ClaimStore::new();
        let (me, alice) = (h(1), h(2));
        let claim = ClaimBuilder::identity(me, alice)
            .affirm(false)
            .sign(&key())
            .unwrap();

        store.insert(claim);

        assert!(store.name_claim(&alice).is_none());
        assert_eq!(store.identities().count(), 0);
    }

    #[test]
    fn test_rebuild_reproduces_indices() {
        let mut store = ClaimStore::new();
        let band = h(7);
        store.insert(ClaimBuilder::band_name(band, h(8)).sign(&key()).unwrap());
        store.insert(ClaimBuilder::founder(band, h(1)).sign(&key()).unwrap());
        store.insert(vote(1, true));
        store.insert(vote(2, true));

        let before: Vec<_> = store.associations().cloned().collect();
        store.rebuild();

        assert_eq!(store.len(), 4);
        assert_eq!(store.bands().count(), 1);
        assert_eq!(store.founders().count(), 1);
        assert_eq!(store.associations().cloned().collect::<Vec<_>>(), before);
    }

    proptest! {
        #[test]
        fn prop_supersession_is_order_independent(
            counters in prop::collection::vec(1u64..6, 1..8),
            seed in any::<u64>(),
        ) {
            let claims: Vec<Claim> = counters
                .iter()
                .enumerate()
                .map(|(i, c)| vote(*c, i % 2 == 0))
                .collect();

            let mut forward = ClaimStore::new();
            for c in &claims {
                forward.insert(c.clone());
            }

            let mut shuffled = claims.clone();
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();
            let mut backward = ClaimStore::new();
            for c in shuffled {
                backward.insert(c);
            }

            let tuple = claims[0].tuple();
            prop_assert_eq!(forward.authoritative(&tuple), backward.authoritative(&tuple));
            let max = counters.iter().max().copied();
            prop_assert_eq!(forward.latest_counter(&tuple), max);
        }
    }
}
