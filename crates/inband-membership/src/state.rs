//! Membership state computation.
//!
//! Identities and bands are interned as integer nodes; founder claims
//! become per-band seed sets and membership votes become edges. The
//! graph is built by replaying authoritative claims, then resolved on
//! demand.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use inband_core::{Claim, ClaimKind, HashId, Topic};
use tracing::debug;

use crate::error::{MembershipError, Result};

type Node = usize;

/// A membership vote, as an edge between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vote {
    pub voter: HashId,
    pub candidate: HashId,
    pub affirm: bool,
}

#[derive(Debug, Default)]
struct BandState {
    founders: BTreeSet<Node>,
    /// (voter, candidate) -> affirm. One vote per pair.
    votes: BTreeMap<(Node, Node), bool>,
}

/// Founders and votes for every band, resolvable into member sets.
#[derive(Debug)]
pub struct MembershipGraph {
    nodes: Vec<HashId>,
    index: HashMap<HashId, Node>,
    bands: HashMap<Node, BandState>,
    /// Subject that marks an association claim as a membership vote.
    relation: HashId,
}

impl Default for MembershipGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MembershipGraph {
    /// Create an empty graph whose votes use the `"in"` relation.
    pub fn new() -> Self {
        Self::with_relation(Topic::In.id())
    }

    /// Create an empty graph whose votes use the given relation statement.
    pub fn with_relation(relation: HashId) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            bands: HashMap::new(),
            relation,
        }
    }

    /// Build a graph from authoritative claims.
    ///
    /// Claims that are neither affirmative founder claims nor membership
    /// votes are ignored. Superseded claims must not be passed in.
    pub fn from_claims<'a>(claims: impl IntoIterator<Item = &'a Claim>) -> Self {
        let mut graph = Self::new();
        for claim in claims {
            graph.apply_claim(claim);
        }
        graph
    }

    fn node(&mut self, id: HashId) -> Node {
        if let Some(&n) = self.index.get(&id) {
            return n;
        }
        let n = self.nodes.len();
        self.nodes.push(id);
        self.index.insert(id, n);
        n
    }

    /// Apply one claim. Returns whether it affected the graph.
    pub fn apply_claim(&mut self, claim: &Claim) -> bool {
        match claim.classify() {
            ClaimKind::Founder if claim.affirm => {
                self.apply_founder(claim.by, claim.er);
                true
            }
            ClaimKind::Association if claim.subject == self.relation => {
                self.apply_vote(
                    claim.er,
                    Vote {
                        voter: claim.by,
                        candidate: claim.ee,
                        affirm: claim.affirm,
                    },
                );
                true
            }
            _ => false,
        }
    }

    /// Record that `founder` founded `band`.
    pub fn apply_founder(&mut self, band: HashId, founder: HashId) {
        let band = self.node(band);
        let founder = self.node(founder);
        self.bands.entry(band).or_default().founders.insert(founder);
    }

    /// Record a vote about `band`, replacing any earlier vote by the same
    /// voter on the same candidate.
    pub fn apply_vote(&mut self, band: HashId, vote: Vote) {
        let band = self.node(band);
        let voter = self.node(vote.voter);
        let candidate = self.node(vote.candidate);
        self.bands
            .entry(band)
            .or_default()
            .votes
            .insert((voter, candidate), vote.affirm);
    }

    /// Bands that have founders or votes.
    pub fn bands(&self) -> impl Iterator<Item = HashId> + '_ {
        self.bands.keys().map(|&n| self.nodes[n])
    }

    /// Founders of a band.
    pub fn founders(&self, band: &HashId) -> Result<BTreeSet<HashId>> {
        let state = self.band(band)?;
        Ok(state.founders.iter().map(|&n| self.nodes[n]).collect())
    }

    /// Resolve the member set of a band.
    pub fn members(&self, band: &HashId) -> Result<BTreeSet<HashId>> {
        let state = self.band(band)?;
        let mut members = state.founders.clone();

        for round in 1.. {
            let mut tally: BTreeMap<Node, (usize, usize)> = BTreeMap::new();
            for (&(voter, candidate), &affirm) in &state.votes {
                if !members.contains(&voter) {
                    continue;
                }
                let (up, down) = tally.entry(candidate).or_default();
                if affirm {
                    *up += 1;
                } else {
                    *down += 1;
                }
            }

            let admitted: Vec<Node> = tally
                .into_iter()
                .filter(|(candidate, (up, down))| up > down && !members.contains(candidate))
                .map(|(candidate, _)| candidate)
                .collect();

            debug!(band = %band, round, admitted = admitted.len(), "membership round");
            if admitted.is_empty() {
                break;
            }
            members.extend(admitted);
        }

        Ok(members.into_iter().map(|n| self.nodes[n]).collect())
    }

    /// Whether `identity` is currently a member of `band`.
    pub fn is_member(&self, band: &HashId, identity: &HashId) -> Result<bool> {
        Ok(self.members(band)?.contains(identity))
    }

    fn band(&self, band: &HashId) -> Result<&BandState> {
        self.index
            .get(band)
            .and_then(|n| self.bands.get(n))
            .ok_or(MembershipError::UnknownBand(*band))
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

    const BAND: u8 = 100;

    fn vote(graph: &mut MembershipGraph, voter: u8, candidate: u8, affirm: bool) {
        graph.apply_vote(
            h(BAND),
            Vote {
                voter: h(voter),
                candidate: h(candidate),
                affirm,
            },
        );
    }

    fn founded_by(founders: &[u8]) -> MembershipGraph {
        let mut graph = MembershipGraph::new();
        for &f in founders {
            graph.apply_founder(h(BAND), h(f));
        }
        graph
    }

    #[test]
    fn test_founders_are_members() {
        let graph = founded_by(&[1, 2]);
        assert!(graph.is_member(&h(BAND), &h(1)).unwrap());
        assert!(graph.is_member(&h(BAND), &h(2)).unwrap());
        assert!(!graph.is_member(&h(BAND), &h(3)).unwrap());
        assert_eq!(graph.founders(&h(BAND)).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_band() {
        let graph = founded_by(&[1]);
        assert!(matches!(
            graph.members(&h(7)),
            Err(MembershipError::UnknownBand(_))
        ));
    }

    #[test]
    fn test_member_votes_admit() {
        let mut graph = founded_by(&[1]);
        vote(&mut graph, 1, 2, true);
        assert!(graph.is_member(&h(BAND), &h(2)).unwrap());
    }

    #[test]
    fn test_non_member_votes_do_not_count() {
        let mut graph = founded_by(&[1]);
        vote(&mut graph, 5, 2, true);
        vote(&mut graph, 6, 2, true);
        assert!(!graph.is_member(&h(BAND), &h(2)).unwrap());
    }

    #[test]
    fn test_tie_does_not_admit() {
        let mut graph = founded_by(&[1, 2]);
        vote(&mut graph, 1, 3, true);
        vote(&mut graph, 2, 3, false);
        assert!(!graph.is_member(&h(BAND), &h(3)).unwrap());
    }

    #[test]
    fn test_chain_of_admission() {
        // 1 founds, votes in 2; 2 votes in 3; 3 votes in 4.
        let mut graph = founded_by(&[1]);
        vote(&mut graph, 3, 4, true);
        vote(&mut graph, 2, 3, true);
        vote(&mut graph, 1, 2, true);

        let members = graph.members(&h(BAND)).unwrap();
        assert_eq!(
            members,
            [h(1), h(2), h(3), h(4)].into_iter().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn test_later_vote_replaces_earlier() {
        let mut graph = founded_by(&[1]);
        vote(&mut graph, 1, 2, true);
        vote(&mut graph, 1, 2, false);
        assert!(!graph.is_member(&h(BAND), &h(2)).unwrap());
    }

    #[test]
    fn test_apply_claim_shapes() {
        let key = PrivateKey::from_ed25519_seed(&[1; 32]);
        let (band, alice, bob, label) = (h(BAND), h(1), h(2), h(50));

        let founder = ClaimBuilder::founder(band, alice).sign(&key).unwrap();
        let membership = ClaimBuilder::new(alice, band, bob, Topic::In.id())
            .sign(&key)
            .unwrap();
        let role = ClaimBuilder::new(alice, band, bob, label).sign(&key).unwrap();
        let denied_founder = ClaimBuilder::founder(band, h(3))
            .affirm(false)
            .sign(&key)
            .unwrap();

        let mut graph = MembershipGraph::new();
        assert!(graph.apply_claim(&founder));
        assert!(graph.apply_claim(&membership));
        assert!(!graph.apply_claim(&role));
        assert!(!graph.apply_claim(&denied_founder));

        let members = graph.members(&band).unwrap();
        assert!(members.contains(&alice));
        assert!(members.contains(&bob));
        assert!(!members.contains(&h(3)));
    }

    proptest! {
        #[test]
        fn prop_resolution_is_stable(
            founders in prop::collection::btree_set(0u8..8, 1..3),
            votes in prop::collection::vec((0u8..8, 0u8..8, any::<bool>()), 0..24),
        ) {
            let mut forward = MembershipGraph::new();
            let mut backward = MembershipGraph::new();
            for &f in &founders {
                forward.apply_founder(h(BAND), h(f));
                backward.apply_founder(h(BAND), h(f));
            }

            // Last vote per pair wins, so dedupe before replaying in reverse.
            let mut last: BTreeMap<(u8, u8), bool> = BTreeMap::new();
            for &(voter, candidate, affirm) in &votes {
                vote(&mut forward, voter, candidate, affirm);
                last.insert((voter, candidate), affirm);
            }
            for (&(voter, candidate), &affirm) in last.iter().rev() {
                vote(&mut backward, voter, candidate, affirm);
            }

            let first = forward.members(&h(BAND)).unwrap();
            prop_assert_eq!(&first, &forward.members(&h(BAND)).unwrap());
            prop_assert_eq!(&first, &backward.members(&h(BAND)).unwrap());
            for &f in &founders {
                prop_assert!(first.contains(&h(f)));
            }
        }
    }
}
