//! Proptest generators for property-based testing.

use proptest::prelude::*;

use inband_core::{Claim, ClaimBuilder, HashId, PrivateKey, Statement};
use inband_store::{RawStatement, Snapshot};

/// Generate a random HashId.
pub fn hash_id() -> impl Strategy<Value = HashId> {
    any::<[u8; 32]>().prop_map(HashId::from_bytes)
}

/// Generate an Ed25519 private key.
pub fn private_key() -> impl Strategy<Value = PrivateKey> {
    any::<[u8; 32]>().prop_map(|seed| PrivateKey::from_ed25519_seed(&seed))
}

/// Generate a short display name.
pub fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _-]{0,23}"
}

/// Generate arbitrary statement content, including empty and non-UTF-8.
pub fn statement() -> impl Strategy<Value = Statement> {
    prop::collection::vec(any::<u8>(), 0..128).prop_map(Statement::new)
}

/// Parameters for generating a claim.
#[derive(Debug, Clone)]
pub struct ClaimParams {
    pub seed: [u8; 32],
    pub affirm: bool,
    pub counter: u64,
    pub er: HashId,
    pub ee: HashId,
    pub subject: HashId,
}

impl Arbitrary for ClaimParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            any::<bool>(),
            any::<u64>(),
            hash_id(),
            hash_id(),
            hash_id(),
        )
            .prop_map(|(seed, affirm, counter, er, ee, subject)| ClaimParams {
                seed,
                affirm,
                counter,
                er,
                ee,
                subject,
            })
            .boxed()
    }
}

/// The key statement for the params' signer.
pub fn signer_statement(params: &ClaimParams) -> Statement {
    PrivateKey::from_ed25519_seed(&params.seed)
        .public_key()
        .statement()
        .expect("ed25519 keys always encode")
}

/// Sign a claim from params. `by` is the signer's key statement.
pub fn claim_from_params(params: &ClaimParams) -> Claim {
    let key = PrivateKey::from_ed25519_seed(&params.seed);
    let by = signer_statement(params).id();
    ClaimBuilder::new(by, params.er, params.ee, params.subject)
        .affirm(params.affirm)
        .counter(params.counter)
        .sign(&key)
        .expect("ed25519 signing is infallible")
}

/// Generate a snapshot of signed claims with the statements they reference.
pub fn snapshot() -> impl Strategy<Value = Snapshot> {
    (
        prop::collection::vec(any::<ClaimParams>(), 0..6),
        prop::collection::vec(statement(), 0..6),
    )
        .prop_map(|(params, extra)| {
            let mut statements: Vec<RawStatement> = extra
                .into_iter()
                .chain(params.iter().map(signer_statement))
                .map(|s| RawStatement {
                    content: s.content_bytes(),
                    id: s.id(),
                })
                .collect();
            statements.sort_by_key(|s| s.id);
            statements.dedup_by_key(|s| s.id);

            Snapshot {
                private_key: None,
                me: None,
                name_claim: None,
                statements,
                claims: params.iter().map(claim_from_params).collect(),
            }
        })
}
