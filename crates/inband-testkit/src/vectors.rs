//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical encoding, the signing convention and
//! the claim id so that every implementation produces identical claims.

use inband_core::{canonical_bytes, Claim, ClaimBuilder, HashId, PrivateKey};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for the signer's Ed25519 key.
    pub seed: [u8; 32],
    pub affirm: bool,
    pub counter: u64,
    /// Statement contents; empty means the signer's own key statement.
    pub er: &'static str,
    pub ee: &'static str,
    pub subject: &'static str,
    /// Expected canonical bytes (hex).
    pub expected_canonical: &'static str,
    /// Expected claim id (hex).
    pub expected_claim_id: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "Identity claim for Alice",
            seed: [0x01; 32],
            affirm: true,
            counter: u64::MAX,
            er: "",
            ee: "",
            subject: "Alice",
            expected_canonical: concat!(
                "0100000000000000ffffffffffffffff",
                "6af4c4f2ff24e381d8c12c1f65dbf7d855c29c78317bf0112fa18988be1667d2",
                "6af4c4f2ff24e381d8c12c1f65dbf7d855c29c78317bf0112fa18988be1667d2",
                "6af4c4f2ff24e381d8c12c1f65dbf7d855c29c78317bf0112fa18988be1667d2",
                "3bc51062973c458d5a6f2d8d64a023246354ad7e064b1e4e009ec8a0699a3043",
            ),
            expected_claim_id: "f7765654caf80db9501d1f76c67eff49f8fc73ae84a39bedea93343dc75fb4f8",
        },
        GoldenVector {
            name: "Negative membership vote",
            seed: [0x01; 32],
            affirm: false,
            counter: 2,
            er: "Wanderers",
            ee: "Bob",
            subject: "in",
            expected_canonical: concat!(
                "01000000000000ff0200000000000000",
                "6af4c4f2ff24e381d8c12c1f65dbf7d855c29c78317bf0112fa18988be1667d2",
                "fbbe6b3ef7f6b23603072372ad8bb520c893015d9ff6e7201fdb586926471d62",
                "cd9fb1e148ccd8442e5aa74904cc73bf6fb54d1d54d333bd596aa9bb4bb4e961",
                "582967534d0f909d196b97f9e6921342777aea87b46fa52df165389db1fb8ccf",
            ),
            expected_claim_id: "b830ac93c3ffcc9f82e15025cec2ff29a2de183e17d321af09caa3689fb97355",
        },
    ]
}

fn reference(content: &str, by: HashId) -> HashId {
    if content.is_empty() {
        by
    } else {
        HashId::of(content.as_bytes())
    }
}

/// Sign the claim a vector describes.
pub fn generate_claim_from_vector(vector: &GoldenVector) -> Claim {
    let key = PrivateKey::from_ed25519_seed(&vector.seed);
    let by = key
        .public_key()
        .statement()
        .expect("ed25519 keys always encode")
        .id();

    ClaimBuilder::new(
        by,
        reference(vector.er, by),
        reference(vector.ee, by),
        reference(vector.subject, by),
    )
    .affirm(vector.affirm)
    .counter(vector.counter)
    .sign(&key)
    .expect("ed25519 signing is infallible")
}

/// Check every vector, returning a description of each mismatch.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let mut failures = Vec::new();

    for vector in all_vectors() {
        let claim = generate_claim_from_vector(&vector);
        let canonical = hex::encode(canonical_bytes(
            claim.affirm,
            claim.counter,
            &claim.by,
            &claim.er,
            &claim.ee,
            &claim.subject,
        ));
        if canonical != vector.expected_canonical {
            failures.push(format!(
                "{}: canonical {} != {}",
                vector.name, canonical, vector.expected_canonical
            ));
        }
        if claim.id.to_hex() != vector.expected_claim_id {
            failures.push(format!(
                "{}: claim id {} != {}",
                vector.name,
                claim.id.to_hex(),
                vector.expected_claim_id
            ));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}
