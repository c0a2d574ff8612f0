//! Claim verification.
//!
//! A claim is accepted only when:
//! 1. every referenced statement is known
//! 2. `by` holds a public key
//! 3. the signature verifies over the canonical encoding
//! 4. the stored id equals SHA-256(signature)

use crate::claim::Claim;
use crate::crypto::PublicKey;
use crate::error::ValidationError;
use crate::types::HashId;

/// Statement lookup used during verification.
pub trait KeyLookup {
    /// Whether the statement is known.
    fn contains(&self, id: &HashId) -> bool;

    /// The parsed public key held by the statement, if it holds one.
    fn public_key(&self, id: &HashId) -> Option<&PublicKey>;
}

/// Validate a claim against known statements.
pub fn validate_claim<K: KeyLookup + ?Sized>(
    claim: &Claim,
    keys: &K,
) -> Result<(), ValidationError> {
    for id in [&claim.by, &claim.er, &claim.ee, &claim.subject] {
        if !keys.contains(id) {
            return Err(ValidationError::MissingStatement(*id));
        }
    }

    let key = keys
        .public_key(&claim.by)
        .ok_or(ValidationError::NotAKey(claim.by))?;

    key.verify(&claim.canonical_bytes(), &claim.signature)
        .map_err(|_| ValidationError::SignatureFailed)?;

    let computed = claim.compute_id();
    if computed != claim.id {
        return Err(ValidationError::IdMismatch {
            stored: claim.id,
            computed,
        });
    }

    Ok(())
}

/// Whether a claim passes [`validate_claim`].
pub fn untampered<K: KeyLookup + ?Sized>(claim: &Claim, keys: &K) -> bool {
    validate_claim(claim, keys).is_ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::claim::ClaimBuilder;
    use crate::crypto::PrivateKey;
    use crate::statement::Statement;

    #[derive(Default)]
    struct Keys {
        known: HashMap<HashId, Option<PublicKey>>,
    }

    impl Keys {
        fn add_key(&mut self, key: &PrivateKey) -> HashId {
            let statement = key.public_key().statement().unwrap();
            self.known.insert(statement.id(), Some(key.public_key()));
            statement.id()
        }

        fn add_text(&mut self, text: &str) -> HashId {
            let statement = Statement::new(text.as_bytes().to_vec());
            self.known.insert(statement.id(), None);
            statement.id()
        }
    }

    impl KeyLookup for Keys {
        fn contains(&self, id: &HashId) -> bool {
            self.known.contains_key(id)
        }

        fn public_key(&self, id: &HashId) -> Option<&PublicKey> {
            self.known.get(id).and_then(|k| k.as_ref())
        }
    }

    fn setup() -> (Keys, PrivateKey, Claim) {
        let mut keys = Keys::default();
        let key = PrivateKey::from_ed25519_seed(&[0x42; 32]);
        let me = keys.add_key(&key);
        let name = keys.add_text("Alice");
        let claim = ClaimBuilder::identity(me, name).sign(&key).unwrap();
        (keys, key, claim)
    }

    #[test]
    fn test_valid_claim() {
        let (keys, _, claim) = setup();
        assert!(validate_claim(&claim, &keys).is_ok());
        assert!(untampered(&claim, &keys));
    }

    #[test]
    fn test_missing_by_statement() {
        let (_, _, claim) = setup();
        let empty = Keys::default();
        assert!(matches!(
            validate_claim(&claim, &empty),
            Err(ValidationError::MissingStatement(_))
        ));
    }

    #[test]
    fn test_by_is_not_a_key() {
        let (mut keys, key, _) = setup();
        let name = keys.add_text("Alice");
        let other = keys.add_text("Bob");
        let claim = ClaimBuilder::new(name, other, other, name).sign(&key).unwrap();
        assert!(matches!(
            validate_claim(&claim, &keys),
            Err(ValidationError::NotAKey(_))
        ));
    }

    #[test]
    fn test_wrong_signer() {
        let (mut keys, _, _) = setup();
        let me = keys.add_key(&PrivateKey::from_ed25519_seed(&[0x42; 32]));
        let name = keys.add_text("Alice");
        let mallory = PrivateKey::from_ed25519_seed(&[0x66; 32]);
        let forged = ClaimBuilder::identity(me, name).sign(&mallory).unwrap();
        assert!(matches!(
            validate_claim(&forged, &keys),
            Err(ValidationError::SignatureFailed)
        ));
    }

    #[test]
    fn test_tampered_counter() {
        let (keys, _, mut claim) = setup();
        claim.counter = 3;
        assert!(!untampered(&claim, &keys));
    }

    #[test]
    fn test_tampered_signature_byte() {
        let (keys, _, mut claim) = setup();
        let mut sig = claim.signature.to_vec();
        sig[0] ^= 0x01;
        claim.signature = sig.into();
        assert!(matches!(
            validate_claim(&claim, &keys),
            Err(ValidationError::SignatureFailed)
        ));
    }

    #[test]
    fn test_tampered_id() {
        let (keys, _, mut claim) = setup();
        let mut id = claim.id.0;
        id[31] ^= 0x80;
        claim.id = HashId::from_bytes(id);
        assert!(matches!(
            validate_claim(&claim, &keys),
            Err(ValidationError::IdMismatch { .. })
        ));
    }
}
