//! End-to-end scenarios: startup, reload, bands, votes and tampering.

use inband::store::{decode, encode, Ledger};
use inband::{ClaimKind, Engine, EngineConfig, InbandError};
use inband_membership::MembershipGraph;
use inband_testkit::{exchange_all, multi_party, participant, TestFixture};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ─────────────────────────────────────────────────────────────────────────────
// Bootstrap / Recall
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn alice_bootstrap_and_reload() {
    init_tracing();
    let fixture = TestFixture::ed25519([0x11; 32]).unwrap();
    assert!(!fixture.store_path.exists());

    let engine = Engine::startup(&fixture.options("Alice").init(true)).unwrap();
    let me = engine.identity();
    assert!(fixture.store_path.exists());
    engine.shutdown().unwrap();

    let engine = Engine::startup(&fixture.options("ignored on reload")).unwrap();
    assert_eq!(engine.identity(), me);
    assert_eq!(engine.name(), "Alice");
    assert_eq!(engine.list_identities(), vec![(me, "Alice".to_owned())]);
    assert_eq!(engine.find_identity_by_name("Alice"), Some(me));
}

#[test]
fn default_name_is_anonymous() {
    let fixture = TestFixture::ed25519([0x12; 32]).unwrap();
    let options = inband::StartupOptions::new(&fixture.key_path, &fixture.store_path).init(true);
    let engine = Engine::startup(&options).unwrap();
    assert_eq!(engine.name(), "Anonymous");
}

#[test]
fn reload_without_store_is_a_state_error() {
    let fixture = TestFixture::ed25519([0x13; 32]).unwrap();
    let result = Engine::startup(&fixture.options("Alice"));
    assert!(matches!(result, Err(InbandError::StoreState(_))));
    assert!(!fixture.store_path.exists());
}

#[test]
fn init_over_existing_store_requires_force() {
    let fixture = TestFixture::ed25519([0x14; 32]).unwrap();
    Engine::startup(&fixture.options("Alice").init(true))
        .unwrap()
        .shutdown()
        .unwrap();
    let before = fixture.read_store().unwrap();

    let result = Engine::startup(&fixture.options("Mallory").init(true));
    assert!(matches!(result, Err(InbandError::StoreState(_))));
    assert_eq!(fixture.read_store().unwrap(), before, "no state is touched");

    let forced = Engine::startup(&fixture.options("Alicia").init(true).force(true)).unwrap();
    assert_eq!(forced.name(), "Alicia");
    forced.shutdown().unwrap();

    let reloaded = Engine::startup(&fixture.options("")).unwrap();
    assert_eq!(reloaded.name(), "Alicia");
    assert_eq!(reloaded.list_identities().len(), 1);
}

#[test]
fn init_with_bad_key_files_is_a_key_error() {
    let fixture = TestFixture::ed25519([0x15; 32]).unwrap();
    std::fs::write(&fixture.key_path, "garbage").unwrap();

    let result = Engine::startup(&fixture.options("Alice").init(true));
    assert!(matches!(result, Err(InbandError::KeyLoad(_))));
    assert!(!fixture.store_path.exists());
}

#[test]
fn rsa_identity_round_trips() {
    let fixture = TestFixture::rsa(1024).unwrap();

    let mut engine = Engine::startup(&fixture.options("Rosa").init(true)).unwrap();
    let band = engine.create_band("Readers").unwrap();
    let me = engine.identity();
    engine.shutdown().unwrap();

    let text = fixture.read_store().unwrap();
    assert!(text.starts_with(":MYPRIVATE:\n"));

    let engine = Engine::startup(&fixture.options("Rosa")).unwrap();
    assert_eq!(engine.name(), "Rosa");
    assert!(engine.is_member(&band, &me).unwrap());
}

// ─────────────────────────────────────────────────────────────────────────────
// Bands and membership
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn wanderers_have_two_founders() {
    init_tracing();
    let mut parties = multi_party(&["A", "B", "C"]);
    exchange_all(&mut parties);
    let (a, b, c) = (
        parties[0].identity(),
        parties[1].identity(),
        parties[2].identity(),
    );

    let band = parties[0].create_band_with("Wanderers", &[b]).unwrap();
    exchange_all(&mut parties);

    for party in &parties {
        assert_eq!(party.find_band_by_name("Wanderers"), Some(band));
        assert_eq!(
            party.list_founders(),
            {
                let mut expected = vec![(band, "A".to_owned()), (band, "B".to_owned())];
                expected.sort();
                expected
            }
        );
        assert!(party.is_member(&band, &a).unwrap());
        assert!(party.is_member(&band, &b).unwrap());
        assert!(!party.is_member(&band, &c).unwrap());
    }
}

#[test]
fn founder_claims_verify_independently() {
    let mut parties = multi_party(&["A", "B"]);
    exchange_all(&mut parties);
    let b = parties[1].identity();
    parties[0].create_band_with("Wanderers", &[b]).unwrap();

    // Drop one founder claim from the bundle; the other still stands.
    let mut bundle = parties[0].export_all();
    let a = parties[0].identity();
    bundle
        .claims
        .retain(|c| !(c.classify() == ClaimKind::Founder && c.er == a));

    let mut late = participant(9, "Late");
    let report = late.ingest(&bundle).unwrap();
    assert!(report.is_clean());

    let band = late.find_band_by_name("Wanderers").unwrap();
    assert!(late.is_member(&band, &b).unwrap());
    assert!(!late.is_member(&band, &a).unwrap());
}

#[test]
fn votes_by_members_admit_and_later_votes_supersede() {
    let mut parties = multi_party(&["A", "B", "C", "D"]);
    exchange_all(&mut parties);
    let ids: Vec<_> = parties.iter().map(|p| p.identity()).collect();

    let band = parties[0].create_band_with("Wanderers", &[ids[1]]).unwrap();
    exchange_all(&mut parties);

    // C is voted in by A; D votes for itself, which does not count.
    parties[0].vote(&band, &ids[2], true).unwrap();
    parties[3].vote(&band, &ids[3], true).unwrap();
    exchange_all(&mut parties);

    assert!(parties[1].is_member(&band, &ids[2]).unwrap());
    assert!(!parties[1].is_member(&band, &ids[3]).unwrap());

    // B votes C out: one up, one down, a tie does not admit.
    parties[1].vote(&band, &ids[2], false).unwrap();
    exchange_all(&mut parties);
    assert!(!parties[0].is_member(&band, &ids[2]).unwrap());

    // B changes its mind.
    parties[1].vote(&band, &ids[2], true).unwrap();
    exchange_all(&mut parties);
    assert!(parties[0].is_member(&band, &ids[2]).unwrap());

    let members = parties[3].members(&band).unwrap();
    assert_eq!(members.len(), 3);
}

#[test]
fn superseded_votes_survive_reload_but_not_resolution() {
    let fixture = TestFixture::ed25519([0x21; 32]).unwrap();
    let bob = participant(2, "Bob");

    let mut engine = Engine::startup(&fixture.options("Alice").init(true)).unwrap();
    engine.ingest(&bob.export_identity().unwrap()).unwrap();
    let band = engine.create_band("Wanderers").unwrap();
    engine.vote(&band, &bob.identity(), true).unwrap();
    engine.vote(&band, &bob.identity(), false).unwrap();
    engine.shutdown().unwrap();

    let snapshot = decode(&fixture.read_store().unwrap()).unwrap();
    let votes = snapshot
        .claims
        .iter()
        .filter(|c| c.classify() == ClaimKind::Association)
        .count();
    assert_eq!(votes, 2, "superseded claims are persisted for audit");

    let engine = Engine::startup(&fixture.options("Alice")).unwrap();
    assert!(!engine.is_member(&band, &bob.identity()).unwrap());

    let graph = MembershipGraph::from_claims(
        engine
            .ledger()
            .claims
            .founders()
            .chain(engine.ledger().claims.associations()),
    );
    assert_eq!(graph.members(&band).unwrap().len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Corruption
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn truncated_claim_record_fails_decode() {
    let fixture = TestFixture::ed25519([0x31; 32]).unwrap();
    let mut engine = Engine::startup(&fixture.options("Alice").init(true)).unwrap();
    engine.create_band("Wanderers").unwrap();
    engine.shutdown().unwrap();

    let text = fixture.read_store().unwrap();
    let cut = text.rfind(":CLAIM:").unwrap() + ":CLAIM:\ntrue\n".len();
    fixture.write_store(&text[..cut]).unwrap();

    let result = Engine::startup(&fixture.options("Alice"));
    assert!(matches!(result, Err(InbandError::Decode { .. })));
}

#[test]
fn tampered_claim_fails_strict_reload() {
    let fixture = TestFixture::ed25519([0x32; 32]).unwrap();
    let mut engine = Engine::startup(&fixture.options("Alice").init(true)).unwrap();
    let band = engine.create_band("Wanderers").unwrap();
    engine.shutdown().unwrap();

    let mut snapshot = decode(&fixture.read_store().unwrap()).unwrap();
    let target = snapshot
        .claims
        .iter_mut()
        .find(|c| c.classify() == ClaimKind::BandName)
        .unwrap();
    let tampered = target.id;
    let mut sig = target.signature.to_vec();
    sig[3] ^= 0x40;
    target.signature = sig.into();
    fixture.write_store(&encode(&snapshot)).unwrap();

    match Engine::startup(&fixture.options("Alice")) {
        Err(InbandError::Integrity { id, .. }) => assert_eq!(id, Some(tampered)),
        Err(other) => panic!("expected integrity error, got {other}"),
        Ok(_) => panic!("expected integrity error, got a loaded engine"),
    }

    let lenient = EngineConfig {
        strict_reload: false,
        ..EngineConfig::default()
    };
    let engine = Engine::startup(&fixture.options("Alice").config(lenient)).unwrap();
    assert!(engine.list_bands().is_empty());
    assert!(engine.find_band_by_name("Wanderers").is_none());
    // The founder claim is intact and still resolves.
    assert!(engine.is_member(&band, &engine.identity()).unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn flipping_any_signature_or_hash_byte_excludes_the_claim(
        field in 0usize..6,
        index in 0usize..32,
        bit in 0u8..8,
    ) {
        let mut alice = participant(1, "Alice");
        alice.create_band("Wanderers").unwrap();
        let mut snapshot = alice
            .ledger()
            .to_snapshot(None, Some(alice.identity()), None);

        let target = snapshot
            .claims
            .iter_mut()
            .find(|c| c.classify() == ClaimKind::BandName)
            .unwrap();
        let original = target.id;
        match field {
            0 => {
                let mut sig = target.signature.to_vec();
                sig[index] ^= 1 << bit;
                target.signature = sig.into();
            }
            1 => target.id.0[index] ^= 1 << bit,
            2 => target.by.0[index] ^= 1 << bit,
            3 => target.er.0[index] ^= 1 << bit,
            4 => target.ee.0[index] ^= 1 << bit,
            _ => target.subject.0[index] ^= 1 << bit,
        }
        let flipped = target.id;

        let decoded = decode(&encode(&snapshot)).unwrap();
        let (ledger, report) = Ledger::from_snapshot(&decoded).unwrap();

        prop_assert_eq!(report.rejected.len(), 1);
        prop_assert_eq!(report.rejected[0].id, flipped);
        prop_assert!(!ledger.claims.contains(&flipped));
        prop_assert!(!ledger.claims.contains(&original));
        prop_assert_eq!(ledger.claims.bands().count(), 0);
    }
}
