//! The Engine: unified API for one participant's identities and bands.
//!
//! The Engine owns the local private key, the ledger of statements and
//! claims, and the archive the ledger is persisted to. It is the only
//! place claims are created locally.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use inband_core::{
    Claim, ClaimBuilder, ClaimKind, HashId, KeyLookup, PrivateKey, Statement, Topic, COUNTER_SENTINEL,
};
use inband_membership::MembershipGraph;
use inband_store::{
    decode, encode, Archive, FileArchive, InsertResult, Ledger, Rejection, Snapshot, StoreError,
};
use tracing::{debug, info, warn};

use crate::bundle::{ClaimBundle, IngestReport};
use crate::config::{EngineConfig, StartupOptions};
use crate::error::{InbandError, Result};
use crate::keys::KeyMaterial;

/// One participant's view of the claim universe.
pub struct Engine<A: Archive = FileArchive> {
    /// The local identity's signing key.
    key: PrivateKey,
    /// Private key text, persisted as given.
    pem: String,
    /// The local identity's key statement.
    me: HashId,
    /// The local identity's name claim.
    name_claim: HashId,
    ledger: Ledger,
    archive: A,
    config: EngineConfig,
}

impl Engine<FileArchive> {
    /// Open the store named by `options.store_path`.
    ///
    /// | store file | `init` | `force` | result                       |
    /// |------------|--------|---------|------------------------------|
    /// | absent     | yes    | any     | fresh identity from key files |
    /// | present    | no     | any     | reload and verify            |
    /// | present    | yes    | yes     | overwrite with fresh identity |
    /// | absent     | no     | any     | `StoreState` error           |
    /// | present    | yes    | no      | `StoreState` error           |
    pub fn startup(options: &StartupOptions) -> Result<Self> {
        Self::open(options, FileArchive::new(&options.store_path))
    }
}

impl<A: Archive> Engine<A> {
    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Open a store held by `archive`, following the same rules as
    /// [`Engine::startup`]. No state is touched when the flags conflict
    /// with the archive.
    pub fn open(options: &StartupOptions, archive: A) -> Result<Self> {
        let exists = archive.exists()?;

        match (exists, options.init, options.force) {
            (false, true, _) => {
                let material = KeyMaterial::load(&options.key_path)?;
                info!(store = %archive.describe(), name = %options.name, "initialising store");
                Self::fresh(material, &options.name, archive, options.config)
            }
            (true, true, true) => {
                let material = KeyMaterial::load(&options.key_path)?;
                info!(store = %archive.describe(), name = %options.name, "overwriting existing store");
                Self::fresh(material, &options.name, archive, options.config)
            }
            (true, false, _) => Self::reload(archive, options.config),
            (false, false, _) => Err(InbandError::StoreState(format!(
                "no store at {}; initialise one first",
                archive.describe()
            ))),
            (true, true, false) => Err(InbandError::StoreState(format!(
                "store at {} already exists; force is required to overwrite it",
                archive.describe()
            ))),
        }
    }

    /// Mint a fresh identity and persist it.
    pub fn fresh(material: KeyMaterial, name: &str, archive: A, config: EngineConfig) -> Result<Self> {
        let mut ledger = Ledger::new();
        let me = ledger
            .statements
            .insert_key(material.public.statement()?, material.public.clone());
        let name_id = ledger.statements.intern(name.as_bytes().to_vec());

        let claim = ledger.make_claim(ClaimBuilder::identity(me, name_id), &material.private)?;
        let name_claim = claim.id;
        ledger.accept(claim)?;

        let mut engine = Self {
            key: material.private,
            pem: material.pem,
            me,
            name_claim,
            ledger,
            archive,
            config,
        };
        engine.persist()?;
        info!(identity = %me, name, "identity created");
        Ok(engine)
    }

    /// Decode and verify the archived store.
    pub fn reload(archive: A, config: EngineConfig) -> Result<Self> {
        let text = archive.load()?;
        let snapshot = decode(&text)?;
        let engine = Self::from_snapshot(&snapshot, archive, config)?;
        info!(
            store = %engine.archive.describe(),
            identity = %engine.me,
            claims = engine.ledger.claims.len(),
            "store reloaded"
        );
        Ok(engine)
    }

    fn from_snapshot(snapshot: &Snapshot, archive: A, config: EngineConfig) -> Result<Self> {
        let pem = snapshot
            .private_key
            .clone()
            .ok_or_else(|| InbandError::MissingAnchor("no :MYPRIVATE: record".into()))?;
        let me = snapshot
            .me
            .ok_or_else(|| InbandError::MissingAnchor("no :MYID: record".into()))?;
        let name_claim = snapshot
            .name_claim
            .ok_or_else(|| InbandError::MissingAnchor("no :MYNM: record".into()))?;
        let material = KeyMaterial::from_pem(pem)?;

        let (ledger, report) = Ledger::from_snapshot(snapshot)?;
        if let Some(first) = report.first_error() {
            if config.strict_reload {
                return Err(first.into());
            }
            warn!(
                rejected = report.rejected.len(),
                first = %first,
                "reload continuing without rejected entries"
            );
        }

        if ledger.statements.public_key(&me) != Some(&material.public) {
            return Err(InbandError::KeyLoad(format!(
                "stored private key does not match identity {me}"
            )));
        }
        match ledger.claims.get(&name_claim) {
            Some(stored) if stored.claim.by == me => {}
            _ => {
                return Err(InbandError::MissingAnchor(format!(
                    "name claim {name_claim} is not a claim by {me}"
                )))
            }
        }

        Ok(Self {
            key: material.private,
            pem: material.pem,
            me,
            name_claim,
            ledger,
            archive,
            config,
        })
    }

    /// Write the full store to the archive.
    pub fn persist(&mut self) -> Result<()> {
        let snapshot = self.ledger.to_snapshot(
            Some(self.pem.clone()),
            Some(self.me),
            Some(self.name_claim),
        );
        self.archive.save(&encode(&snapshot))?;
        info!(
            store = %self.archive.describe(),
            statements = snapshot.statements.len(),
            claims = snapshot.claims.len(),
            "store persisted"
        );
        Ok(())
    }

    /// Persist and release the engine, returning its archive.
    pub fn shutdown(mut self) -> Result<A> {
        self.persist()?;
        Ok(self.archive)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// The local identity's key statement.
    pub fn identity(&self) -> HashId {
        self.me
    }

    /// The local identity's name.
    pub fn name(&self) -> String {
        self.ledger
            .claims
            .get(&self.name_claim)
            .and_then(|s| self.ledger.statements.text(&s.claim.subject))
            .unwrap_or_default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bands and votes
    // ─────────────────────────────────────────────────────────────────────────

    /// Found a band with the local identity as sole founder.
    pub fn create_band(&mut self, name: &str) -> Result<HashId> {
        self.create_band_with(name, &[])
    }

    /// Found a band with the local identity and `cofounders`.
    ///
    /// A single-use band key signs the band-name claim and one founder
    /// claim per founder, then is dropped. Each founder claim stands on
    /// its own. Cofounders must be known identities.
    pub fn create_band_with(&mut self, name: &str, cofounders: &[HashId]) -> Result<HashId> {
        let mut founders = BTreeSet::from([self.me]);
        for cofounder in cofounders {
            if self.ledger.claims.identity_claim(cofounder).is_none() {
                return Err(InbandError::NotFound(format!("identity {cofounder}")));
            }
            founders.insert(*cofounder);
        }

        let band_key = PrivateKey::generate_ed25519();
        let public = band_key.public_key();
        let band = self.ledger.statements.insert_key(public.statement()?, public);
        let name_id = self.ledger.statements.intern(name.as_bytes().to_vec());

        let claim = self
            .ledger
            .make_claim(ClaimBuilder::band_name(band, name_id), &band_key)?;
        self.ledger.accept(claim)?;

        for founder in &founders {
            let claim = self
                .ledger
                .make_claim(ClaimBuilder::founder(band, *founder), &band_key)?;
            self.ledger.accept(claim)?;
        }

        info!(band = %band, name, founders = founders.len(), "band created");
        Ok(band)
    }

    /// Vote `identity` into (`affirm`) or out of `band`.
    ///
    /// Supersedes any earlier vote by the local identity on the same pair.
    pub fn vote(&mut self, band: &HashId, identity: &HashId, affirm: bool) -> Result<HashId> {
        if self.ledger.claims.band_claim(band).is_none() {
            return Err(InbandError::NotFound(format!("band {band}")));
        }
        self.relate(band, identity, Topic::In.label(), affirm)
    }

    /// Sign an association `er -label-> ee` as the local identity.
    ///
    /// The counter is one past the highest already used on the tuple.
    /// Tuples shaped like identity, band-name or founder claims are refused.
    pub fn relate(&mut self, er: &HashId, ee: &HashId, label: &str, affirm: bool) -> Result<HashId> {
        if er == ee {
            return Err(InbandError::InvalidOperation(format!(
                "an association needs distinct ends, got {er} twice"
            )));
        }
        let subject = self.ledger.statements.intern(label.as_bytes().to_vec());
        let builder = ClaimBuilder::new(self.me, *er, *ee, subject).affirm(affirm);
        let kind = builder.tuple().kind();
        if kind != ClaimKind::Association {
            return Err(InbandError::InvalidOperation(format!(
                "{er} -{label}-> {ee} would sign a {kind:?} claim"
            )));
        }

        let counter = match self.ledger.claims.latest_counter(&builder.tuple()) {
            None => 1,
            Some(COUNTER_SENTINEL) => {
                return Err(InbandError::InvalidOperation(format!(
                    "claims on {er} -{label}-> {ee} can no longer be superseded"
                )))
            }
            Some(n) => n + 1,
        };

        let claim = self.ledger.make_claim(builder.counter(counter), &self.key)?;
        let id = claim.id;
        self.ledger.accept(claim)?;
        debug!(claim = %id, er = %er, ee = %ee, label, affirm, counter, "relation signed");
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Every named identity, one entry per key, ordered by key.
    pub fn list_identities(&self) -> Vec<(HashId, String)> {
        let mut best: BTreeMap<HashId, &Claim> = BTreeMap::new();
        for claim in self.ledger.claims.identities() {
            best.entry(claim.by)
                .and_modify(|cur| {
                    if claim.outranks(cur) {
                        *cur = claim;
                    }
                })
                .or_insert(claim);
        }
        best.into_iter()
            .map(|(key, claim)| (key, self.text(&claim.subject)))
            .collect()
    }

    /// Every named band, one entry per band key, ordered by key.
    pub fn list_bands(&self) -> Vec<(HashId, String)> {
        let mut best: BTreeMap<HashId, &Claim> = BTreeMap::new();
        for claim in self.ledger.claims.bands() {
            best.entry(claim.by)
                .and_modify(|cur| {
                    if claim.outranks(cur) {
                        *cur = claim;
                    }
                })
                .or_insert(claim);
        }
        best.into_iter()
            .map(|(band, claim)| (band, self.text(&claim.ee)))
            .collect()
    }

    /// Every `(band, founder name)` pair. Founders with no known identity
    /// claim are shown by id.
    pub fn list_founders(&self) -> Vec<(HashId, String)> {
        let mut founders: Vec<(HashId, String)> = self
            .ledger
            .claims
            .founders()
            .map(|claim| {
                let name = self.name_of(&claim.er).unwrap_or_else(|| claim.er.to_hex());
                (claim.by, name)
            })
            .collect();
        founders.sort();
        founders
    }

    /// The identity currently holding `name`.
    pub fn find_identity_by_name(&self, name: &str) -> Option<HashId> {
        self.ledger
            .claims
            .name_claim(&HashId::of(name.as_bytes()))
            .map(|claim| claim.by)
    }

    /// The band named `name`. When several bands share a name the one with
    /// the highest-ranked band-name claim is returned.
    pub fn find_band_by_name(&self, name: &str) -> Option<HashId> {
        let name = HashId::of(name.as_bytes());
        self.ledger
            .claims
            .bands()
            .filter(|claim| claim.ee == name)
            .max_by_key(|claim| (claim.counter, Reverse(claim.id)))
            .map(|claim| claim.by)
    }

    /// The current name of an identity or band.
    pub fn name_of(&self, id: &HashId) -> Option<String> {
        if let Some(claim) = self.ledger.claims.identity_claim(id) {
            return self.ledger.statements.text(&claim.subject);
        }
        self.ledger
            .claims
            .band_claim(id)
            .and_then(|claim| self.ledger.statements.text(&claim.ee))
    }

    /// Founders and membership votes, ready to resolve.
    pub fn membership(&self) -> MembershipGraph {
        let claims = &self.ledger.claims;
        MembershipGraph::from_claims(claims.founders().chain(claims.associations()))
    }

    /// Whether `identity` is currently a member of `band`.
    pub fn is_member(&self, band: &HashId, identity: &HashId) -> Result<bool> {
        Ok(self.membership().is_member(band, identity)?)
    }

    /// The current members of `band`.
    pub fn members(&self, band: &HashId) -> Result<BTreeSet<HashId>> {
        Ok(self.membership().members(band)?)
    }

    fn text(&self, id: &HashId) -> String {
        self.ledger.statements.text(id).unwrap_or_default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Out-of-band exchange
    // ─────────────────────────────────────────────────────────────────────────

    /// The statements and claim that introduce the local identity.
    pub fn export_identity(&self) -> Result<ClaimBundle> {
        let claim = self
            .ledger
            .claims
            .get(&self.name_claim)
            .map(|s| s.claim.clone())
            .ok_or_else(|| InbandError::NotFound(format!("claim {}", self.name_claim)))?;

        let statements = [claim.by, claim.subject]
            .iter()
            .map(|id| {
                self.ledger
                    .statements
                    .get(id)
                    .cloned()
                    .ok_or_else(|| InbandError::NotFound(format!("statement {id}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ClaimBundle {
            statements,
            claims: vec![claim],
        })
    }

    /// Every statement and authoritative claim held, ordered by id.
    pub fn export_all(&self) -> ClaimBundle {
        let topics: BTreeSet<HashId> = Topic::ALL.iter().map(|t| t.id()).collect();

        let mut statements: Vec<Statement> = self
            .ledger
            .statements
            .iter()
            .filter(|s| !topics.contains(&s.id()))
            .cloned()
            .collect();
        statements.sort_by_key(|s| s.id());

        let mut claims: Vec<Claim> = self
            .ledger
            .claims
            .iter_authoritative()
            .map(|s| s.claim.clone())
            .collect();
        claims.sort_by_key(|c| c.id);

        ClaimBundle { statements, claims }
    }

    /// Verify and index a bundle received from another participant.
    ///
    /// Entries that fail verification are reported and skipped; they never
    /// reach the indices.
    pub fn ingest(&mut self, bundle: &ClaimBundle) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        for statement in &bundle.statements {
            match Statement::from_parts(statement.content_bytes(), statement.id()) {
                Ok(statement) => {
                    if self.ledger.statements.insert(statement) {
                        report.statements += 1;
                    }
                }
                Err(error) => {
                    warn!(statement = %statement.id(), %error, "rejected statement");
                    report.rejected.push(Rejection {
                        id: statement.id(),
                        error,
                    });
                }
            }
        }

        for claim in &bundle.claims {
            let result = if self.config.verify_on_ingest {
                self.ledger.accept(claim.clone())
            } else {
                self.ledger.accept_unverified(claim.clone())
            };

            match result {
                Ok(InsertResult::Inserted { .. }) => report.accepted += 1,
                Ok(InsertResult::Superseded { .. }) => report.superseded += 1,
                Ok(InsertResult::Outranked { .. }) => report.outranked += 1,
                Ok(InsertResult::AlreadyExists) => report.duplicates += 1,
                Err(StoreError::Integrity { id, source }) => {
                    warn!(claim = %id, error = %source, "rejected claim");
                    report.rejected.push(Rejection { id, error: source });
                }
                Err(other) => return Err(other.into()),
            }
        }

        info!(
            statements = report.statements,
            accepted = report.accepted,
            superseded = report.superseded,
            rejected = report.rejected.len(),
            "bundle ingested"
        );
        Ok(report)
    }
}
