//! Test fixtures and helpers.
//!
//! Key material on disk for startup tests, and in-memory engines for
//! multi-party scenarios.

use std::fs;
use std::io;
use std::path::PathBuf;

use inband::config::public_key_path;
use inband::{Engine, EngineConfig, KeyMaterial, MemoryArchive, PrivateKey, StartupOptions};
use rsa::RsaPrivateKey;
use tempfile::TempDir;

/// A key pair written to a temporary directory, next to a store path.
pub struct TestFixture {
    pub key: PrivateKey,
    /// Private key file; the public key is `<key_path>.pub`.
    pub key_path: PathBuf,
    /// Store file. Not created until an engine persists to it.
    pub store_path: PathBuf,
    dir: TempDir,
}

impl TestFixture {
    /// Fixture with a deterministic Ed25519 key.
    pub fn ed25519(seed: [u8; 32]) -> io::Result<Self> {
        Self::from_key(PrivateKey::from_ed25519_seed(&seed))
    }

    /// Fixture with a fresh RSA key of `bits` bits.
    pub fn rsa(bits: usize) -> io::Result<Self> {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), bits)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Self::from_key(PrivateKey::Rsa(key))
    }

    /// Write `key` and its public half into a fresh temporary directory.
    pub fn from_key(key: PrivateKey) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let key_path = dir.path().join("id");
        let store_path = dir.path().join("inband.store");

        let pem = key
            .to_pem()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        let public = key
            .public_key()
            .to_openssh()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        fs::write(&key_path, pem)?;
        fs::write(public_key_path(&key_path), format!("{public} test@inband\n"))?;

        Ok(Self {
            key,
            key_path,
            store_path,
            dir,
        })
    }

    /// Startup options for this fixture, reloading by default.
    pub fn options(&self, name: &str) -> StartupOptions {
        StartupOptions::new(&self.key_path, &self.store_path).name(name)
    }

    /// The temporary directory holding the fixture's files.
    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Read the store file.
    pub fn read_store(&self) -> io::Result<String> {
        fs::read_to_string(&self.store_path)
    }

    /// Overwrite the store file.
    pub fn write_store(&self, text: &str) -> io::Result<()> {
        fs::write(&self.store_path, text)
    }
}

/// An in-memory engine for a deterministic Ed25519 identity.
pub fn participant(seed: u8, name: &str) -> Engine<MemoryArchive> {
    let pem = PrivateKey::from_ed25519_seed(&[seed; 32])
        .to_pem()
        .expect("ed25519 keys always encode");
    let material = KeyMaterial::from_pem(pem).expect("encoded key parses");
    Engine::fresh(material, name, MemoryArchive::new(), EngineConfig::default())
        .expect("fresh engine")
}

/// Create several named participants, each with a distinct key.
pub fn multi_party(names: &[&str]) -> Vec<Engine<MemoryArchive>> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| participant(i as u8 + 1, name))
        .collect()
}

/// Have every participant ingest every other participant's full export.
pub fn exchange_all(engines: &mut [Engine<MemoryArchive>]) {
    let bundles: Vec<_> = engines.iter().map(|e| e.export_all()).collect();
    for (i, engine) in engines.iter_mut().enumerate() {
        for (j, bundle) in bundles.iter().enumerate() {
            if i != j {
                let report = engine.ingest(bundle).expect("ingest");
                assert!(report.is_clean(), "rejected entries: {:?}", report.rejected);
            }
        }
    }
}
