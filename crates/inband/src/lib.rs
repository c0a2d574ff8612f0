//! # Inband
//!
//! The unified API for Inband - identities, bands and membership derived
//! entirely from signed, content-addressed claims.
//!
//! ## Overview
//!
//! There is no server and no authority. Each participant holds a set of
//! statements (keys, names, labels) and claims (signed assertions over
//! four statements) and derives everything else from them:
//!
//! - **Identities**: a key statement plus a self-signed name claim
//! - **Bands**: a single-use band key plus its name claim and founder claims
//! - **Membership**: founders, and whoever current members vote in
//!
//! ## Key Concepts
//!
//! - **Claim**: Immutable. Never edited. Changes are new claims with a
//!   higher counter over the same `(by, er, ee, subject)` tuple.
//! - **Supersession**: only the highest-counter claim per tuple is used.
//! - **Verification**: every claim is checked against the key held by its
//!   `by` statement before it reaches any index.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use inband::{Engine, StartupOptions};
//!
//! fn example() -> inband::Result<()> {
//!     let options = StartupOptions::new("keys/id_ed25519", "alice.store")
//!         .name("Alice")
//!         .init(true);
//!
//!     // Mint the identity from the key files and write the store
//!     let mut engine = Engine::startup(&options)?;
//!
//!     // Found a band; the band key is discarded afterwards
//!     let band = engine.create_band("Wanderers")?;
//!     assert!(engine.is_member(&band, &engine.identity())?);
//!
//!     engine.shutdown()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `inband::core` - statements, claims, canonical encoding, signatures
//! - `inband::store` - stores, indices, persistence format
//! - `inband::membership` - membership resolution

pub mod bundle;
pub mod config;
pub mod engine;
pub mod error;
pub mod keys;

// Re-export component crates
pub use inband_core as core;
pub use inband_membership as membership;
pub use inband_store as store;

// Re-export main types for convenience
pub use bundle::{ClaimBundle, IngestReport};
pub use config::{EngineConfig, StartupOptions, DEFAULT_NAME};
pub use engine::Engine;
pub use error::{InbandError, Result};
pub use keys::KeyMaterial;

// Re-export commonly used core types
pub use inband_core::{
    canonical_bytes, Claim, ClaimBuilder, ClaimKind, HashId, KeyAlgorithm, PrivateKey, PublicKey,
    Statement, Topic, CANONICAL_LEN, COUNTER_SENTINEL, FORMAT_VERSION,
};
pub use inband_store::{Archive, FileArchive, MemoryArchive};
