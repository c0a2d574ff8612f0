//! # Inband Core
//!
//! Pure primitives for Inband: statements, claims, canonical encoding and
//! the signature engine.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! content-addressed, signed data structures.
//!
//! ## Key Types
//!
//! - [`HashId`] - SHA-256 content address of every statement and claim
//! - [`Statement`] - Immutable opaque content (public keys, names, labels)
//! - [`Claim`] - A signed assertion relating four statements
//! - [`ClaimKind`] - Identity / band-name / founder / association shape
//! - [`PublicKey`] / [`PrivateKey`] - RSA and Ed25519 keys behind one enum
//!
//! ## Canonical Encoding
//!
//! Claims are signed over a fixed 144-byte layout. See [`canonical`].

pub mod canonical;
pub mod claim;
pub mod crypto;
pub mod error;
pub mod statement;
pub mod types;
pub mod validation;

pub use canonical::{canonical_bytes, CANONICAL_LEN, FORMAT_VERSION};
pub use claim::{Claim, ClaimBuilder, ClaimKind, ClaimTuple, COUNTER_SENTINEL};
pub use crypto::{KeyAlgorithm, PrivateKey, PublicKey};
pub use error::{CoreError, ValidationError};
pub use statement::{Statement, Topic};
pub use types::HashId;
pub use validation::{untampered, validate_claim, KeyLookup};
