//! # Inband Testkit
//!
//! Testing utilities for Inband.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known claims with expected canonical bytes and ids
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Key files on disk and in-memory participants
//!
//! ## Golden Vectors
//!
//! ```rust
//! use inband_testkit::vectors::{all_vectors, generate_claim_from_vector};
//!
//! for vector in all_vectors() {
//!     let claim = generate_claim_from_vector(&vector);
//!     assert_eq!(claim.id.to_hex(), vector.expected_claim_id);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use inband_testkit::generators::{claim_from_params, ClaimParams};
//!
//! proptest! {
//!     #[test]
//!     fn claim_id_is_deterministic(params: ClaimParams) {
//!         prop_assert_eq!(claim_from_params(&params), claim_from_params(&params));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use inband_testkit::fixtures::{exchange_all, multi_party};
//!
//! let mut parties = multi_party(&["Alice", "Bob"]);
//! exchange_all(&mut parties);
//! assert_eq!(parties[0].list_identities().len(), 2);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{exchange_all, multi_party, participant, TestFixture};
pub use generators::{claim_from_params, ClaimParams};
pub use vectors::{all_vectors, generate_claim_from_vector, verify_all_vectors, GoldenVector};
