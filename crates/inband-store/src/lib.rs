//! # Inband Store
//!
//! Storage for statements and claims, the indices derived from them, and
//! the flat text format they are persisted in.
//!
//! ## Key Types
//!
//! - [`StatementStore`] - content-addressed statements, with parsed keys
//! - [`ClaimStore`] - every accepted claim plus the authoritative indices
//! - [`Ledger`] - both stores together; verifies claims before indexing
//! - [`Snapshot`] - the decoded form of a persisted store file
//! - [`Archive`] - where a snapshot's text lives ([`FileArchive`], [`MemoryArchive`])
//!
//! ## Design Notes
//!
//! - **Supersession**: for each `(by, er, ee, subject)` tuple only the claim
//!   with the highest counter is authoritative. Others are kept for audit.
//! - **Derived indices**: identities, names, bands, founders and
//!   associations are never persisted. They are rebuilt from the claim set
//!   on reload and can be recomputed at any time.
//! - **Whole-file I/O**: a store file is read in full, then decoded; it is
//!   built in full, then written once through a temp file and a rename.

pub mod claims;
pub mod codec;
pub mod error;
pub mod file;
pub mod ledger;
pub mod memory;
pub mod statements;
pub mod traits;

pub use claims::{ClaimStore, InsertResult, StoredClaim};
pub use codec::{decode, encode, RawStatement, Snapshot};
pub use error::{Result, StoreError};
pub use file::FileArchive;
pub use ledger::{Ledger, LoadReport, Rejection};
pub use memory::MemoryArchive;
pub use statements::StatementStore;
pub use traits::Archive;
