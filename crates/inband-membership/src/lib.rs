//! # Inband Membership
//!
//! Who is in a band, derived from founder claims and membership votes.
//!
//! ## Overview
//!
//! Membership is circular: an identity is a member if it founded the band,
//! or if current members vote it in, and members are exactly the
//! identities whose votes count. [`MembershipGraph`] resolves this by
//! iterative relaxation instead of recursion:
//!
//! 1. Seed the member set with the band's founders.
//! 2. Tally every vote about the band, counting only votes cast by members.
//! 3. Admit each candidate with strictly more upvotes than downvotes.
//! 4. Repeat until a round admits nobody.
//!
//! The member set only grows, and it is bounded by the identities named
//! in the claim set, so resolution always terminates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inband_membership::MembershipGraph;
//!
//! let graph = MembershipGraph::from_claims(store.founders().chain(store.associations()));
//! let members = graph.members(&band)?;
//! ```

pub mod error;
pub mod state;

pub use error::{MembershipError, Result};
pub use state::{MembershipGraph, Vote};
