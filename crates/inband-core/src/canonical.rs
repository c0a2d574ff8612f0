//! Canonical claim encoding.
//!
//! A claim is signed over exactly this byte layout:
//!
//! ```text
//! offset  len  field
//!      0    1  format version (1)
//!      1    6  reserved, zero
//!      7    1  polarity: 0x00 affirm, 0xFF deny
//!      8    8  counter, little-endian
//!     16   32  by
//!     48   32  er
//!     80   32  ee
//!    112   32  subject
//! ```
//!
//! **This layout is frozen.** Any change breaks every existing signature.

use crate::types::HashId;

/// Current encoding format version.
pub const FORMAT_VERSION: u8 = 1;

/// Total length of the canonical encoding.
pub const CANONICAL_LEN: usize = 16 + 4 * 32;

const POLARITY_AFFIRM: u8 = 0x00;
const POLARITY_DENY: u8 = 0xFF;

/// Encode the signed fields of a claim.
pub fn canonical_bytes(
    affirm: bool,
    counter: u64,
    by: &HashId,
    er: &HashId,
    ee: &HashId,
    subject: &HashId,
) -> [u8; CANONICAL_LEN] {
    let mut buf = [0u8; CANONICAL_LEN];
    buf[0] = FORMAT_VERSION;
    buf[7] = if affirm { POLARITY_AFFIRM } else { POLARITY_DENY };
    buf[8..16].copy_from_slice(&counter.to_le_bytes());
    buf[16..48].copy_from_slice(by.as_bytes());
    buf[48..80].copy_from_slice(er.as_bytes());
    buf[80..112].copy_from_slice(ee.as_bytes());
    buf[112..144].copy_from_slice(subject.as_bytes());
    buf
}
