//! The flat text format a store is persisted in.
//!
//! A file is a sequence of records. Each record is a `:TAG:` line followed
//! by a fixed number of field lines:
//!
//! ```text
//! :MYPRIVATE:   base64(private key text)
//! :MYID:        base64(identity statement hash)
//! :MYNM:        base64(name claim hash)
//! :STMT:        base64(content), base64(hash)
//! :CLAIM:       true|false, counter, base64(by), base64(er), base64(ee),
//!               base64(subject), base64(signature), base64(hash)
//! ```
//!
//! Hashes are carried as written. Checking them against content and
//! signatures is the ledger's job, not the codec's.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use inband_core::{Claim, HashId};

use crate::error::{Result, StoreError};

const MYPRIVATE: &str = "MYPRIVATE";
const MYID: &str = "MYID";
const MYNM: &str = "MYNM";
const STMT: &str = "STMT";
const CLAIM: &str = "CLAIM";

/// A statement as written, before its hash is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    pub content: Bytes,
    pub id: HashId,
}

/// Decoded contents of a store file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Private key text (PEM or OpenSSH).
    pub private_key: Option<String>,
    /// The local identity's key statement.
    pub me: Option<HashId>,
    /// The local identity's name claim.
    pub name_claim: Option<HashId>,
    pub statements: Vec<RawStatement>,
    pub claims: Vec<Claim>,
}

/// Encode a snapshot. Anchors come first, then statements, then claims.
pub fn encode(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    if let Some(key) = &snapshot.private_key {
        record(&mut out, MYPRIVATE, &[STANDARD.encode(key)]);
    }
    if let Some(me) = &snapshot.me {
        record(&mut out, MYID, &[STANDARD.encode(me)]);
    }
    if let Some(name) = &snapshot.name_claim {
        record(&mut out, MYNM, &[STANDARD.encode(name)]);
    }
    for stmt in &snapshot.statements {
        record(
            &mut out,
            STMT,
            &[STANDARD.encode(&stmt.content), STANDARD.encode(stmt.id)],
        );
    }
    for claim in &snapshot.claims {
        record(
            &mut out,
            CLAIM,
            &[
                claim.affirm.to_string(),
                claim.counter.to_string(),
                STANDARD.encode(claim.by),
                STANDARD.encode(claim.er),
                STANDARD.encode(claim.ee),
                STANDARD.encode(claim.subject),
                STANDARD.encode(&claim.signature),
                STANDARD.encode(claim.id),
            ],
        );
    }

    out
}

fn record(out: &mut String, tag: &str, fields: &[String]) {
    out.push(':');
    out.push_str(tag);
    out.push_str(":\n");
    for field in fields {
        out.push_str(field);
        out.push('\n');
    }
}

/// Decode a store file.
///
/// Any malformed record fails the whole decode; nothing partial is returned.
pub fn decode(text: &str) -> Result<Snapshot> {
    let mut snapshot = Snapshot::default();
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l)).peekable();

    while let Some((line, header)) = lines.next() {
        let tag = parse_tag(header).ok_or_else(|| {
            StoreError::decode(line, format!("expected a record tag, found {header:?}"))
        })?;

        let arity = match tag {
            MYPRIVATE | MYID | MYNM => 1,
            STMT => 2,
            CLAIM => 8,
            other => return Err(StoreError::decode(line, format!("unknown record tag :{other}:"))),
        };

        let mut fields = Vec::with_capacity(arity);
        while fields.len() < arity {
            match lines.next_if(|(_, l)| parse_tag(l).is_none()) {
                Some(field) => fields.push(field),
                None => {
                    return Err(StoreError::decode(
                        line,
                        format!(
                            "truncated :{tag}: record: expected {arity} fields, found {}",
                            fields.len()
                        ),
                    ))
                }
            }
        }

        match tag {
            MYPRIVATE => {
                let (n, f) = fields[0];
                let bytes = base64_field(n, f)?;
                let key = String::from_utf8(bytes)
                    .map_err(|_| StoreError::decode(n, "private key is not UTF-8"))?;
                set_once(&mut snapshot.private_key, key, line, tag)?;
            }
            MYID => {
                let (n, f) = fields[0];
                set_once(&mut snapshot.me, hash_field(n, f)?, line, tag)?;
            }
            MYNM => {
                let (n, f) = fields[0];
                set_once(&mut snapshot.name_claim, hash_field(n, f)?, line, tag)?;
            }
            STMT => {
                let content = base64_field(fields[0].0, fields[0].1)?;
                let id = hash_field(fields[1].0, fields[1].1)?;
                snapshot.statements.push(RawStatement {
                    content: content.into(),
                    id,
                });
            }
            _ => snapshot.claims.push(claim_fields(&fields)?),
        }
    }

    Ok(snapshot)
}

fn claim_fields(fields: &[(usize, &str)]) -> Result<Claim> {
    let affirm = match fields[0] {
        (_, "true") => true,
        (_, "false") => false,
        (n, other) => {
            return Err(StoreError::decode(
                n,
                format!("expected true or false, found {other:?}"),
            ))
        }
    };
    let (n, counter) = fields[1];
    let counter = counter
        .parse::<u64>()
        .map_err(|e| StoreError::decode(n, format!("bad counter {counter:?}: {e}")))?;

    Ok(Claim {
        affirm,
        counter,
        by: hash_field(fields[2].0, fields[2].1)?,
        er: hash_field(fields[3].0, fields[3].1)?,
        ee: hash_field(fields[4].0, fields[4].1)?,
        subject: hash_field(fields[5].0, fields[5].1)?,
        signature: base64_field(fields[6].0, fields[6].1)?.into(),
        id: hash_field(fields[7].0, fields[7].1)?,
    })
}

fn parse_tag(line: &str) -> Option<&str> {
    line.strip_prefix(':')?.strip_suffix(':')
}

fn set_once<T>(slot: &mut Option<T>, value: T, line: usize, tag: &str) -> Result<()> {
    if slot.is_some() {
        return Err(StoreError::decode(line, format!("duplicate :{tag}: record")));
    }
    *slot = Some(value);
    Ok(())
}

fn base64_field(line: usize, field: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(field)
        .map_err(|e| StoreError::decode(line, format!("bad base64: {e}")))
}

fn hash_field(line: usize, field: &str) -> Result<HashId> {
    let bytes = base64_field(line, field)?;
    HashId::try_from(bytes.as_slice())
        .map_err(|_| StoreError::decode(line, format!("expected 32-byte hash, found {} bytes", bytes.len())))
}
