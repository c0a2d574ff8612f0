//! Statements: immutable, content-addressed byte blobs.
//!
//! A statement holds a public key in OpenSSH authorized-key text form, a
//! UTF-8 name, or one of the fixed topic labels. Claims never copy content;
//! they reference statements by [`HashId`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::HashId;

/// An immutable content blob and its SHA-256 identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    content: Bytes,
    id: HashId,
}

impl Statement {
    /// Create a statement, computing its id from the content.
    pub fn new(content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let id = HashId::of(&content);
        Self { content, id }
    }

    /// Rebuild a statement from persisted parts.
    ///
    /// The stored id is never trusted; it must match the recomputed hash.
    pub fn from_parts(content: impl Into<Bytes>, stored: HashId) -> Result<Self, ValidationError> {
        let statement = Self::new(content);
        if statement.id != stored {
            return Err(ValidationError::StatementHashMismatch {
                stored,
                computed: statement.id,
            });
        }
        Ok(statement)
    }

    /// The content address.
    pub fn id(&self) -> HashId {
        self.id
    }

    /// The raw content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The content as a cheap clone of the underlying buffer.
    pub fn content_bytes(&self) -> Bytes {
        self.content.clone()
    }

    /// The content as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    /// The content as text, replacing invalid UTF-8.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Fixed topic labels interned into every store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Names an identity or band.
    Name,
    /// Marks a band.
    Band,
    /// Marks a founding.
    Found,
    /// Membership relation used by association votes.
    In,
}

impl Topic {
    /// Every topic, in interning order.
    pub const ALL: [Topic; 4] = [Topic::Name, Topic::Band, Topic::Found, Topic::In];

    /// The label text.
    pub fn label(self) -> &'static str {
        match self {
            Topic::Name => "name",
            Topic::Band => "band",
            Topic::Found => "found",
            Topic::In => "in",
        }
    }

    /// The label statement.
    pub fn statement(self) -> Statement {
        Statement::new(Bytes::from_static(self.label().as_bytes()))
    }

    /// The label statement's id.
    pub fn id(self) -> HashId {
        HashId::of(self.label().as_bytes())
    }
}
