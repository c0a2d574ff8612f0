//! The statement store: content-addressed, immutable blobs.
//!
//! Key-shaped statements are parsed once on insertion and the resulting
//! [`PublicKey`] is kept beside the content, so verification never
//! re-parses key text.

use std::collections::HashMap;

use bytes::Bytes;
use inband_core::{HashId, KeyLookup, PublicKey, Statement, Topic};

struct StoredStatement {
    statement: Statement,
    key: Option<PublicKey>,
}

/// Mapping from content hash to statement.
#[derive(Default)]
pub struct StatementStore {
    statements: HashMap<HashId, StoredStatement>,
}

impl StatementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the topic labels interned.
    pub fn with_topics() -> Self {
        let mut store = Self::new();
        for topic in Topic::ALL {
            store.insert(topic.statement());
        }
        store
    }

    /// Insert a statement. Returns `false` if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        let id = statement.id();
        if self.statements.contains_key(&id) {
            return false;
        }
        let key = statement
            .as_str()
            .and_then(|text| PublicKey::from_openssh(text).ok());
        self.statements.insert(id, StoredStatement { statement, key });
        true
    }

    /// Insert a parsed key as its OpenSSH statement, keeping the parsed form.
    pub fn insert_key(&mut self, statement: Statement, key: PublicKey) -> HashId {
        let id = statement.id();
        self.statements
            .entry(id)
            .or_insert(StoredStatement {
                statement,
                key: None,
            })
            .key = Some(key);
        id
    }

    /// Intern content, returning its id.
    pub fn intern(&mut self, content: impl Into<Bytes>) -> HashId {
        let statement = Statement::new(content);
        let id = statement.id();
        self.insert(statement);
        id
    }

    /// Get a statement by id.
    pub fn get(&self, id: &HashId) -> Option<&Statement> {
        self.statements.get(id).map(|s| &s.statement)
    }

    /// Statement content as text.
    pub fn text(&self, id: &HashId) -> Option<String> {
        self.get(id).map(Statement::to_text)
    }

    /// Iterate over all statements, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.values().map(|s| &s.statement)
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl KeyLookup for StatementStore {
    fn contains(&self, id: &HashId) -> bool {
        self.statements.contains_key(id)
    }

    fn public_key(&self, id: &HashId) -> Option<&PublicKey> {
        self.statements.get(id).and_then(|s| s.key.as_ref())
    }
}
