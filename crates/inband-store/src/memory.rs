//! In-memory archive, primarily for tests.

use crate::error::{Result, StoreError};
use crate::traits::Archive;

/// An archive that keeps the persisted text in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    text: Option<String>,
    saves: usize,
}

impl MemoryArchive {
    /// An empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// An archive already holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            saves: 0,
        }
    }

    /// The persisted text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// How many times the archive has been saved to.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Archive for MemoryArchive {
    fn exists(&self) -> Result<bool> {
        Ok(self.text.is_some())
    }

    fn load(&self) -> Result<String> {
        self.text
            .clone()
            .ok_or_else(|| StoreError::NotFound(self.describe()))
    }

    fn save(&mut self, text: &str) -> Result<()> {
        self.text = Some(text.to_owned());
        self.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_owned()
    }
}
