//! Archive trait: where a store's persisted text lives.
//!
//! Persistence is whole-file: the codec builds the complete text, and an
//! archive reads or writes it in one operation.

use crate::error::Result;

/// Backing location for a persisted store.
pub trait Archive {
    /// Whether a persisted store is present.
    fn exists(&self) -> Result<bool>;

    /// Read the full persisted text.
    fn load(&self) -> Result<String>;

    /// Replace the persisted text.
    fn save(&mut self, text: &str) -> Result<()>;

    /// Human-readable location, for logs and errors.
    fn describe(&self) -> String;
}
