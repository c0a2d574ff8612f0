//! File-backed archive.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::Archive;

/// A store file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileArchive {
    path: PathBuf,
}

impl FileArchive {
    /// Archive at `path`. Nothing is touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Archive for FileArchive {
    fn exists(&self) -> Result<bool> {
        Ok(self.path.try_exists()?)
    }

    fn load(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                debug!(path = %self.path.display(), bytes = text.len(), "loaded store");
                Ok(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(self.describe()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, text: &str) -> Result<()> {
        // Write to a sibling temp file, then rename over the store.
        let temp = self.temp_path();
        let mut file = fs::File::create(&temp)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), bytes = text.len(), "saved store");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = FileArchive::new(dir.path().join("alice.store"));

        assert!(!archive.exists().unwrap());
        archive.save(":MYID:\nAAAA\n").unwrap();
        assert!(archive.exists().unwrap());
        assert_eq!(archive.load().unwrap(), ":MYID:\nAAAA\n");
        assert!(!dir.path().join("alice.store.tmp").exists());
    }

    #[test]
    fn test_save_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = FileArchive::new(dir.path().join("store"));

        archive.save("first").unwrap();
        archive.save("second").unwrap();
        assert_eq!(archive.load().unwrap(), "second");
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FileArchive::new(dir.path().join("absent"));
        assert!(matches!(archive.load(), Err(StoreError::NotFound(_))));
    }
}
