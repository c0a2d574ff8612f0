//! Startup options and engine configuration.

use std::path::{Path, PathBuf};

/// Name given to a fresh identity when none is supplied.
pub const DEFAULT_NAME: &str = "Anonymous";

/// Configuration for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Fail a reload when any claim is rejected. When off, rejected claims
    /// are logged and left out.
    pub strict_reload: bool,
    /// Verify signatures on claims received through [`ingest`].
    ///
    /// [`ingest`]: crate::Engine::ingest
    pub verify_on_ingest: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_reload: true,
            verify_on_ingest: true,
        }
    }
}

/// Everything [`Engine::startup`](crate::Engine::startup) needs.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    /// Private key file. The public key is read from `<key_path>.pub`.
    pub key_path: PathBuf,
    /// Store file.
    pub store_path: PathBuf,
    /// Display name for a fresh identity.
    pub name: String,
    /// Create a fresh store.
    pub init: bool,
    /// Allow `init` to overwrite an existing store.
    pub force: bool,
    pub config: EngineConfig,
}

impl StartupOptions {
    /// Options that reload `store_path`.
    pub fn new(key_path: impl Into<PathBuf>, store_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            store_path: store_path.into(),
            name: DEFAULT_NAME.to_owned(),
            init: false,
            force: false,
            config: EngineConfig::default(),
        }
    }

    /// Display name for a fresh identity; ignored on reload.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Create a fresh store instead of reloading.
    pub fn init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    /// Allow `init` to overwrite an existing store.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Engine behaviour once started.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Where the public key is read from.
    pub fn public_key_path(&self) -> PathBuf {
        public_key_path(&self.key_path)
    }
}

/// `<key_path>.pub`
pub fn public_key_path(key_path: &Path) -> PathBuf {
    let mut path = key_path.as_os_str().to_os_string();
    path.push(".pub");
    PathBuf::from(path)
}
