//! Loading the local identity's key material.
//!
//! A key pair is two files: the private key (PKCS#1 PEM for RSA, OpenSSH
//! for Ed25519 or RSA) and `<path>.pub` holding the OpenSSH public key.
//! The public file must describe the same key as the private one.

use std::fmt;
use std::fs;
use std::path::Path;

use inband_core::{PrivateKey, PublicKey};

use crate::config::public_key_path;
use crate::error::{InbandError, Result};

/// A private key, the text it was read from, and its public half.
#[derive(Clone)]
pub struct KeyMaterial {
    pub private: PrivateKey,
    /// Private key text as supplied; persisted verbatim.
    pub pem: String,
    pub public: PublicKey,
}

impl KeyMaterial {
    /// Read `key_path` and `<key_path>.pub`.
    pub fn load(key_path: &Path) -> Result<Self> {
        let pem = read(key_path)?;
        let pub_path = public_key_path(key_path);
        let public_text = read(&pub_path)?;

        let material = Self::from_pem(pem)?;
        let public = PublicKey::from_openssh(public_text.trim()).map_err(|e| {
            InbandError::KeyLoad(format!("{}: {e}", pub_path.display()))
        })?;
        if public != material.public {
            return Err(InbandError::KeyLoad(format!(
                "{} does not match {}",
                pub_path.display(),
                key_path.display()
            )));
        }
        Ok(material)
    }

    /// Parse private key text, deriving the public half.
    pub fn from_pem(pem: String) -> Result<Self> {
        let private =
            PrivateKey::from_pem(&pem).map_err(|e| InbandError::KeyLoad(e.to_string()))?;
        let public = private.public_key();
        Ok(Self {
            private,
            pem,
            public,
        })
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private", &self.private)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| InbandError::KeyLoad(format!("{}: {e}", path.display())))
}
