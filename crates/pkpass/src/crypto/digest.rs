//! File digests for the pass manifest.
//!
//! The platform verifies manifest entries with SHA-1, rendered as lowercase
//! hex with no trailing whitespace.

use crate::Result;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io;
use std::path::Path;

/// Computes the manifest digest of a staged file.
pub trait Digester: Send + Sync {
    /// Lowercase hex digest of the file at `path`.
    fn digest(&self, path: &Path) -> Result<String>;
}

/// In-process SHA-1 digester.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha1Digester;

impl Digester for Sha1Digester {
    fn digest(&self, path: &Path) -> Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha1::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Lowercase hex SHA-1 of `data`.
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}
