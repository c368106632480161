//! `manifest.json` generation for a staged pass
//!
//! The manifest maps every file in the staged directory to its SHA-1 digest.
//! The signature is computed over the serialized manifest, so the manifest
//! itself and the signature file are never listed.

use crate::codec::constants::{MANIFEST_FILE, SIGNATURE_FILE};
use crate::crypto::Digester;
use crate::Result;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Entry name to lowercase hex digest.
pub type Manifest = BTreeMap<String, String>;

/// Builder for generating `manifest.json`
pub struct ManifestBuilder<'a> {
    /// Staged directory root
    root: PathBuf,
    digester: &'a dyn Digester,
    /// Files with their digests
    files: Manifest,
}

/// Whether a root-relative entry name is produced by signing rather than staged.
pub fn is_signing_output(name: &str) -> bool {
    name == MANIFEST_FILE || name == SIGNATURE_FILE
}

/// Entry name of `path` below `root`, `/`-separated on every platform.
pub(crate) fn entry_name(root: &Path, path: &Path) -> io::Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unexpected path component in {}", relative.display()),
                ))
            }
        }
    }
    Ok(parts.join("/"))
}

impl<'a> ManifestBuilder<'a> {
    /// Create a new manifest builder for the given staged directory
    pub fn new(root: impl AsRef<Path>, digester: &'a dyn Digester) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            digester,
            files: Manifest::new(),
        }
    }

    /// Walk the staged directory and digest all files
    pub fn scan(&mut self) -> Result<&mut Self> {
        let root = self.root.clone();

        // WalkDir is not Send, so collect first
        let mut entries = Vec::new();
        for entry in WalkDir::new(&root).follow_links(true).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_dir() {
                continue;
            }
            let name = entry_name(&root, entry.path())?;
            if is_signing_output(&name) {
                continue;
            }
            entries.push((name, entry.into_path()));
        }

        let digester = self.digester;
        let digests = entries
            .par_iter()
            .map(|(name, path)| {
                let digest = digester.digest(path)?;
                tracing::debug!(file = %name, %digest, "digested");
                Ok((name.clone(), digest))
            })
            .collect::<Result<Vec<_>>>()?;

        self.files.extend(digests);
        Ok(self)
    }

    /// Digested files by entry name
    pub fn files(&self) -> &Manifest {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Serialize the manifest as a JSON object
    pub fn build(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.files)?)
    }

    /// Write `manifest.json` at the staged root and return its path
    pub fn write(&self) -> Result<PathBuf> {
        let path = self.root.join(MANIFEST_FILE);
        fs::write(&path, self.build()?)?;
        Ok(path)
    }
}

/// Scan `root`, write its `manifest.json`, and return the manifest
pub fn write_manifest(root: &Path, digester: &dyn Digester) -> Result<(PathBuf, Manifest)> {
    let mut builder = ManifestBuilder::new(root, digester);
    builder.scan()?;
    let path = builder.write()?;
    tracing::debug!(files = builder.file_count(), "wrote manifest");
    Ok((path, builder.files))
}
