//! Scoped staging directory for one signing run.

use crate::codec::{constants::PASS_FILE, to_json_vec};
use crate::model::Pass;
use crate::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Working directory at `<dest>/<id>`, removed when dropped.
///
/// Removal happens on every exit path of the pipeline, including errors
/// raised halfway through signing. Cleanup failures are logged, not raised.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    /// Create `<dest>/<id>`, creating `dest` if needed.
    ///
    /// Fails if the staging directory already exists; an existing directory
    /// is never adopted (or later deleted).
    pub fn create(dest: &Path, id: &str) -> Result<Self> {
        if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id == "." || id == ".." {
            return Err(crate::Error::Config(format!(
                "pass identifier {id:?} cannot name a directory"
            )));
        }
        fs::create_dir_all(dest)?;
        let path = dest.join(id);
        fs::create_dir(&path)?;
        tracing::debug!(path = %path.display(), "created staging directory");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the asset tree under `assets` into the staging directory.
    ///
    /// Files are copied as-is; nothing is inspected or validated. Returns the
    /// number of files copied.
    pub fn copy_assets(&self, assets: &Path) -> Result<usize> {
        if !assets.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("asset directory not found: {}", assets.display()),
            )
            .into());
        }

        let mut copied = 0;
        for entry in WalkDir::new(assets).follow_links(true).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(assets)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let target = self.path.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                fs::copy(entry.path(), &target)?;
                copied += 1;
            }
        }
        tracing::debug!(files = copied, from = %assets.display(), "copied assets");
        Ok(copied)
    }

    /// Render `pass` into `pass.json`, replacing any copied file of that name.
    pub fn write_pass(&self, pass: &Pass) -> Result<PathBuf> {
        let path = self.path.join(PASS_FILE);
        fs::write(&path, to_json_vec(pass)?)?;
        Ok(path)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed staging directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove staging directory"
            ),
        }
    }
}

/// Stage `assets` plus the rendered `pass` at `<dest>/<id>`.
pub fn stage(assets: &Path, dest: &Path, id: &str, pass: &Pass) -> Result<StagingDir> {
    let staging = StagingDir::create(dest, id)?;
    staging.copy_assets(assets)?;
    staging.write_pass(pass)?;
    Ok(staging)
}
