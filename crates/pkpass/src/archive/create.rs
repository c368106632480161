//! `.pkpass` archive creation.
//!
//! Packs a signed staging directory into a ZIP container. Entry names are
//! paths relative to the staging root with `/` separators (`icon.png`,
//! `fr.lproj/logo.png`), the same keys the manifest uses; the staging
//! directory's own name never appears.
//!
//! Archives are published atomically: the ZIP is written inside a temporary
//! directory next to the destination and renamed into place only once it is
//! complete, so a failed run never leaves a partial `.pkpass` behind.
//!
//! For the reverse operation, see the [`load`](super::load) module.

use crate::bundle::manifest::entry_name;
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// ZIP compression level for archive creation.
///
/// Use the provided constants for common use cases, or [`CompressionLevel::new`]
/// for custom levels.
///
/// ```
/// use pkpass::archive::CompressionLevel;
///
/// let custom = CompressionLevel::new(12);
/// assert_eq!(custom.level(), 9);
/// assert_eq!(CompressionLevel::default().level(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u32);

impl CompressionLevel {
    /// No compression (entries are stored).
    pub const NONE: CompressionLevel = CompressionLevel(0);

    /// Default compression (level 6).
    pub const DEFAULT: CompressionLevel = CompressionLevel(6);

    /// Maximum compression (level 9).
    pub const MAX: CompressionLevel = CompressionLevel(9);

    /// Creates a compression level from 0-9.
    ///
    /// Values greater than 9 are clamped to 9.
    #[must_use]
    pub fn new(level: u32) -> Self {
        CompressionLevel(level.min(9))
    }

    /// Returns the compression level value (0-9).
    #[must_use]
    pub fn level(&self) -> u32 {
        self.0
    }

    fn options(self) -> SimpleFileOptions {
        if self.0 == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(self.0)))
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for CompressionLevel {
    fn from(level: u32) -> Self {
        CompressionLevel::new(level)
    }
}

/// Produce `output` through `write`, which receives a temporary path in the
/// same directory. `output` only appears once `write` has succeeded.
///
/// # Errors
///
/// Propagates the error of `write`; nothing is left at `output` or in the
/// temporary location.
pub fn publish_with<F>(output: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = output.file_name().ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid archive path: {}", output.display()),
        ))
    })?;

    fs::create_dir_all(parent)?;
    let scratch = tempfile::Builder::new()
        .prefix(".pkpass-")
        .tempdir_in(parent)?;
    let partial = scratch.path().join(file_name);

    write(&partial)?;
    fs::rename(&partial, output)?;
    Ok(())
}

/// Creates a `.pkpass` archive from a signed staging directory.
///
/// Every regular file below `staged_dir` becomes one entry; directories get
/// no entries of their own.
///
/// # Errors
///
/// Returns [`Error::Io`] if:
/// - The staging directory doesn't exist or is not a directory
/// - The output file cannot be created
/// - Any file cannot be read during archiving
///
/// Returns [`Error::Zip`] if the ZIP archive cannot be written.
pub fn create_pkpass(
    staged_dir: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    compression_level: CompressionLevel,
) -> Result<()> {
    let staged_dir = staged_dir.as_ref();
    let output_path = output_path.as_ref();

    if !staged_dir.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Staging directory not found: {}", staged_dir.display()),
        )));
    }

    publish_with(output_path, |partial| {
        write_zip(staged_dir, partial, compression_level)
    })?;
    tracing::info!(archive = %output_path.display(), "wrote pass archive");
    Ok(())
}

fn write_zip(staged_dir: &Path, output: &Path, compression_level: CompressionLevel) -> Result<()> {
    let file = File::create(output)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = compression_level.options();

    let walker = WalkDir::new(staged_dir)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_dir() {
            continue;
        }
        let name = entry_name(staged_dir, entry.path())?;

        zip.start_file(name.as_str(), options)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut zip)?;
    }

    let mut writer = zip.finish()?;
    io::Write::flush(&mut writer)?;
    Ok(())
}
