//! Reading `.pkpass` archives.

use crate::bundle::manifest::{is_signing_output, Manifest};
use crate::codec::constants::{MANIFEST_FILE, PASS_FILE, SIGNATURE_FILE};
use crate::codec::from_slice;
use crate::crypto::sha1_hex;
use crate::model::Pass;
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

type Archive = ZipArchive<BufReader<File>>;

/// Validate that a path is a ZIP archive.
///
/// Checks that the file exists and has a ZIP signature.
pub fn validate_archive(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Pass archive not found: {}", path.display()),
        )));
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    file.read_exact(&mut magic)?;

    // PK\x03\x04, PK\x05\x06 (empty) or PK\x07\x08 (spanned)
    if &magic != b"PK" {
        return Err(Error::Zip(ZipError::InvalidArchive(
            "Not a valid ZIP/pkpass file".into(),
        )));
    }

    Ok(())
}

fn open(path: &Path) -> Result<Archive> {
    validate_archive(path)?;
    Ok(ZipArchive::new(BufReader::new(File::open(path)?))?)
}

/// Bytes of entry `name`, or `None` if the archive has no such entry.
fn read_entry(archive: &mut Archive, name: &str) -> Result<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Decode the `pass.json` entry of an archive.
///
/// Returns `Ok(None)` when the archive has no `pass.json`.
///
/// # Errors
///
/// - [`Error::Io`] / [`Error::Zip`] if the archive cannot be read
/// - [`Error::Json`] / [`Error::Schema`] if `pass.json` does not decode
///
/// # Examples
///
/// ```no_run
/// if let Some(pass) = pkpass::load_pass("boarding.pkpass")? {
///     println!("{} ({})", pass.description, pass.serial_number);
/// }
/// # Ok::<(), pkpass::Error>(())
/// ```
pub fn load_pass(path: impl AsRef<Path>) -> Result<Option<Pass>> {
    let path = path.as_ref();
    let mut archive = open(path)?;
    match read_entry(&mut archive, PASS_FILE)? {
        Some(data) => from_slice(&data).map(Some),
        None => {
            tracing::debug!(archive = %path.display(), "archive has no pass.json");
            Ok(None)
        }
    }
}

/// Parse the `manifest.json` entry of an archive.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Manifest> {
    let mut archive = open(path.as_ref())?;
    let data = read_entry(&mut archive, MANIFEST_FILE)?
        .ok_or(Error::Zip(ZipError::FileNotFound))?;
    Ok(serde_json::from_slice(&data)?)
}

/// Outcome of checking an archive's entries against its manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestReport {
    /// Entries whose digest matches the manifest.
    pub verified: Vec<String>,
    /// Entries whose digest differs from the manifest.
    pub mismatched: Vec<String>,
    /// Manifest entries with no archive entry.
    pub missing: Vec<String>,
    /// Archive entries the manifest does not list.
    pub unlisted: Vec<String>,
    /// Whether a `signature` entry is present. Its validity is not checked.
    pub has_signature: bool,
}

impl ManifestReport {
    /// Every entry is listed with a matching digest and a signature exists.
    pub fn is_consistent(&self) -> bool {
        self.mismatched.is_empty()
            && self.missing.is_empty()
            && self.unlisted.is_empty()
            && self.has_signature
    }
}

/// Recompute the SHA-1 digest of every entry and compare with `manifest.json`.
pub fn verify_archive(path: impl AsRef<Path>) -> Result<ManifestReport> {
    let mut archive = open(path.as_ref())?;
    let manifest: Manifest = match read_entry(&mut archive, MANIFEST_FILE)? {
        Some(data) => serde_json::from_slice(&data)?,
        None => return Err(Error::Zip(ZipError::FileNotFound)),
    };

    let mut report = ManifestReport::default();
    let mut seen = BTreeSet::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if name == SIGNATURE_FILE {
            report.has_signature = true;
        }
        if is_signing_output(&name) {
            continue;
        }

        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        match manifest.get(&name) {
            Some(expected) if *expected == sha1_hex(&data) => report.verified.push(name.clone()),
            Some(_) => report.mismatched.push(name.clone()),
            None => report.unlisted.push(name.clone()),
        }
        seen.insert(name);
    }

    report.missing = manifest
        .keys()
        .filter(|name| !seen.contains(*name))
        .cloned()
        .collect();
    report.verified.sort();
    report.mismatched.sort();
    report.unlisted.sort();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PassContent, PassType};
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_archive(dir: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join("test.pkpass");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    fn manifest_json(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let manifest: Manifest = entries
            .iter()
            .map(|(name, data)| (name.to_string(), sha1_hex(data)))
            .collect();
        serde_json::to_vec(&manifest).unwrap()
    }

    #[test]
    fn test_validate_archive() {
        let dir = TempDir::new().unwrap();
        let valid = write_archive(dir.path(), &[("pass.json", b"{}")]);
        assert!(validate_archive(&valid).is_ok());

        assert!(matches!(validate_archive(dir.path().join("missing.pkpass")), Err(Error::Io(_))));

        let invalid = dir.path().join("invalid.pkpass");
        fs::write(&invalid, b"not a zip file").unwrap();
        match validate_archive(&invalid) {
            Err(Error::Zip(ZipError::InvalidArchive(msg))) => assert!(msg.contains("pkpass"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_load_pass_without_pass_json_is_none() {
        let dir = TempDir::new().unwrap();
        let path = write_archive(dir.path(), &[("icon.png", b"abc")]);
        assert_eq!(load_pass(&path).unwrap(), None);
    }

    #[test]
    fn test_load_pass() {
        let dir = TempDir::new().unwrap();
        let pass = Pass::new("d", "o", "p", "serial", "t", PassType::StoreCard(PassContent::default()));
        let json = crate::codec::to_json_vec(&pass).unwrap();
        let path = write_archive(dir.path(), &[("pass.json", &json), ("icon.png", b"abc")]);

        assert_eq!(load_pass(&path).unwrap(), Some(pass));
    }

    #[test]
    fn test_load_pass_with_bad_document() {
        let dir = TempDir::new().unwrap();
        let path = write_archive(dir.path(), &[("pass.json", br#"{"formatVersion":1}"#)]);
        assert!(matches!(load_pass(&path), Err(Error::Schema { .. })));
    }

    #[test]
    fn test_read_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest = manifest_json(&[("icon.png", b"abc")]);
        let path = write_archive(dir.path(), &[("manifest.json", &manifest)]);

        let read = read_manifest(&path).unwrap();
        assert_eq!(read["icon.png"], "a9993e364706816aba3e25717850c26c9cd0d89d");

        let bare = TempDir::new().unwrap();
        let path = write_archive(bare.path(), &[("icon.png", b"abc")]);
        assert!(matches!(read_manifest(&path), Err(Error::Zip(ZipError::FileNotFound))));
    }

    #[test]
    fn test_verify_consistent_archive() {
        let dir = TempDir::new().unwrap();
        let files: &[(&str, &[u8])] = &[("icon.png", b"abc"), ("pass.json", b"{}")];
        let manifest = manifest_json(files);
        let path = write_archive(
            dir.path(),
            &[files[0], files[1], ("manifest.json", &manifest), ("signature", b"\x30\x80")],
        );

        let report = verify_archive(&path).unwrap();
        assert!(report.is_consistent(), "{report:?}");
        assert_eq!(report.verified, ["icon.png", "pass.json"]);
    }

    #[test]
    fn test_verify_reports_problems() {
        let dir = TempDir::new().unwrap();
        let manifest = manifest_json(&[("icon.png", b"abc"), ("logo.png", b"logo"), ("pass.json", b"{}")]);
        let path = write_archive(
            dir.path(),
            &[
                ("icon.png", b"abd"),
                ("pass.json", b"{}"),
                ("strip.png", b"strip"),
                ("manifest.json", &manifest),
            ],
        );

        let report = verify_archive(&path).unwrap();
        assert_eq!(report.verified, ["pass.json"]);
        assert_eq!(report.mismatched, ["icon.png"]);
        assert_eq!(report.missing, ["logo.png"]);
        assert_eq!(report.unlisted, ["strip.png"]);
        assert!(!report.has_signature);
        assert!(!report.is_consistent());
    }
}
