//! Pass bundle assembly.
//!
//! This module provides functionality to:
//! - Stage an asset directory plus the rendered `pass.json` at `<dest>/<id>`
//! - Digest the staged files into `manifest.json`
//!
//! # Staged Layout
//!
//! | Entry | Produced by |
//! |-------|-------------|
//! | copied assets (`icon.png`, `logo.png`, `en.lproj/...`) | [`StagingDir::copy_assets`] |
//! | `pass.json` | [`StagingDir::write_pass`] |
//! | `manifest.json` | [`ManifestBuilder::write`] |
//! | `signature` | a [`crate::crypto::ManifestSigner`] |
//!
//! # Examples
//!
//! ```no_run
//! use pkpass::bundle::{stage, write_manifest};
//! use pkpass::crypto::Sha1Digester;
//! # use pkpass::model::{Pass, PassContent, PassType};
//! # let pass = Pass::new("d", "o", "p", "s", "t", PassType::GenericPass(PassContent::default()));
//! use std::path::Path;
//!
//! let staging = stage(Path::new("assets"), Path::new("out"), "0123", &pass)?;
//! let (_path, manifest) = write_manifest(staging.path(), &Sha1Digester)?;
//! println!("{} files", manifest.len());
//! # Ok::<(), pkpass::Error>(())
//! ```

pub mod manifest;
pub mod staging;

pub use manifest::{write_manifest, Manifest, ManifestBuilder};
pub use staging::{stage, StagingDir};
