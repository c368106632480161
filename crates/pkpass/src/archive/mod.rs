//! `.pkpass` archive handling.
//!
//! Provides functionality for packaging a signed staging directory and for
//! reading pass archives back.

pub mod create;
pub mod load;

pub use create::{create_pkpass, publish_with, CompressionLevel};
pub use load::{load_pass, read_manifest, validate_archive, verify_archive, ManifestReport};
