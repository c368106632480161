//! Error types for pass encoding, staging, and signing.
//!
//! This module defines the [`enum@Error`] enum covering every failure a
//! public operation can surface: schema problems while decoding
//! `pass.json`, filesystem and archive I/O, and failures of the external
//! signing collaborators.
//!
//! Out-of-range colors are not errors; [`crate::model::rgb`] returns `None`.
//!
//! # See Also
//!
//! - [`crate::Result`] - Convenience type alias using this error

use std::fmt;
use thiserror::Error;

/// Error type for pkpass operations.
///
/// All public functions in this crate return [`crate::Result<T>`], which uses this error type.
///
/// # Examples
///
/// ```no_run
/// use pkpass::{load_pass, Error};
///
/// match load_pass("ticket.pkpass") {
///     Ok(Some(pass)) => println!("serial {}", pass.serial_number),
///     Ok(None) => eprintln!("archive has no pass.json"),
///     Err(Error::Schema { structure, field, .. }) => eprintln!("bad {structure}.{field}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Missing asset directories, permission failures, and similar platform
    /// errors are passed through unchanged.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `pass.json` or `manifest.json` is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document parsed as JSON but does not match the pass schema.
    ///
    /// Names the structure being decoded and the offending key.
    #[error("Invalid {structure}: field `{field}` {reason}")]
    Schema {
        structure: &'static str,
        field: String,
        reason: String,
    },

    /// A pass value has no JSON representation (e.g. a non-finite number).
    #[error("Cannot encode pass: {0}")]
    Encode(String),

    /// ZIP archive operation failed.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A signing-pipeline step failed.
    ///
    /// Raised for non-zero exits of external tools and for in-process
    /// signing failures. Packaging never runs after this error.
    #[error("{step} failed: {message}")]
    Signing { step: SigningStep, message: String },

    /// An external tool did not finish within the configured timeout.
    #[error("{step} timed out after {seconds}s")]
    Timeout { step: SigningStep, seconds: u64 },

    /// Invalid or malformed certificate or private key.
    #[error("Invalid certificate: {0}")]
    Certificate(String),

    /// Required credentials not configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid builder configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// The pipeline step an [`Error::Signing`] or [`Error::Timeout`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStep {
    /// Hashing a staged file.
    Digest,
    /// Writing `manifest.json`.
    Manifest,
    /// Producing the detached `signature`.
    Signature,
    /// Writing the `.pkpass` container.
    Package,
    /// The external pass signing tool (keychain path).
    PassTool,
}

impl fmt::Display for SigningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SigningStep::Digest => "digest",
            SigningStep::Manifest => "manifest",
            SigningStep::Signature => "signature",
            SigningStep::Package => "packaging",
            SigningStep::PassTool => "pass signing tool",
        };
        f.write_str(name)
    }
}

impl Error {
    pub(crate) fn schema(
        structure: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Schema {
            structure,
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn signing(step: SigningStep, message: impl Into<String>) -> Self {
        Error::Signing {
            step,
            message: message.into(),
        }
    }
}
