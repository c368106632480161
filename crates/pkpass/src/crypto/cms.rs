//! In-process detached CMS signing through OpenSSL.
//!
//! Produces the same structure as `openssl smime -binary -sign -outform DER`:
//! a DER `ContentInfo` of type `signedData` with no encapsulated content,
//! carrying the signer certificate plus the chain certificates.

use crate::crypto::assets::SigningAssets;
use crate::crypto::signer::ManifestSigner;
use crate::error::SigningStep;
use crate::{Error, Result};
use openssl::cms::{CMSOptions, CmsContentInfo};
use openssl::stack::Stack;
use openssl::x509::X509;
use std::fs;
use std::path::Path;

/// Signs manifests with the `openssl` library instead of a child process.
pub struct NativeCmsSigner {
    assets: SigningAssets,
}

impl NativeCmsSigner {
    pub fn new(assets: SigningAssets) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &SigningAssets {
        &self.assets
    }

    /// Detached DER signature over `data`.
    pub fn sign_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let fail = |e: openssl::error::ErrorStack| Error::signing(SigningStep::Signature, e.to_string());

        let mut certs = Stack::<X509>::new().map_err(fail)?;
        for cert in &self.assets.chain {
            certs.push(cert.clone()).map_err(fail)?;
        }

        let cms = CmsContentInfo::sign(
            Some(&self.assets.certificate),
            Some(&self.assets.private_key),
            Some(&certs),
            Some(data),
            CMSOptions::DETACHED | CMSOptions::BINARY,
        )
        .map_err(fail)?;

        cms.to_der().map_err(fail)
    }
}

impl ManifestSigner for NativeCmsSigner {
    fn sign_manifest(&self, manifest: &Path, signature: &Path) -> Result<()> {
        let data = fs::read(manifest)?;
        let der = self.sign_bytes(&data)?;
        tracing::debug!(bytes = der.len(), "signed manifest in process");
        fs::write(signature, der)?;
        Ok(())
    }
}
