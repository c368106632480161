//! PassSigner builder API
//!
//! Provides a builder pattern interface for turning a [`Pass`] plus an asset
//! directory into a signed `.pkpass` archive.
//!
//! # Pipeline
//!
//! 1. Assign the pass identifier (generated, or supplied by the caller) and
//!    overwrite the serial number with it
//! 2. Stage `<dest>/<id>` with the assets and the rendered `pass.json`
//! 3. Either write `manifest.json`, sign it into `signature`, and package
//!    everything, or hand the staged directory to the pass signing tool
//! 4. Publish `<dest>/<id>.pkpass` atomically
//!
//! The staging directory is removed on every exit path. A failure in any step
//! aborts the run before packaging and leaves no archive behind.

use crate::archive::{create_pkpass, publish_with, CompressionLevel};
use crate::bundle::{stage, write_manifest};
use crate::codec::constants::{ARCHIVE_EXTENSION, SIGNATURE_FILE};
use crate::crypto::{
    Digester, ManifestSigner, OpensslCommandSigner, PassTool, Sha1Digester, SignpassTool,
};
use crate::identifier::generate_pass_id;
use crate::model::Pass;
use crate::process::DEFAULT_TOOL_TIMEOUT;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the manifest (or the whole pass) gets signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningBackend {
    /// `openssl smime` child process with certificate and key files.
    #[default]
    OpensslCommand,
    /// In-process CMS signing through the `openssl` library.
    NativeCms,
    /// The `signpass` tool using the keychain identity; it also packages.
    PassTool,
}

/// Wallet pass signer with builder pattern API.
///
/// # Example
///
/// ```no_run
/// use pkpass::PassSigner;
/// # use pkpass::model::{Pass, PassContent, PassType};
/// # let pass = Pass::new("d", "o", "p", "s", "t", PassType::GenericPass(PassContent::default()));
///
/// let (archive, id) = PassSigner::new()
///     .openssl("pass-cert.pem", "pass-key.pem")
///     .wwdr_certificate("AppleWWDRCA.pem")
///     .sign("assets", "out", pass)?;
/// # Ok::<(), pkpass::Error>(())
/// ```
pub struct PassSigner {
    backend: SigningBackend,
    certificate: Option<PathBuf>,
    private_key: Option<PathBuf>,
    wwdr_certificate: Option<PathBuf>,
    key_password: Option<SecretString>,
    openssl_program: Option<PathBuf>,
    pass_tool_program: Option<PathBuf>,
    timeout: Duration,
    compression_level: CompressionLevel,
    digester: Option<Box<dyn Digester>>,
    manifest_signer: Option<Box<dyn ManifestSigner>>,
    pass_tool: Option<Box<dyn PassTool>>,
}

impl PassSigner {
    /// Create a new PassSigner builder.
    pub fn new() -> Self {
        Self {
            backend: SigningBackend::default(),
            certificate: None,
            private_key: None,
            wwdr_certificate: None,
            key_password: None,
            openssl_program: None,
            pass_tool_program: None,
            timeout: DEFAULT_TOOL_TIMEOUT,
            compression_level: CompressionLevel::DEFAULT,
            digester: None,
            manifest_signer: None,
            pass_tool: None,
        }
    }

    /// Sign with `openssl smime` using a certificate and private key file.
    pub fn openssl(self, certificate: impl AsRef<Path>, private_key: impl AsRef<Path>) -> Self {
        self.backend(SigningBackend::OpensslCommand)
            .certificate(certificate)
            .private_key(private_key)
    }

    /// Sign with the pass signing tool and the keychain identity.
    pub fn pass_tool(self) -> Self {
        self.backend(SigningBackend::PassTool)
    }

    pub fn backend(mut self, backend: SigningBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Set certificate file path (PEM, or DER for the native backend).
    pub fn certificate(mut self, path: impl AsRef<Path>) -> Self {
        self.certificate = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set private key file path.
    pub fn private_key(mut self, path: impl AsRef<Path>) -> Self {
        self.private_key = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the chain certificate embedded in the signature.
    ///
    /// Defaults to `wwdr.pem` in the working directory.
    pub fn wwdr_certificate(mut self, path: impl AsRef<Path>) -> Self {
        self.wwdr_certificate = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the private key passphrase.
    ///
    /// The password is stored securely and will be zeroized when dropped.
    pub fn key_password(mut self, password: impl Into<String>) -> Self {
        self.key_password = Some(SecretString::new(password.into()));
        self
    }

    pub fn openssl_program(mut self, path: impl AsRef<Path>) -> Self {
        self.openssl_program = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn pass_tool_program(mut self, path: impl AsRef<Path>) -> Self {
        self.pass_tool_program = Some(path.as_ref().to_path_buf());
        self
    }

    /// Deadline for each external tool invocation. Default is 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set ZIP compression level for the archive (0-9).
    ///
    /// 0 = stored, 9 = maximum compression. Default is 6.
    pub fn compression_level(mut self, level: u32) -> Self {
        self.compression_level = CompressionLevel::new(level);
        self
    }

    /// Replace the SHA-1 file digester.
    pub fn digester(mut self, digester: Box<dyn Digester>) -> Self {
        self.digester = Some(digester);
        self
    }

    /// Replace the manifest signer of the selected backend.
    pub fn manifest_signer(mut self, signer: Box<dyn ManifestSigner>) -> Self {
        self.manifest_signer = Some(signer);
        self
    }

    /// Replace the pass signing tool.
    pub fn pass_tool_runner(mut self, tool: Box<dyn PassTool>) -> Self {
        self.pass_tool = Some(tool);
        self
    }

    /// Validate the builder configuration.
    ///
    /// Returns an error if:
    /// - Certificate options are given for the pass tool backend
    /// - Certificate options are combined with an injected manifest signer
    /// - Only one of certificate/private key is specified
    /// - No credentials are specified for a manifest-signing backend
    pub fn validate(&self) -> Result<()> {
        let has_any = self.certificate.is_some() || self.private_key.is_some();
        let has_pair = self.certificate.is_some() && self.private_key.is_some();

        match self.backend {
            SigningBackend::PassTool => {
                if has_any {
                    return Err(Error::Config(
                        "The pass tool signs with the keychain identity; certificate and key options do not apply".into(),
                    ));
                }
                if self.manifest_signer.is_some() {
                    return Err(Error::Config(
                        "A manifest signer cannot be used with the pass tool backend".into(),
                    ));
                }
            }
            _ if self.manifest_signer.is_some() => {
                if has_any {
                    return Err(Error::Config(
                        "Cannot combine a manifest signer with certificate/key options".into(),
                    ));
                }
            }
            SigningBackend::OpensslCommand | SigningBackend::NativeCms => {
                if !has_pair {
                    return Err(Error::MissingCredentials(
                        "Both certificate and private key must be specified".into(),
                    ));
                }
            }
        }

        Ok(())
    }

    fn openssl_signer(&self) -> Result<OpensslCommandSigner> {
        let (Some(cert), Some(key)) = (&self.certificate, &self.private_key) else {
            return Err(Error::MissingCredentials(
                "Both certificate and private key must be specified".into(),
            ));
        };

        let mut signer = OpensslCommandSigner::new(cert, key).timeout(self.timeout);
        if let Some(ref program) = self.openssl_program {
            signer = signer.program(program);
        }
        if let Some(ref wwdr) = self.wwdr_certificate {
            signer = signer.wwdr_certificate(wwdr);
        }
        if let Some(ref password) = self.key_password {
            signer = signer.key_password(SecretString::new(password.expose_secret().clone()));
        }
        Ok(signer)
    }

    /// Load signing assets for in-process signing.
    #[cfg(feature = "openssl-backend")]
    fn native_signer(&self) -> Result<Box<dyn ManifestSigner>> {
        use crate::crypto::signer::DEFAULT_WWDR_CERTIFICATE;
        use crate::crypto::{NativeCmsSigner, SigningAssets};

        let (Some(cert), Some(key)) = (&self.certificate, &self.private_key) else {
            return Err(Error::MissingCredentials(
                "Both certificate and private key must be specified".into(),
            ));
        };
        let assets = SigningAssets::from_files(cert, key, self.key_password.as_ref())?;

        let wwdr = self
            .wwdr_certificate
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WWDR_CERTIFICATE));
        Ok(Box::new(NativeCmsSigner::new(assets.with_chain_certificate(wwdr)?)))
    }

    #[cfg(not(feature = "openssl-backend"))]
    fn native_signer(&self) -> Result<Box<dyn ManifestSigner>> {
        Err(Error::Config(
            "Native CMS signing requires the `openssl-backend` feature".into(),
        ))
    }

    fn build_manifest_signer(&self) -> Result<Box<dyn ManifestSigner>> {
        match self.backend {
            SigningBackend::OpensslCommand => Ok(Box::new(self.openssl_signer()?)),
            SigningBackend::NativeCms => self.native_signer(),
            SigningBackend::PassTool => Err(Error::Config(
                "The pass tool backend does not sign manifests".into(),
            )),
        }
    }

    fn build_pass_tool(&self) -> SignpassTool {
        let tool = SignpassTool::new().timeout(self.timeout);
        match self.pass_tool_program {
            Some(ref program) => tool.program(program),
            None => tool,
        }
    }

    /// Sign `pass` under a freshly generated identifier.
    ///
    /// Returns the archive path and the identifier.
    pub fn sign(
        &self,
        asset_dir: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        pass: Pass,
    ) -> Result<(PathBuf, String)> {
        self.sign_with(asset_dir, dest, pass, |_, pass| pass)
    }

    /// Sign `pass` after applying `modifier` to it with the generated identifier.
    ///
    /// The serial number is still overwritten with the identifier afterwards.
    pub fn sign_with<F>(
        &self,
        asset_dir: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        pass: Pass,
        modifier: F,
    ) -> Result<(PathBuf, String)>
    where
        F: FnOnce(&str, Pass) -> Pass,
    {
        let id = generate_pass_id();
        let pass = modifier(&id, pass);
        let archive = self.sign_with_id(&id, asset_dir, dest, pass)?;
        Ok((archive, id))
    }

    /// Sign `pass` under the caller's identifier.
    ///
    /// Produces `<dest>/<id>.pkpass`, staging in `<dest>/<id>`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid or credentials cannot be loaded
    /// - The asset directory cannot be copied
    /// - Digesting, signing, or packaging fails (the error names the step)
    /// - An external tool exceeds the timeout
    pub fn sign_with_id(
        &self,
        id: &str,
        asset_dir: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        mut pass: Pass,
    ) -> Result<PathBuf> {
        self.validate()?;
        let asset_dir = asset_dir.as_ref();
        let dest = dest.as_ref();
        pass.serial_number = id.to_string();
        let archive = dest.join(format!("{id}.{ARCHIVE_EXTENSION}"));

        if self.backend == SigningBackend::PassTool {
            let built;
            let tool: &dyn PassTool = match self.pass_tool {
                Some(ref tool) => tool.as_ref(),
                None => {
                    built = self.build_pass_tool();
                    &built
                }
            };

            let staging = stage(asset_dir, dest, id, &pass)?;
            publish_with(&archive, |partial| tool.sign_pass(staging.path(), partial))?;
        } else {
            // Credentials are loaded before anything touches the filesystem
            let built;
            let signer: &dyn ManifestSigner = match self.manifest_signer {
                Some(ref signer) => signer.as_ref(),
                None => {
                    built = self.build_manifest_signer()?;
                    built.as_ref()
                }
            };
            let digester: &dyn Digester = match self.digester {
                Some(ref digester) => digester.as_ref(),
                None => &Sha1Digester,
            };

            let staging = stage(asset_dir, dest, id, &pass)?;
            let (manifest, entries) = write_manifest(staging.path(), digester)?;
            tracing::debug!(%id, files = entries.len(), "manifest ready");

            signer.sign_manifest(&manifest, &staging.path().join(SIGNATURE_FILE))?;
            create_pkpass(staging.path(), &archive, self.compression_level)?;
        }

        tracing::info!(%id, backend = ?self.backend, archive = %archive.display(), "signed pass");
        Ok(archive)
    }
}

impl Default for PassSigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Sign with the pass signing tool under a generated identifier.
pub fn sign_pass_with_tool(
    asset_dir: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    pass: Pass,
) -> Result<(PathBuf, String)> {
    PassSigner::new().pass_tool().sign(asset_dir, dest, pass)
}

/// Sign with the pass signing tool under the given identifier.
pub fn sign_pass_with_tool_and_id(
    id: &str,
    asset_dir: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    pass: Pass,
) -> Result<PathBuf> {
    PassSigner::new().pass_tool().sign_with_id(id, asset_dir, dest, pass)
}

/// Sign with the pass signing tool, applying `modifier` with the generated identifier.
pub fn sign_pass_with_tool_and_modifier<F>(
    asset_dir: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    pass: Pass,
    modifier: F,
) -> Result<(PathBuf, String)>
where
    F: FnOnce(&str, Pass) -> Pass,
{
    PassSigner::new().pass_tool().sign_with(asset_dir, dest, pass, modifier)
}

/// Sign through `openssl` under a generated identifier.
pub fn sign_pass_with_openssl(
    certificate: impl AsRef<Path>,
    private_key: impl AsRef<Path>,
    asset_dir: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    pass: Pass,
) -> Result<(PathBuf, String)> {
    PassSigner::new()
        .openssl(certificate, private_key)
        .sign(asset_dir, dest, pass)
}

/// Sign through `openssl` under the given identifier.
pub fn sign_pass_with_openssl_and_id(
    certificate: impl AsRef<Path>,
    private_key: impl AsRef<Path>,
    id: &str,
    asset_dir: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    pass: Pass,
) -> Result<PathBuf> {
    PassSigner::new()
        .openssl(certificate, private_key)
        .sign_with_id(id, asset_dir, dest, pass)
}

/// Sign through `openssl`, applying `modifier` with the generated identifier.
pub fn sign_pass_with_openssl_and_modifier<F>(
    certificate: impl AsRef<Path>,
    private_key: impl AsRef<Path>,
    asset_dir: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    pass: Pass,
    modifier: F,
) -> Result<(PathBuf, String)>
where
    F: FnOnce(&str, Pass) -> Pass,
{
    PassSigner::new()
        .openssl(certificate, private_key)
        .sign_with(asset_dir, dest, pass, modifier)
}
