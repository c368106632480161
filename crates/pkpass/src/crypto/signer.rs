//! External signing collaborators.
//!
//! Two capabilities are injected into [`crate::PassSigner`]:
//!
//! - [`ManifestSigner`]: writes a detached DER CMS signature over
//!   `manifest.json` ([`OpensslCommandSigner`], or the in-process
//!   [`crate::crypto::NativeCmsSigner`])
//! - [`PassTool`]: signs and packages a whole staged directory in one go
//!   using the OS keychain ([`SignpassTool`])

use crate::error::SigningStep;
use crate::process::{run_tool, DEFAULT_TOOL_TIMEOUT};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Default chain-anchor certificate, resolved against the working directory.
pub const DEFAULT_WWDR_CERTIFICATE: &str = "wwdr.pem";

/// Environment variable carrying the key passphrase to `openssl`.
const KEY_PASSWORD_ENV: &str = "PKPASS_KEY_PASSWORD";

/// Produces the detached signature of a manifest.
pub trait ManifestSigner: Send + Sync {
    /// Sign the raw bytes of `manifest`, writing DER to `signature`.
    fn sign_manifest(&self, manifest: &Path, signature: &Path) -> Result<()>;
}

/// Signs and packages a staged pass directory as a single external step.
pub trait PassTool: Send + Sync {
    /// Read the staged directory and write a signed archive to `archive`.
    fn sign_pass(&self, staged: &Path, archive: &Path) -> Result<()>;
}

/// Fails unless `path` exists and is non-empty after a tool claimed success.
fn ensure_output(path: &Path, step: SigningStep) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        Ok(_) => Err(Error::signing(
            step,
            format!("{} is empty", path.display()),
        )),
        Err(_) => Err(Error::signing(
            step,
            format!("{} was not produced", path.display()),
        )),
    }
}

/// Signs manifests with `openssl smime`.
///
/// Equivalent to:
///
/// ```text
/// openssl smime -binary -sign -certfile wwdr.pem -signer <cert> -inkey <key> \
///     -in manifest.json -out signature -outform DER
/// ```
pub struct OpensslCommandSigner {
    program: PathBuf,
    certificate: PathBuf,
    private_key: PathBuf,
    wwdr_certificate: PathBuf,
    key_password: Option<SecretString>,
    timeout: Duration,
}

impl OpensslCommandSigner {
    pub fn new(certificate: impl AsRef<Path>, private_key: impl AsRef<Path>) -> Self {
        Self {
            program: PathBuf::from("openssl"),
            certificate: certificate.as_ref().to_path_buf(),
            private_key: private_key.as_ref().to_path_buf(),
            wwdr_certificate: PathBuf::from(DEFAULT_WWDR_CERTIFICATE),
            key_password: None,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Path of the `openssl` executable.
    pub fn program(mut self, program: impl AsRef<Path>) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }

    pub fn wwdr_certificate(mut self, path: impl AsRef<Path>) -> Self {
        self.wwdr_certificate = path.as_ref().to_path_buf();
        self
    }

    /// Passphrase of the private key, handed over via the environment.
    pub fn key_password(mut self, password: SecretString) -> Self {
        self.key_password = Some(password);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, manifest: &Path, signature: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["smime", "-binary", "-sign", "-certfile"])
            .arg(&self.wwdr_certificate)
            .arg("-signer")
            .arg(&self.certificate)
            .arg("-inkey")
            .arg(&self.private_key)
            .arg("-in")
            .arg(manifest)
            .arg("-out")
            .arg(signature)
            .args(["-outform", "DER"]);

        if let Some(password) = &self.key_password {
            command
                .args(["-passin", &format!("env:{KEY_PASSWORD_ENV}")])
                .env(KEY_PASSWORD_ENV, password.expose_secret());
        }
        command
    }
}

impl ManifestSigner for OpensslCommandSigner {
    fn sign_manifest(&self, manifest: &Path, signature: &Path) -> Result<()> {
        run_tool(
            self.command(manifest, signature),
            SigningStep::Signature,
            self.timeout,
        )?;
        ensure_output(signature, SigningStep::Signature)
    }
}

/// Signs passes with the `signpass` tool, which reads the signing identity
/// from the OS keychain.
///
/// Equivalent to `signpass -p <staged> -o <archive>`.
#[derive(Debug, Clone)]
pub struct SignpassTool {
    program: PathBuf,
    timeout: Duration,
}

impl SignpassTool {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("signpass"),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn program(mut self, program: impl AsRef<Path>) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SignpassTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PassTool for SignpassTool {
    fn sign_pass(&self, staged: &Path, archive: &Path) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.arg("-p").arg(staged).arg("-o").arg(archive);
        run_tool(command, SigningStep::PassTool, self.timeout)?;
        ensure_output(archive, SigningStep::PassTool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use tempfile::tempdir;

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_openssl_arguments() {
        let signer = OpensslCommandSigner::new("cert.pem", "key.pem");
        let command = signer.command(Path::new("/s/manifest.json"), Path::new("/s/signature"));
        assert_eq!(command.get_program(), OsStr::new("openssl"));
        assert_eq!(
            args(&command),
            [
                "smime", "-binary", "-sign", "-certfile", "wwdr.pem", "-signer", "cert.pem",
                "-inkey", "key.pem", "-in", "/s/manifest.json", "-out", "/s/signature",
                "-outform", "DER",
            ]
        );
        assert_eq!(command.get_envs().count(), 0);
    }

    #[test]
    fn test_openssl_password_goes_through_env() {
        let signer = OpensslCommandSigner::new("cert.pem", "key.pem")
            .wwdr_certificate("/certs/AppleWWDRCA.pem")
            .key_password(SecretString::new("hunter2".to_string()));
        let command = signer.command(Path::new("m"), Path::new("s"));
        let args = args(&command);

        assert!(args.contains(&"/certs/AppleWWDRCA.pem".to_string()));
        assert!(args.contains(&"env:PKPASS_KEY_PASSWORD".to_string()));
        assert!(!args.iter().any(|a| a.contains("hunter2")));

        let envs: Vec<_> = command.get_envs().collect();
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].0, OsStr::new("PKPASS_KEY_PASSWORD"));
        assert_eq!(envs[0].1, Some(OsStr::new("hunter2")));
    }

    #[test]
    #[cfg(unix)]
    fn test_failing_openssl_is_signature_error() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        fs::write(&manifest, b"{}").unwrap();

        let signer = OpensslCommandSigner::new("cert.pem", "key.pem").program("false");
        let err = signer
            .sign_manifest(&manifest, &dir.path().join("signature"))
            .unwrap_err();
        assert!(matches!(err, Error::Signing { step: SigningStep::Signature, .. }));
    }

    #[test]
    #[cfg(unix)]
    fn test_tool_success_without_output_is_error() {
        let dir = tempdir().unwrap();
        let tool = SignpassTool::new().program("true");
        let err = tool
            .sign_pass(dir.path(), &dir.path().join("out.pkpass"))
            .unwrap_err();
        assert!(matches!(err, Error::Signing { step: SigningStep::PassTool, .. }));
    }

    #[test]
    #[ignore = "Requires openssl on PATH plus signer.pem, signer.key and wwdr.pem in the working directory"]
    fn test_openssl_signs_manifest() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        fs::write(&manifest, br#"{"pass.json":"da39a3ee5e6b4b0d3255bfef95601890afd80709"}"#).unwrap();
        let signature = dir.path().join("signature");

        OpensslCommandSigner::new("signer.pem", "signer.key")
            .sign_manifest(&manifest, &signature)
            .unwrap();
        assert!(fs::metadata(&signature).unwrap().len() > 0);
    }
}
