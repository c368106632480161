//! Signer certificate, private key, and chain certificate loading
//!
//! Only pre-exported material is accepted: a certificate file (PEM or DER)
//! and a private key file (PEM or DER, optionally passphrase protected).

use crate::{Error, Result};
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::path::Path;

/// Pass type certificate, its private key, and the chain certificates
/// embedded next to it in every signature.
pub struct SigningAssets {
    pub certificate: X509,
    pub private_key: PKey<Private>,
    /// Intermediate certificates (normally the WWDR certificate), without duplicates
    pub chain: Vec<X509>,
}

impl SigningAssets {
    /// Load a certificate and its private key.
    ///
    /// # Errors
    ///
    /// [`Error::Certificate`] if either file cannot be parsed, the passphrase
    /// is wrong, or the key does not belong to the certificate.
    pub fn from_files(
        certificate: impl AsRef<Path>,
        private_key: impl AsRef<Path>,
        passphrase: Option<&SecretString>,
    ) -> Result<Self> {
        let cert_bytes = fs::read(certificate)?;
        let key_bytes = fs::read(private_key)?;

        let certificate = parse_certificate(&cert_bytes)
            .map_err(|e| Error::Certificate(format!("Failed to load certificate: {e}")))?;
        let private_key = match passphrase {
            Some(pw) => PKey::private_key_from_pem_passphrase(&key_bytes, pw.expose_secret().as_bytes()),
            None => PKey::private_key_from_pem(&key_bytes).or_else(|_| PKey::private_key_from_der(&key_bytes)),
        }
        .map_err(|e| Error::Certificate(format!("Failed to load private key: {e}")))?;

        let matches = certificate
            .public_key()
            .map(|public| private_key.public_eq(&public))
            .map_err(|e| Error::Certificate(format!("Certificate has no usable public key: {e}")))?;
        if !matches {
            return Err(Error::Certificate(
                "Private key does not match certificate public key".into(),
            ));
        }

        Ok(Self {
            certificate,
            private_key,
            chain: Vec::new(),
        })
    }

    /// Append the certificates of a PEM (one or more) or DER file to the chain.
    ///
    /// Certificates already in the chain, and the signer certificate itself,
    /// are skipped: CMS refuses to embed the same certificate twice.
    pub fn with_chain_certificate(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;

        let certs = match X509::stack_from_pem(&data) {
            Ok(certs) if !certs.is_empty() => certs,
            _ => vec![X509::from_der(&data).map_err(|e| {
                Error::Certificate(format!("Failed to load chain certificate {}: {e}", path.display()))
            })?],
        };

        let mut seen = Vec::with_capacity(self.chain.len() + 1);
        for cert in std::iter::once(&self.certificate).chain(&self.chain) {
            seen.push(der(cert)?);
        }
        for cert in certs {
            let encoded = der(&cert)?;
            if seen.contains(&encoded) {
                tracing::debug!(path = %path.display(), "chain certificate already present, skipping");
                continue;
            }
            seen.push(encoded);
            self.chain.push(cert);
        }
        Ok(self)
    }
}

fn parse_certificate(bytes: &[u8]) -> std::result::Result<X509, openssl::error::ErrorStack> {
    X509::from_pem(bytes).or_else(|_| X509::from_der(bytes))
}

fn der(cert: &X509) -> Result<Vec<u8>> {
    cert.to_der()
        .map_err(|e| Error::Certificate(format!("Failed to encode certificate: {e}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use openssl::asn1::Asn1Time;
    use openssl::bn::BigNum;
    use openssl::ec::{EcGroup, EcKey};
    use openssl::hash::MessageDigest;
    use openssl::nid::Nid;
    use openssl::symm::Cipher;
    use openssl::x509::{X509Builder, X509NameBuilder};
    use tempfile::tempdir;

    pub(crate) fn generate_test_key() -> PKey<Private> {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
        PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
    }

    /// Self-signed certificate with `unit` as its OU.
    pub(crate) fn generate_test_cert(private_key: &PKey<Private>, unit: &str) -> X509 {
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "Pass Type ID: pass.com.example").unwrap();
        name.append_entry_by_text("OU", unit).unwrap();
        let name = name.build();

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        builder
            .set_serial_number(&BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap())
            .unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(private_key).unwrap();
        builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
        builder.set_not_after(&Asn1Time::days_from_now(365).unwrap()).unwrap();
        builder.sign(private_key, MessageDigest::sha256()).unwrap();
        builder.build()
    }

    /// Writes cert.pem, key.pem, wwdr.pem and wwdr.cer; returns the WWDR certificate.
    fn write_credentials(dir: &Path) -> X509 {
        let key = generate_test_key();
        let wwdr = generate_test_cert(&generate_test_key(), "WWDR");
        fs::write(dir.join("cert.pem"), generate_test_cert(&key, "A93A5CM278").to_pem().unwrap()).unwrap();
        fs::write(dir.join("key.pem"), key.private_key_to_pem_pkcs8().unwrap()).unwrap();
        fs::write(dir.join("wwdr.pem"), wwdr.to_pem().unwrap()).unwrap();
        fs::write(dir.join("wwdr.cer"), wwdr.to_der().unwrap()).unwrap();
        wwdr
    }

    fn load(dir: &Path) -> SigningAssets {
        SigningAssets::from_files(dir.join("cert.pem"), dir.join("key.pem"), None).unwrap()
    }

    #[test]
    fn test_key_must_match_certificate() {
        let dir = tempdir().unwrap();
        write_credentials(dir.path());
        fs::write(
            dir.path().join("other.pem"),
            generate_test_key().private_key_to_pem_pkcs8().unwrap(),
        )
        .unwrap();

        let err = SigningAssets::from_files(dir.path().join("cert.pem"), dir.path().join("other.pem"), None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("does not match"), "{err}");
        assert!(load(dir.path()).chain.is_empty());
    }

    #[test]
    fn test_passphrase_key_and_der_certificate() {
        let dir = tempdir().unwrap();
        let key = generate_test_key();
        fs::write(dir.path().join("cert.cer"), generate_test_cert(&key, "TEAM").to_der().unwrap()).unwrap();
        let encrypted = key
            .private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), b"hunter2")
            .unwrap();
        fs::write(dir.path().join("key.pem"), encrypted).unwrap();

        let good = SecretString::new("hunter2".to_string());
        assert!(SigningAssets::from_files(dir.path().join("cert.cer"), dir.path().join("key.pem"), Some(&good)).is_ok());

        let wrong = SecretString::new("wrong".to_string());
        let err = SigningAssets::from_files(dir.path().join("cert.cer"), dir.path().join("key.pem"), Some(&wrong))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Certificate(_)));
    }

    #[test]
    fn test_chain_certificate_pem_or_der() {
        let dir = tempdir().unwrap();
        write_credentials(dir.path());

        let assets = load(dir.path()).with_chain_certificate(dir.path().join("wwdr.cer")).unwrap();
        assert_eq!(assets.chain.len(), 1);

        fs::write(dir.path().join("junk.pem"), b"not a certificate").unwrap();
        let err = load(dir.path())
            .with_chain_certificate(dir.path().join("junk.pem"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Certificate(_)));
    }

    #[test]
    fn test_chain_skips_duplicates() {
        let dir = tempdir().unwrap();
        let wwdr = write_credentials(dir.path());

        // Same WWDR certificate in both encodings, plus the signer certificate itself
        let assets = load(dir.path())
            .with_chain_certificate(dir.path().join("wwdr.pem"))
            .unwrap()
            .with_chain_certificate(dir.path().join("wwdr.cer"))
            .unwrap()
            .with_chain_certificate(dir.path().join("cert.pem"))
            .unwrap();

        assert_eq!(assets.chain.len(), 1);
        assert_eq!(assets.chain[0].to_der().unwrap(), wwdr.to_der().unwrap());
    }
}
