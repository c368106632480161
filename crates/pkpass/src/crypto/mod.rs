//! Manifest digests and signatures.

pub mod digest;
pub mod signer;

#[cfg(feature = "openssl-backend")]
pub mod assets;
#[cfg(feature = "openssl-backend")]
pub mod cms;

pub use digest::{sha1_hex, Digester, Sha1Digester};
pub use signer::{ManifestSigner, OpensslCommandSigner, PassTool, SignpassTool};

#[cfg(feature = "openssl-backend")]
pub use assets::SigningAssets;
#[cfg(feature = "openssl-backend")]
pub use cms::NativeCmsSigner;
