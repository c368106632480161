//! Typed wallet passes, their canonical `pass.json` encoding, and the
//! manifest-and-signature pipeline that packages them as `.pkpass` archives.
//!
//! ```no_run
//! use pkpass::model::{mk_barcode, mk_simple_field, BarcodeFormat, Pass, PassContent, PassType};
//!
//! let mut content = PassContent::default();
//! content.primary_fields.push(mk_simple_field("balance", 25.0, Some("Balance")));
//! let mut pass = Pass::new(
//!     "Gift card", "Example Shop", "pass.com.example.gift", "", "A93A5CM278",
//!     PassType::StoreCard(content),
//! );
//! pass.barcode = Some(mk_barcode("", BarcodeFormat::QrCode));
//!
//! let (archive, id) = pkpass::sign_pass_with_openssl_and_modifier(
//!     "pass-cert.pem", "pass-key.pem", "assets", "out", pass, pkpass::model::update_barcode,
//! )?;
//! assert_eq!(pkpass::load_pass(&archive)?.map(|p| p.serial_number), Some(id));
//! # Ok::<(), pkpass::Error>(())
//! ```

pub mod archive;
pub mod builder;
pub mod bundle;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod identifier;
pub mod model;
pub mod process;

pub use archive::{load_pass, read_manifest, validate_archive, verify_archive, CompressionLevel, ManifestReport};
pub use builder::{
    sign_pass_with_openssl, sign_pass_with_openssl_and_id, sign_pass_with_openssl_and_modifier,
    sign_pass_with_tool, sign_pass_with_tool_and_id, sign_pass_with_tool_and_modifier, PassSigner,
    SigningBackend,
};
pub use error::{Error, SigningStep};
pub use identifier::generate_pass_id;
pub use model::Pass;

pub type Result<T> = std::result::Result<T, Error>;
