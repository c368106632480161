//! Barcode attached to the front of a pass.

/// Default `messageEncoding` for barcodes.
pub const DEFAULT_MESSAGE_ENCODING: &str = "iso-8859-1";

/// Symbology used to render the barcode message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    QrCode,
    Pdf417,
    Aztec,
}

/// A barcode: what to encode and how to display it.
#[derive(Debug, Clone, PartialEq)]
pub struct Barcode {
    pub format: BarcodeFormat,
    pub message: String,
    /// IANA character set name used to encode `message`.
    pub message_encoding: String,
    /// Human-readable text shown under the barcode.
    pub alt_text: Option<String>,
}

/// Build a barcode whose alternate text mirrors the message.
///
/// The message encoding is [`DEFAULT_MESSAGE_ENCODING`].
pub fn mk_barcode(message: impl Into<String>, format: BarcodeFormat) -> Barcode {
    let message = message.into();
    Barcode {
        format,
        alt_text: Some(message.clone()),
        message,
        message_encoding: DEFAULT_MESSAGE_ENCODING.to_string(),
    }
}
