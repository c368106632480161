//! Typed in-memory representation of a pass.
//!
//! Every optional attribute is an `Option` (or an empty `Vec` for the
//! sequences), so the encoder can omit it instead of writing `null`.
//!
//! | Type | Role |
//! |------|------|
//! | [`Pass`] | Root: identity, styling, relevance, web service, category |
//! | [`PassType`] | Category variant owning the [`PassContent`] |
//! | [`PassField`] | Labeled [`PassValue`] with optional styles |
//! | [`Barcode`] | Front-of-pass barcode |
//! | [`Location`] | Relevance location |
//! | [`RgbColor`] | Range-checked color, built with [`rgb`] |

pub mod barcode;
pub mod color;
pub mod field;
pub mod pass;

pub use barcode::{mk_barcode, Barcode, BarcodeFormat, DEFAULT_MESSAGE_ENCODING};
pub use color::{rgb, RgbColor};
pub use field::{mk_simple_field, Alignment, DateTimeStyle, NumberStyle, PassField, PassValue};
pub use pass::{
    update_barcode, Location, Pass, PassContent, PassType, TransitType, WebService,
};
