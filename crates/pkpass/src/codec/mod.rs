//! Canonical `pass.json` encoding and decoding.
//!
//! # Document Shape
//!
//! | Key | Source |
//! |-----|--------|
//! | `formatVersion` | always [`constants::FORMAT_VERSION`] |
//! | `description`, `organizationName`, ... | required [`Pass`] attributes |
//! | `barcode`, `relevantDate`, colors, ... | optional attributes, omitted when absent |
//! | `authenticationToken` + `webServiceURL` | [`crate::model::WebService`], flattened |
//! | `boardingPass` / `coupon` / `eventTicket` / `generic` / `storeCard` | the [`crate::model::PassType`] content |
//!
//! # Round Trips
//!
//! `decode_pass(&encode_pass(p)?)? == p` for every pass whose text values do
//! not parse as [`constants::DATE_FORMAT`] dates, whose dates have whole
//! seconds, and whose floating-point values are finite. Doubles with no
//! fractional part survive because `serde_json` keeps them as floats.
//!
//! # Examples
//!
//! ```
//! use pkpass::codec::{decode_pass, encode_pass};
//! use pkpass::model::{Pass, PassContent, PassType};
//!
//! let pass = Pass::new("Coupon", "Shop", "pass.com.shop", "1", "TEAM", PassType::Coupon(PassContent::default()));
//! let doc = encode_pass(&pass)?;
//! assert_eq!(doc["formatVersion"], 1);
//! assert_eq!(decode_pass(&doc)?, pass);
//! # Ok::<(), pkpass::Error>(())
//! ```
//!
//! [`Pass`]: crate::model::Pass

pub mod constants;
pub mod decode;
pub mod encode;

pub use decode::{decode_pass, from_slice, parse_date};
pub use encode::{encode_pass, to_json_vec};
