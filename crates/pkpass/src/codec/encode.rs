//! Pass → `pass.json` encoding.
//!
//! Every structure is written through [`put`] / [`put_opt`] / [`put_seq`],
//! which is where the "absent means omitted, never `null`" rule lives.

use super::constants::*;
use crate::model::{
    Alignment, Barcode, BarcodeFormat, DateTimeStyle, Location, NumberStyle, Pass, PassContent,
    PassField, PassType, PassValue, RgbColor, TransitType,
};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Number, Value};

/// A model value with a JSON form.
trait Encode {
    fn encode(&self) -> Result<Value>;
}

/// Insert `key` unconditionally.
fn put<T: Encode + ?Sized>(obj: &mut Map<String, Value>, key: &str, value: &T) -> Result<()> {
    obj.insert(key.to_string(), value.encode()?);
    Ok(())
}

/// Insert `key` only when the value is present.
fn put_opt<T: Encode>(obj: &mut Map<String, Value>, key: &str, value: Option<&T>) -> Result<()> {
    match value {
        Some(value) => put(obj, key, value),
        None => Ok(()),
    }
}

/// Insert `key` only when the sequence is non-empty.
fn put_seq<T: Encode>(obj: &mut Map<String, Value>, key: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Ok(());
    }
    put(obj, key, values)
}

impl Encode for str {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl Encode for String {
    fn encode(&self) -> Result<Value> {
        self.as_str().encode()
    }
}

impl Encode for bool {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

impl Encode for i64 {
    fn encode(&self) -> Result<Value> {
        Ok(Value::from(*self))
    }
}

impl Encode for u64 {
    fn encode(&self) -> Result<Value> {
        Ok(Value::from(*self))
    }
}

impl Encode for f64 {
    fn encode(&self) -> Result<Value> {
        Number::from_f64(*self)
            .map(Value::Number)
            .ok_or_else(|| Error::Encode(format!("non-finite number {self}")))
    }
}

impl Encode for RgbColor {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl Encode for DateTime<FixedOffset> {
    fn encode(&self) -> Result<Value> {
        Ok(Value::String(self.format(DATE_FORMAT).to_string()))
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self) -> Result<Value> {
        self.iter()
            .map(Encode::encode)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self) -> Result<Value> {
        self.as_slice().encode()
    }
}

macro_rules! encode_wire_enum {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode(&self) -> Result<Value> {
                    Ok(Value::String(WireEnum::wire_name(*self).to_string()))
                }
            }
        )*
    };
}

encode_wire_enum!(TransitType, Alignment, DateTimeStyle, NumberStyle, BarcodeFormat);

impl Encode for PassValue {
    fn encode(&self) -> Result<Value> {
        match self {
            PassValue::Int(n) => n.encode(),
            PassValue::Double(x) => x.encode(),
            PassValue::Date(date) => date.encode(),
            PassValue::Text(text) => text.encode(),
        }
    }
}

impl Encode for PassField {
    fn encode(&self) -> Result<Value> {
        let mut obj = Map::new();
        put(&mut obj, KEY_KEY, &self.key)?;
        put(&mut obj, KEY_VALUE, &self.value)?;
        put_opt(&mut obj, KEY_CHANGE_MESSAGE, self.change_message.as_ref())?;
        put_opt(&mut obj, KEY_LABEL, self.label.as_ref())?;
        put_opt(&mut obj, KEY_TEXT_ALIGNMENT, self.text_alignment.as_ref())?;
        put_opt(&mut obj, KEY_DATE_STYLE, self.date_style.as_ref())?;
        put_opt(&mut obj, KEY_TIME_STYLE, self.time_style.as_ref())?;
        put_opt(&mut obj, KEY_IS_RELATIVE, self.is_relative.as_ref())?;
        put_opt(&mut obj, KEY_CURRENCY_CODE, self.currency_code.as_ref())?;
        put_opt(&mut obj, KEY_NUMBER_STYLE, self.number_style.as_ref())?;
        Ok(Value::Object(obj))
    }
}

impl Encode for Barcode {
    fn encode(&self) -> Result<Value> {
        let mut obj = Map::new();
        put(&mut obj, KEY_FORMAT, &self.format)?;
        put(&mut obj, KEY_MESSAGE, &self.message)?;
        put(&mut obj, KEY_MESSAGE_ENCODING, &self.message_encoding)?;
        put_opt(&mut obj, KEY_ALT_TEXT, self.alt_text.as_ref())?;
        Ok(Value::Object(obj))
    }
}

impl Encode for Location {
    fn encode(&self) -> Result<Value> {
        let mut obj = Map::new();
        put(&mut obj, KEY_LATITUDE, &self.latitude)?;
        put(&mut obj, KEY_LONGITUDE, &self.longitude)?;
        put_opt(&mut obj, KEY_ALTITUDE, self.altitude.as_ref())?;
        put_opt(&mut obj, KEY_RELEVANT_TEXT, self.relevant_text.as_ref())?;
        Ok(Value::Object(obj))
    }
}

/// Region arrays go into `obj` directly so a boarding pass can add
/// `transitType` beside them.
fn encode_content_into(obj: &mut Map<String, Value>, content: &PassContent) -> Result<()> {
    put(obj, KEY_HEADER_FIELDS, &content.header_fields)?;
    put(obj, KEY_PRIMARY_FIELDS, &content.primary_fields)?;
    put(obj, KEY_SECONDARY_FIELDS, &content.secondary_fields)?;
    put(obj, KEY_AUXILIARY_FIELDS, &content.auxiliary_fields)?;
    put(obj, KEY_BACK_FIELDS, &content.back_fields)?;
    Ok(())
}

/// The category tag key and its object value.
fn encode_pass_type(pass_type: &PassType) -> Result<(&'static str, Value)> {
    let mut obj = Map::new();
    let key = match pass_type {
        PassType::BoardingPass(transit, _) => {
            put(&mut obj, KEY_TRANSIT_TYPE, transit)?;
            KEY_BOARDING_PASS
        }
        PassType::Coupon(_) => KEY_COUPON,
        PassType::Event(_) => KEY_EVENT_TICKET,
        PassType::GenericPass(_) => KEY_GENERIC,
        PassType::StoreCard(_) => KEY_STORE_CARD,
    };
    encode_content_into(&mut obj, pass_type.content())?;
    Ok((key, Value::Object(obj)))
}

/// Encode a pass as a `pass.json` document.
///
/// # Errors
///
/// Returns [`Error::Encode`] if a floating-point value is NaN or infinite.
pub fn encode_pass(pass: &Pass) -> Result<Value> {
    let mut obj = Map::new();
    put(&mut obj, KEY_FORMAT_VERSION, &FORMAT_VERSION)?;
    put(&mut obj, KEY_DESCRIPTION, &pass.description)?;
    put(&mut obj, KEY_ORGANIZATION_NAME, &pass.organization_name)?;
    put(&mut obj, KEY_PASS_TYPE_IDENTIFIER, &pass.pass_type_identifier)?;
    put(&mut obj, KEY_SERIAL_NUMBER, &pass.serial_number)?;
    put(&mut obj, KEY_TEAM_IDENTIFIER, &pass.team_identifier)?;
    put_seq(
        &mut obj,
        KEY_ASSOCIATED_STORE_IDENTIFIERS,
        &pass.associated_store_identifiers,
    )?;
    put_seq(&mut obj, KEY_LOCATIONS, &pass.locations)?;
    put_opt(&mut obj, KEY_RELEVANT_DATE, pass.relevant_date.as_ref())?;
    put_opt(&mut obj, KEY_BARCODE, pass.barcode.as_ref())?;
    put_opt(&mut obj, KEY_BACKGROUND_COLOR, pass.background_color.as_ref())?;
    put_opt(&mut obj, KEY_FOREGROUND_COLOR, pass.foreground_color.as_ref())?;
    put_opt(&mut obj, KEY_LABEL_COLOR, pass.label_color.as_ref())?;
    put_opt(&mut obj, KEY_LOGO_TEXT, pass.logo_text.as_ref())?;
    put_opt(&mut obj, KEY_SUPPRESS_STRIP_SHINE, pass.suppress_strip_shine.as_ref())?;

    // Flattened onto the pass object, never nested.
    if let Some(web_service) = &pass.web_service {
        put(&mut obj, KEY_AUTHENTICATION_TOKEN, &web_service.authentication_token)?;
        put(&mut obj, KEY_WEB_SERVICE_URL, &web_service.url)?;
    }

    let (type_key, content) = encode_pass_type(&pass.pass_type)?;
    obj.insert(type_key.to_string(), content);

    Ok(Value::Object(obj))
}

/// Encode a pass to pretty-printed `pass.json` bytes.
pub fn to_json_vec(pass: &Pass) -> Result<Vec<u8>> {
    let value = encode_pass(pass)?;
    Ok(serde_json::to_vec_pretty(&value)?)
}
