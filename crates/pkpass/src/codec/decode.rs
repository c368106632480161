//! `pass.json` → Pass decoding.
//!
//! Field values are not tagged on the wire, so [`PassValue`] is recovered
//! heuristically: integer literals that fit in an `i64` become
//! [`PassValue::Int`], any other number (`2.0`, `1e2`, out-of-range
//! integers) [`PassValue::Double`]; strings that
//! parse with [`DATE_FORMAT`] become [`PassValue::Date`], everything else
//! [`PassValue::Text`]. A text value that happens to match the date format
//! therefore comes back as a date.

use super::constants::*;
use crate::model::{
    Barcode, Location, Pass, PassContent, PassField, PassType, PassValue, RgbColor, TransitType,
    WebService,
};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

/// Parse a date with the fixed pass timestamp profile.
pub fn parse_date(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, DATE_FORMAT).ok()
}

/// A JSON object being decoded as `structure`, for error messages.
struct Obj<'a> {
    structure: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Obj<'a> {
    fn new(structure: &'static str, value: &'a Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::schema(structure, "<root>", "is not a JSON object"))?;
        Ok(Self { structure, map })
    }

    fn err(&self, key: &str, reason: impl Into<String>) -> Error {
        Error::schema(self.structure, key, reason)
    }

    /// `null` counts as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn required(&self, key: &str) -> Result<&'a Value> {
        self.get(key).ok_or_else(|| self.err(key, "is required"))
    }

    fn string(&self, key: &str, value: &'a Value) -> Result<&'a str> {
        value
            .as_str()
            .ok_or_else(|| self.err(key, "must be a string"))
    }

    fn req_str(&self, key: &str) -> Result<String> {
        let value = self.required(key)?;
        self.string(key, value).map(str::to_string)
    }

    fn opt_str(&self, key: &str) -> Result<Option<String>> {
        self.get(key)
            .map(|v| self.string(key, v).map(str::to_string))
            .transpose()
    }

    fn opt_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get(key)
            .map(|v| v.as_bool().ok_or_else(|| self.err(key, "must be a boolean")))
            .transpose()
    }

    fn number(&self, key: &str, value: &Value) -> Result<f64> {
        value
            .as_f64()
            .ok_or_else(|| self.err(key, "must be a number"))
    }

    fn req_f64(&self, key: &str) -> Result<f64> {
        let value = self.required(key)?;
        self.number(key, value)
    }

    fn opt_f64(&self, key: &str) -> Result<Option<f64>> {
        self.get(key).map(|v| self.number(key, v)).transpose()
    }

    fn opt_enum<E: WireEnum>(&self, key: &str) -> Result<Option<E>> {
        self.get(key)
            .map(|v| {
                let s = self.string(key, v)?;
                E::from_wire(s).ok_or_else(|| self.err(key, format!("has unknown value {s:?}")))
            })
            .transpose()
    }

    fn req_enum<E: WireEnum>(&self, key: &str) -> Result<E> {
        self.opt_enum(key)?
            .ok_or_else(|| self.err(key, "is required"))
    }

    fn opt_color(&self, key: &str) -> Result<Option<RgbColor>> {
        self.get(key)
            .map(|v| {
                let s = self.string(key, v)?;
                RgbColor::parse(s).ok_or_else(|| self.err(key, format!("is not a valid color {s:?}")))
            })
            .transpose()
    }

    fn opt_date(&self, key: &str) -> Result<Option<DateTime<FixedOffset>>> {
        self.get(key)
            .map(|v| {
                let s = self.string(key, v)?;
                parse_date(s).ok_or_else(|| self.err(key, format!("is not a valid date {s:?}")))
            })
            .transpose()
    }

    /// Decode an optional array; absent decodes to empty.
    fn seq<T>(&self, key: &str, decode: impl Fn(&Value) -> Result<T>) -> Result<Vec<T>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(decode).collect(),
            Some(_) => Err(self.err(key, "must be an array")),
        }
    }
}

fn decode_value(value: &Value) -> Result<PassValue> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(PassValue::Int(i))
            } else {
                n.as_f64()
                    .map(PassValue::Double)
                    .ok_or_else(|| Error::schema("PassField", KEY_VALUE, "is not a representable number"))
            }
        }
        Value::String(s) => Ok(parse_date(s)
            .map(PassValue::Date)
            .unwrap_or_else(|| PassValue::Text(s.clone()))),
        _ => Err(Error::schema(
            "PassField",
            KEY_VALUE,
            "must be a number or a string",
        )),
    }
}

fn decode_field(value: &Value) -> Result<PassField> {
    let obj = Obj::new("PassField", value)?;
    Ok(PassField {
        key: obj.req_str(KEY_KEY)?,
        value: decode_value(obj.required(KEY_VALUE)?)?,
        change_message: obj.opt_str(KEY_CHANGE_MESSAGE)?,
        label: obj.opt_str(KEY_LABEL)?,
        text_alignment: obj.opt_enum(KEY_TEXT_ALIGNMENT)?,
        date_style: obj.opt_enum(KEY_DATE_STYLE)?,
        time_style: obj.opt_enum(KEY_TIME_STYLE)?,
        is_relative: obj.opt_bool(KEY_IS_RELATIVE)?,
        currency_code: obj.opt_str(KEY_CURRENCY_CODE)?,
        number_style: obj.opt_enum(KEY_NUMBER_STYLE)?,
    })
}

fn decode_content(obj: &Obj<'_>) -> Result<PassContent> {
    Ok(PassContent {
        header_fields: obj.seq(KEY_HEADER_FIELDS, decode_field)?,
        primary_fields: obj.seq(KEY_PRIMARY_FIELDS, decode_field)?,
        secondary_fields: obj.seq(KEY_SECONDARY_FIELDS, decode_field)?,
        auxiliary_fields: obj.seq(KEY_AUXILIARY_FIELDS, decode_field)?,
        back_fields: obj.seq(KEY_BACK_FIELDS, decode_field)?,
    })
}

fn decode_barcode(value: &Value) -> Result<Barcode> {
    let obj = Obj::new("Barcode", value)?;
    Ok(Barcode {
        format: obj.req_enum(KEY_FORMAT)?,
        message: obj.req_str(KEY_MESSAGE)?,
        message_encoding: obj.req_str(KEY_MESSAGE_ENCODING)?,
        alt_text: obj.opt_str(KEY_ALT_TEXT)?,
    })
}

fn decode_location(value: &Value) -> Result<Location> {
    let obj = Obj::new("Location", value)?;
    Ok(Location {
        latitude: obj.req_f64(KEY_LATITUDE)?,
        longitude: obj.req_f64(KEY_LONGITUDE)?,
        altitude: obj.opt_f64(KEY_ALTITUDE)?,
        relevant_text: obj.opt_str(KEY_RELEVANT_TEXT)?,
    })
}

fn decode_store_identifier(value: &Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        Error::schema(
            "Pass",
            KEY_ASSOCIATED_STORE_IDENTIFIERS,
            "must contain only non-negative integers",
        )
    })
}

/// Dispatch on the first category key present, in [`PASS_TYPE_KEYS`] order.
fn decode_pass_type(pass: &Obj<'_>) -> Result<PassType> {
    let (key, value) = PASS_TYPE_KEYS
        .iter()
        .find_map(|key| pass.get(key).map(|value| (*key, value)))
        .ok_or_else(|| pass.err(&PASS_TYPE_KEYS.join("|"), "is required (no pass category found)"))?;

    let structure = match key {
        KEY_BOARDING_PASS => "BoardingPass",
        KEY_COUPON => "Coupon",
        KEY_EVENT_TICKET => "EventTicket",
        KEY_STORE_CARD => "StoreCard",
        _ => "Generic",
    };
    let obj = Obj::new(structure, value)?;
    let content = decode_content(&obj)?;

    Ok(match key {
        KEY_BOARDING_PASS => {
            let transit: TransitType = obj.req_enum(KEY_TRANSIT_TYPE)?;
            PassType::BoardingPass(transit, content)
        }
        KEY_COUPON => PassType::Coupon(content),
        KEY_EVENT_TICKET => PassType::Event(content),
        KEY_STORE_CARD => PassType::StoreCard(content),
        _ => PassType::GenericPass(content),
    })
}

/// Decode a `pass.json` document.
///
/// # Errors
///
/// Returns [`Error::Schema`] naming the structure and key when a required
/// key is missing, a value has the wrong JSON type, an enumerated string
/// is unknown, or no category key is present.
pub fn decode_pass(value: &Value) -> Result<Pass> {
    let obj = Obj::new("Pass", value)?;

    let version = obj.required(KEY_FORMAT_VERSION)?;
    if version.as_i64() != Some(FORMAT_VERSION) {
        return Err(obj.err(
            KEY_FORMAT_VERSION,
            format!("is unsupported ({version}, expected {FORMAT_VERSION})"),
        ));
    }

    // Token and URL come as a pair; either one alone means no web service.
    let web_service = match (
        obj.opt_str(KEY_AUTHENTICATION_TOKEN)?,
        obj.opt_str(KEY_WEB_SERVICE_URL)?,
    ) {
        (Some(authentication_token), Some(url)) => Some(WebService {
            authentication_token,
            url,
        }),
        _ => None,
    };

    Ok(Pass {
        description: obj.req_str(KEY_DESCRIPTION)?,
        organization_name: obj.req_str(KEY_ORGANIZATION_NAME)?,
        pass_type_identifier: obj.req_str(KEY_PASS_TYPE_IDENTIFIER)?,
        serial_number: obj.req_str(KEY_SERIAL_NUMBER)?,
        team_identifier: obj.req_str(KEY_TEAM_IDENTIFIER)?,
        associated_store_identifiers: obj
            .seq(KEY_ASSOCIATED_STORE_IDENTIFIERS, decode_store_identifier)?,
        locations: obj.seq(KEY_LOCATIONS, decode_location)?,
        relevant_date: obj.opt_date(KEY_RELEVANT_DATE)?,
        barcode: obj.get(KEY_BARCODE).map(decode_barcode).transpose()?,
        background_color: obj.opt_color(KEY_BACKGROUND_COLOR)?,
        foreground_color: obj.opt_color(KEY_FOREGROUND_COLOR)?,
        label_color: obj.opt_color(KEY_LABEL_COLOR)?,
        logo_text: obj.opt_str(KEY_LOGO_TEXT)?,
        suppress_strip_shine: obj.opt_bool(KEY_SUPPRESS_STRIP_SHINE)?,
        web_service,
        pass_type: decode_pass_type(&obj)?,
    })
}

/// Decode `pass.json` bytes.
pub fn from_slice(bytes: &[u8]) -> Result<Pass> {
    let value: Value = serde_json::from_slice(bytes)?;
    decode_pass(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alignment, BarcodeFormat, DateTimeStyle, NumberStyle};
    use serde_json::json;

    fn base_doc() -> Value {
        json!({
            "formatVersion": 1,
            "description": "Ticket",
            "organizationName": "Example",
            "passTypeIdentifier": "pass.com.example",
            "serialNumber": "123",
            "teamIdentifier": "TEAMID1234",
        })
    }

    fn with(mut doc: Value, key: &str, value: Value) -> Value {
        doc.as_object_mut().unwrap().insert(key.to_string(), value);
        doc
    }

    #[test]
    fn test_decode_field_values() {
        assert_eq!(decode_value(&json!(42)).unwrap(), PassValue::Int(42));
        assert_eq!(decode_value(&json!(-7)).unwrap(), PassValue::Int(-7));
        assert_eq!(decode_value(&json!(4.25)).unwrap(), PassValue::Double(4.25));
        assert_eq!(
            decode_value(&json!("Gate 4")).unwrap(),
            PassValue::Text("Gate 4".into())
        );
        assert_eq!(
            decode_value(&json!("2024-05-01T18:30:00+02:00")).unwrap(),
            PassValue::Date(DateTime::parse_from_rfc3339("2024-05-01T18:30:00+02:00").unwrap())
        );
        assert!(decode_value(&json!(true)).is_err());
        assert!(decode_value(&json!([1])).is_err());
    }

    #[test]
    fn test_only_integer_literals_decode_as_int() {
        let decode = |text: &str| decode_value(&serde_json::from_str::<Value>(text).unwrap()).unwrap();
        assert_eq!(decode("2"), PassValue::Int(2));
        assert_eq!(decode("2.0"), PassValue::Double(2.0));
        assert_eq!(decode("1e2"), PassValue::Double(100.0));
        assert_eq!(decode("18446744073709551615"), PassValue::Double(18446744073709551615.0));
    }

    #[test]
    fn test_date_like_text_outside_format_stays_text() {
        // Missing seconds: not the pass timestamp profile.
        assert_eq!(
            decode_value(&json!("2024-05-01T18:30+02:00")).unwrap(),
            PassValue::Text("2024-05-01T18:30+02:00".into())
        );
        assert_eq!(
            decode_value(&json!("20240501")).unwrap(),
            PassValue::Text("20240501".into())
        );
    }

    #[test]
    fn test_type_tie_break_follows_priority() {
        let doc = with(
            with(base_doc(), "generic", json!({"primaryFields": []})),
            "coupon",
            json!({"primaryFields": [{"key": "c", "value": "coupon wins"}]}),
        );
        let pass = decode_pass(&doc).unwrap();
        match pass.pass_type {
            PassType::Coupon(content) => {
                assert_eq!(content.primary_fields[0].value, PassValue::Text("coupon wins".into()));
            }
            other => panic!("expected coupon, got {other:?}"),
        }
    }

    #[test]
    fn test_boarding_pass_requires_transit_type() {
        let doc = with(base_doc(), "boardingPass", json!({"primaryFields": []}));
        let err = decode_pass(&doc).unwrap_err();
        assert!(
            matches!(&err, Error::Schema { structure: "BoardingPass", field, .. } if field == "transitType"),
            "{err}"
        );

        let doc = with(
            base_doc(),
            "boardingPass",
            json!({"transitType": "PKTransitTypeBus"}),
        );
        let pass = decode_pass(&doc).unwrap();
        assert_eq!(
            pass.pass_type,
            PassType::BoardingPass(TransitType::Bus, PassContent::default())
        );
    }

    #[test]
    fn test_missing_category_is_schema_error() {
        let err = decode_pass(&base_doc()).unwrap_err();
        assert!(matches!(err, Error::Schema { structure: "Pass", .. }));
    }

    #[test]
    fn test_category_must_be_object() {
        let doc = with(base_doc(), "eventTicket", json!([]));
        let err = decode_pass(&doc).unwrap_err();
        assert!(matches!(err, Error::Schema { structure: "EventTicket", .. }));
    }

    #[test]
    fn test_unknown_enum_names_field() {
        let doc = with(
            base_doc(),
            "generic",
            json!({"backFields": [{"key": "k", "value": 1, "textAlignment": "PKTextAlignmentJustified"}]}),
        );
        let err = decode_pass(&doc).unwrap_err();
        assert!(err.to_string().contains("textAlignment"), "{err}");
        assert!(err.to_string().contains("PKTextAlignmentJustified"), "{err}");
    }

    #[test]
    fn test_missing_required_key() {
        let mut doc = with(base_doc(), "generic", json!({}));
        doc.as_object_mut().unwrap().remove("teamIdentifier");
        let err = decode_pass(&doc).unwrap_err();
        assert!(
            matches!(&err, Error::Schema { structure: "Pass", field, .. } if field == "teamIdentifier")
        );
    }

    #[test]
    fn test_format_version_checked() {
        let doc = with(with(base_doc(), "generic", json!({})), "formatVersion", json!(2));
        assert!(decode_pass(&doc).is_err());
    }

    #[test]
    fn test_partial_web_service_decodes_as_absent() {
        let doc = with(
            with(base_doc(), "generic", json!({})),
            "authenticationToken",
            json!("0123456789abcdef"),
        );
        assert_eq!(decode_pass(&doc).unwrap().web_service, None);

        let doc = with(
            with(base_doc(), "generic", json!({})),
            "webServiceURL",
            json!("https://example.com"),
        );
        assert_eq!(decode_pass(&doc).unwrap().web_service, None);

        let doc = with(
            with(
                with(base_doc(), "generic", json!({})),
                "webServiceURL",
                json!("https://example.com"),
            ),
            "authenticationToken",
            json!("0123456789abcdef"),
        );
        assert_eq!(
            decode_pass(&doc).unwrap().web_service,
            Some(WebService {
                authentication_token: "0123456789abcdef".into(),
                url: "https://example.com".into(),
            })
        );
    }

    #[test]
    fn test_decode_full_document() {
        let doc = json!({
            "formatVersion": 1,
            "description": "Flight",
            "organizationName": "Air Example",
            "passTypeIdentifier": "pass.com.example.air",
            "serialNumber": "abc",
            "teamIdentifier": "TEAMID1234",
            "associatedStoreIdentifiers": [284882215],
            "locations": [{"latitude": 37.33, "longitude": -122.03, "altitude": 10.5, "relevantText": "Near the gate"}],
            "relevantDate": "2024-05-01T18:30:00+02:00",
            "barcode": {"format": "PKBarcodeFormatQR", "message": "abc", "messageEncoding": "iso-8859-1"},
            "foregroundColor": "rgb(255,255,255)",
            "labelColor": "rgb(0,0,0)",
            "logoText": "Air Example",
            "suppressStripShine": false,
            "boardingPass": {
                "transitType": "PKTransitTypeAir",
                "headerFields": [{"key": "gate", "value": "B12", "label": "Gate", "textAlignment": "PKTextAlignmentCenter"}],
                "primaryFields": [{"key": "from", "value": "SFO"}],
                "backFields": [{"key": "fare", "value": 199.5, "currencyCode": "USD", "numberStyle": "PKNumberStyleDecimal",
                                "dateStyle": "PKDateStyleFull"}]
            }
        });

        let pass = decode_pass(&doc).unwrap();
        assert_eq!(pass.associated_store_identifiers, vec![284882215]);
        assert_eq!(pass.locations[0].altitude, Some(10.5));
        assert_eq!(pass.barcode.as_ref().unwrap().format, BarcodeFormat::QrCode);
        assert_eq!(pass.barcode.as_ref().unwrap().alt_text, None);
        assert_eq!(pass.background_color, None);
        assert_eq!(pass.foreground_color.unwrap().to_string(), "rgb(255,255,255)");
        assert_eq!(pass.suppress_strip_shine, Some(false));

        let PassType::BoardingPass(TransitType::Air, content) = &pass.pass_type else {
            panic!("expected air boarding pass");
        };
        assert_eq!(content.header_fields[0].text_alignment, Some(Alignment::Center));
        assert!(content.secondary_fields.is_empty());
        assert_eq!(content.back_fields[0].number_style, Some(NumberStyle::Decimal));
        assert_eq!(content.back_fields[0].date_style, Some(DateTimeStyle::Full));
        assert_eq!(content.back_fields[0].value, PassValue::Double(199.5));
    }

    #[test]
    fn test_invalid_color_rejected() {
        let doc = with(
            with(base_doc(), "generic", json!({})),
            "backgroundColor",
            json!("rgb(300,0,0)"),
        );
        let err = decode_pass(&doc).unwrap_err();
        assert!(err.to_string().contains("backgroundColor"));
    }
}
