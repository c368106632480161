//! Pass fields and their display styles.

use chrono::{DateTime, FixedOffset};

/// The value shown by a [`PassField`].
#[derive(Debug, Clone, PartialEq)]
pub enum PassValue {
    Int(i64),
    Double(f64),
    Date(DateTime<FixedOffset>),
    Text(String),
}

impl From<i64> for PassValue {
    fn from(value: i64) -> Self {
        PassValue::Int(value)
    }
}

impl From<f64> for PassValue {
    fn from(value: f64) -> Self {
        PassValue::Double(value)
    }
}

impl From<DateTime<FixedOffset>> for PassValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        PassValue::Date(value)
    }
}

impl From<&str> for PassValue {
    fn from(value: &str) -> Self {
        PassValue::Text(value.to_string())
    }
}

impl From<String> for PassValue {
    fn from(value: String) -> Self {
        PassValue::Text(value)
    }
}

/// Horizontal alignment of a field's label and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Natural,
}

/// Date or time rendering style, used for both `dateStyle` and `timeStyle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeStyle {
    None,
    Short,
    Medium,
    Long,
    Full,
}

/// Number rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberStyle {
    Decimal,
    Percent,
    Scientific,
    SpellOut,
}

/// A labeled value in one of the five content regions.
///
/// The date styling (`date_style`, `time_style`, `is_relative`) and number
/// styling (`currency_code`, `number_style`) groups are meant to be used
/// one at a time; nothing enforces it.
#[derive(Debug, Clone, PartialEq)]
pub struct PassField {
    /// Unique within the pass.
    pub key: String,
    pub value: PassValue,
    /// Shown when the field changes on update; `%@` is replaced by the new value.
    pub change_message: Option<String>,
    pub label: Option<String>,
    pub text_alignment: Option<Alignment>,
    pub date_style: Option<DateTimeStyle>,
    pub time_style: Option<DateTimeStyle>,
    pub is_relative: Option<bool>,
    /// ISO 4217 currency code.
    pub currency_code: Option<String>,
    pub number_style: Option<NumberStyle>,
}

/// Build a field with no styling attributes.
pub fn mk_simple_field(
    key: impl Into<String>,
    value: impl Into<PassValue>,
    label: Option<&str>,
) -> PassField {
    PassField {
        key: key.into(),
        value: value.into(),
        change_message: None,
        label: label.map(str::to_string),
        text_alignment: None,
        date_style: None,
        time_style: None,
        is_relative: None,
        currency_code: None,
        number_style: None,
    }
}
