//! The pass root and its category variants.

use super::barcode::Barcode;
use super::color::RgbColor;
use super::field::PassField;
use chrono::{DateTime, FixedOffset};

/// Transit mode of a boarding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitType {
    Air,
    Boat,
    Bus,
    Train,
    GenericTransit,
}

/// Fields of a pass grouped by display region, each in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassContent {
    pub header_fields: Vec<PassField>,
    pub primary_fields: Vec<PassField>,
    pub secondary_fields: Vec<PassField>,
    pub auxiliary_fields: Vec<PassField>,
    pub back_fields: Vec<PassField>,
}

impl PassContent {
    /// Iterate all fields, region by region.
    pub fn fields(&self) -> impl Iterator<Item = &PassField> {
        self.header_fields
            .iter()
            .chain(&self.primary_fields)
            .chain(&self.secondary_fields)
            .chain(&self.auxiliary_fields)
            .chain(&self.back_fields)
    }
}

/// Pass category. Each variant owns the pass's single [`PassContent`].
#[derive(Debug, Clone, PartialEq)]
pub enum PassType {
    BoardingPass(TransitType, PassContent),
    Coupon(PassContent),
    Event(PassContent),
    GenericPass(PassContent),
    StoreCard(PassContent),
}

impl PassType {
    pub fn content(&self) -> &PassContent {
        match self {
            PassType::BoardingPass(_, content)
            | PassType::Coupon(content)
            | PassType::Event(content)
            | PassType::GenericPass(content)
            | PassType::StoreCard(content) => content,
        }
    }

    pub fn content_mut(&mut self) -> &mut PassContent {
        match self {
            PassType::BoardingPass(_, content)
            | PassType::Coupon(content)
            | PassType::Event(content)
            | PassType::GenericPass(content)
            | PassType::StoreCard(content) => content,
        }
    }
}

/// A location near which the pass becomes relevant.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level.
    pub altitude: Option<f64>,
    /// Lock-screen text shown when the user is near the location.
    pub relevant_text: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            relevant_text: None,
        }
    }
}

/// Pass update web service. Token and URL exist together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebService {
    pub authentication_token: String,
    pub url: String,
}

/// A wallet pass.
///
/// `serial_number` is overwritten with the pass identifier by the signing
/// pipeline before the pass is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub description: String,
    pub organization_name: String,
    pub pass_type_identifier: String,
    pub serial_number: String,
    pub team_identifier: String,
    /// App Store identifiers of associated apps.
    pub associated_store_identifiers: Vec<u64>,
    pub locations: Vec<Location>,
    pub relevant_date: Option<DateTime<FixedOffset>>,
    pub barcode: Option<Barcode>,
    pub background_color: Option<RgbColor>,
    pub foreground_color: Option<RgbColor>,
    pub label_color: Option<RgbColor>,
    pub logo_text: Option<String>,
    pub suppress_strip_shine: Option<bool>,
    pub web_service: Option<WebService>,
    pub pass_type: PassType,
}

impl Pass {
    /// A pass with the required attributes and every optional one absent.
    pub fn new(
        description: impl Into<String>,
        organization_name: impl Into<String>,
        pass_type_identifier: impl Into<String>,
        serial_number: impl Into<String>,
        team_identifier: impl Into<String>,
        pass_type: PassType,
    ) -> Self {
        Self {
            description: description.into(),
            organization_name: organization_name.into(),
            pass_type_identifier: pass_type_identifier.into(),
            serial_number: serial_number.into(),
            team_identifier: team_identifier.into(),
            associated_store_identifiers: Vec::new(),
            locations: Vec::new(),
            relevant_date: None,
            barcode: None,
            background_color: None,
            foreground_color: None,
            label_color: None,
            logo_text: None,
            suppress_strip_shine: None,
            web_service: None,
            pass_type,
        }
    }
}

/// Point the barcode's message and alt text at `id`.
///
/// A pass without a barcode is returned unchanged. Usable directly as the
/// modifier of [`crate::PassSigner::sign_with`].
pub fn update_barcode(id: &str, mut pass: Pass) -> Pass {
    if let Some(barcode) = pass.barcode.as_mut() {
        barcode.message = id.to_string();
        barcode.alt_text = Some(id.to_string());
    }
    pass
}
