//! Wallet pass wire constants
//!
//! Key names and enumerated string values of the `pass.json` schema, plus
//! the fixed filenames of a pass bundle. The consuming platform matches all
//! of these verbatim.

use crate::model::{Alignment, BarcodeFormat, DateTimeStyle, NumberStyle, TransitType};

// =============================================================================
// Bundle Layout
// =============================================================================

/// Pass document inside the bundle
pub const PASS_FILE: &str = "pass.json";

/// Digest manifest inside the bundle
pub const MANIFEST_FILE: &str = "manifest.json";

/// Detached CMS signature over the manifest
pub const SIGNATURE_FILE: &str = "signature";

/// Archive extension of a signed pass
pub const ARCHIVE_EXTENSION: &str = "pkpass";

// =============================================================================
// Schema
// =============================================================================

/// Value of `formatVersion`; always emitted, never configurable
pub const FORMAT_VERSION: i64 = 1;

/// Timestamp profile for date values and `relevantDate`
///
/// W3C/ISO-8601 date and time with seconds and a numeric UTC offset,
/// e.g. `2024-05-01T18:30:00+02:00`.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Category tag keys, in decode priority order
pub const PASS_TYPE_KEYS: [&str; 5] = [
    KEY_BOARDING_PASS,
    KEY_COUPON,
    KEY_EVENT_TICKET,
    KEY_STORE_CARD,
    KEY_GENERIC,
];

pub const KEY_BOARDING_PASS: &str = "boardingPass";
pub const KEY_COUPON: &str = "coupon";
pub const KEY_EVENT_TICKET: &str = "eventTicket";
pub const KEY_STORE_CARD: &str = "storeCard";
pub const KEY_GENERIC: &str = "generic";

// Pass keys
pub const KEY_FORMAT_VERSION: &str = "formatVersion";
pub const KEY_DESCRIPTION: &str = "description";
pub const KEY_ORGANIZATION_NAME: &str = "organizationName";
pub const KEY_PASS_TYPE_IDENTIFIER: &str = "passTypeIdentifier";
pub const KEY_SERIAL_NUMBER: &str = "serialNumber";
pub const KEY_TEAM_IDENTIFIER: &str = "teamIdentifier";
pub const KEY_ASSOCIATED_STORE_IDENTIFIERS: &str = "associatedStoreIdentifiers";
pub const KEY_LOCATIONS: &str = "locations";
pub const KEY_RELEVANT_DATE: &str = "relevantDate";
pub const KEY_BARCODE: &str = "barcode";
pub const KEY_BACKGROUND_COLOR: &str = "backgroundColor";
pub const KEY_FOREGROUND_COLOR: &str = "foregroundColor";
pub const KEY_LABEL_COLOR: &str = "labelColor";
pub const KEY_LOGO_TEXT: &str = "logoText";
pub const KEY_SUPPRESS_STRIP_SHINE: &str = "suppressStripShine";
pub const KEY_AUTHENTICATION_TOKEN: &str = "authenticationToken";
pub const KEY_WEB_SERVICE_URL: &str = "webServiceURL";

// Content keys
pub const KEY_TRANSIT_TYPE: &str = "transitType";
pub const KEY_HEADER_FIELDS: &str = "headerFields";
pub const KEY_PRIMARY_FIELDS: &str = "primaryFields";
pub const KEY_SECONDARY_FIELDS: &str = "secondaryFields";
pub const KEY_AUXILIARY_FIELDS: &str = "auxiliaryFields";
pub const KEY_BACK_FIELDS: &str = "backFields";

// Field keys
pub const KEY_KEY: &str = "key";
pub const KEY_VALUE: &str = "value";
pub const KEY_CHANGE_MESSAGE: &str = "changeMessage";
pub const KEY_LABEL: &str = "label";
pub const KEY_TEXT_ALIGNMENT: &str = "textAlignment";
pub const KEY_DATE_STYLE: &str = "dateStyle";
pub const KEY_TIME_STYLE: &str = "timeStyle";
pub const KEY_IS_RELATIVE: &str = "isRelative";
pub const KEY_CURRENCY_CODE: &str = "currencyCode";
pub const KEY_NUMBER_STYLE: &str = "numberStyle";

// Barcode keys
pub const KEY_FORMAT: &str = "format";
pub const KEY_MESSAGE: &str = "message";
pub const KEY_MESSAGE_ENCODING: &str = "messageEncoding";
pub const KEY_ALT_TEXT: &str = "altText";

// Location keys
pub const KEY_LATITUDE: &str = "latitude";
pub const KEY_LONGITUDE: &str = "longitude";
pub const KEY_ALTITUDE: &str = "altitude";
pub const KEY_RELEVANT_TEXT: &str = "relevantText";

// =============================================================================
// Enumerated Values
// =============================================================================

/// Mapping between a closed enum and its fixed wire strings.
pub trait WireEnum: Sized + Copy + 'static {
    /// Every variant with its wire string.
    const TABLE: &'static [(Self, &'static str)];

    fn wire_name(self) -> &'static str;

    fn from_wire(s: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(variant, _)| *variant)
    }
}

impl WireEnum for TransitType {
    const TABLE: &'static [(Self, &'static str)] = &[
        (TransitType::Air, "PKTransitTypeAir"),
        (TransitType::Boat, "PKTransitTypeBoat"),
        (TransitType::Bus, "PKTransitTypeBus"),
        (TransitType::Train, "PKTransitTypeTrain"),
        (TransitType::GenericTransit, "PKTransitTypeGeneric"),
    ];

    fn wire_name(self) -> &'static str {
        match self {
            TransitType::Air => "PKTransitTypeAir",
            TransitType::Boat => "PKTransitTypeBoat",
            TransitType::Bus => "PKTransitTypeBus",
            TransitType::Train => "PKTransitTypeTrain",
            TransitType::GenericTransit => "PKTransitTypeGeneric",
        }
    }
}

impl WireEnum for Alignment {
    const TABLE: &'static [(Self, &'static str)] = &[
        (Alignment::Left, "PKTextAlignmentLeft"),
        (Alignment::Center, "PKTextAlignmentCenter"),
        (Alignment::Right, "PKTextAlignmentRight"),
        (Alignment::Natural, "PKTextAlignmentNatural"),
    ];

    fn wire_name(self) -> &'static str {
        match self {
            Alignment::Left => "PKTextAlignmentLeft",
            Alignment::Center => "PKTextAlignmentCenter",
            Alignment::Right => "PKTextAlignmentRight",
            Alignment::Natural => "PKTextAlignmentNatural",
        }
    }
}

impl WireEnum for DateTimeStyle {
    const TABLE: &'static [(Self, &'static str)] = &[
        (DateTimeStyle::None, "PKDateStyleNone"),
        (DateTimeStyle::Short, "PKDateStyleShort"),
        (DateTimeStyle::Medium, "PKDateStyleMedium"),
        (DateTimeStyle::Long, "PKDateStyleLong"),
        (DateTimeStyle::Full, "PKDateStyleFull"),
    ];

    fn wire_name(self) -> &'static str {
        match self {
            DateTimeStyle::None => "PKDateStyleNone",
            DateTimeStyle::Short => "PKDateStyleShort",
            DateTimeStyle::Medium => "PKDateStyleMedium",
            DateTimeStyle::Long => "PKDateStyleLong",
            DateTimeStyle::Full => "PKDateStyleFull",
        }
    }
}

impl WireEnum for NumberStyle {
    const TABLE: &'static [(Self, &'static str)] = &[
        (NumberStyle::Decimal, "PKNumberStyleDecimal"),
        (NumberStyle::Percent, "PKNumberStylePercent"),
        (NumberStyle::Scientific, "PKNumberStyleScientific"),
        (NumberStyle::SpellOut, "PKNumberStyleSpellOut"),
    ];

    fn wire_name(self) -> &'static str {
        match self {
            NumberStyle::Decimal => "PKNumberStyleDecimal",
            NumberStyle::Percent => "PKNumberStylePercent",
            NumberStyle::Scientific => "PKNumberStyleScientific",
            NumberStyle::SpellOut => "PKNumberStyleSpellOut",
        }
    }
}

impl WireEnum for BarcodeFormat {
    const TABLE: &'static [(Self, &'static str)] = &[
        (BarcodeFormat::QrCode, "PKBarcodeFormatQR"),
        (BarcodeFormat::Pdf417, "PKBarcodeFormatPDF417"),
        (BarcodeFormat::Aztec, "PKBarcodeFormatAztec"),
    ];

    fn wire_name(self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "PKBarcodeFormatQR",
            BarcodeFormat::Pdf417 => "PKBarcodeFormatPDF417",
            BarcodeFormat::Aztec => "PKBarcodeFormatAztec",
        }
    }
}
