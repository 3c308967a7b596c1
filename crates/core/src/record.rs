//! Asset records as the generator consumes them.
//!
//! Records arrive from the inventory database (or a JSON export of it) and
//! are read-only here: the generator formats what is present and skips what
//! is not.

use serde::{Deserialize, Serialize};

/// Conservation state of an asset.
///
/// Wire codes are the single letters the inventory database stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Factory new.
    #[serde(rename = "N")]
    New,
    /// In good condition.
    #[serde(rename = "B")]
    Good,
    /// Usable with visible wear.
    #[serde(rename = "R")]
    Fair,
    /// Deteriorated.
    #[serde(rename = "M")]
    Poor,
    /// Electronic waste pending disposal.
    #[serde(rename = "E")]
    EWaste,
    /// Scrap.
    #[serde(rename = "C")]
    Scrap,
}

impl Condition {
    /// Display label for the sticker.
    pub fn label(self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
            Condition::EWaste => "E-waste",
            Condition::Scrap => "Scrap",
        }
    }
}

/// One patrimonial asset, as exposed to the label generator.
///
/// Only `code` is required; every other attribute is optional and a field
/// whose data is absent is skipped entirely on the label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetRecord {
    /// Unique patrimonial asset code.
    pub code: String,
    /// Catalog description.
    pub description: Option<String>,
    /// Code of the office holding the asset.
    pub office_code: Option<String>,
    /// Name of the office holding the asset.
    pub office_name: Option<String>,
    /// Conservation state.
    pub condition: Option<Condition>,
    /// Brand.
    pub brand: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Serial number.
    pub serial: Option<String>,
    /// Vehicle plate.
    pub plate: Option<String>,
    /// Opaque QR payload (typically the asset's lookup token).
    pub qr_payload: Option<String>,
}

impl AssetRecord {
    /// The office line as rendered on the label: `"CODE - Name"`, or
    /// whichever half is present.
    pub fn office_line(&self) -> Option<String> {
        match (non_empty(&self.office_code), non_empty(&self.office_name)) {
            (Some(code), Some(name)) => Some(format!("{code} - {name}")),
            (Some(code), None) => Some(code.to_string()),
            (None, Some(name)) => Some(name.to_string()),
            (None, None) => None,
        }
    }

    /// Brand and model joined on one line; `None` when both are absent.
    pub fn brand_model_line(&self) -> Option<String> {
        match (non_empty(&self.brand), non_empty(&self.model)) {
            (Some(brand), Some(model)) => Some(format!("{brand} {model}")),
            (Some(brand), None) => Some(brand.to_string()),
            (None, Some(model)) => Some(model.to_string()),
            (None, None) => None,
        }
    }

    /// The QR payload, if present and non-empty.
    pub fn qr_payload(&self) -> Option<&str> {
        non_empty(&self.qr_payload)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
