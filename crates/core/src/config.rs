//! Label configuration: geometry, content selection, and printer-aware
//! validation.
//!
//! Construction is total — any numeric values are accepted — and
//! [`LabelConfig::validate`] is the single source of truth for validity.
//! The generator refuses configurations whose `validate()` is non-empty,
//! so callers check explicitly before generating.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tagforge_profile::{Resolution, dots_to_mm, mm_to_dots, profile_for, resolution_for_model};

/// Gap in dots between the QR block and the adjacent text area.
pub(crate) const QR_CONTENT_GAP: u32 = 10;

/// Width threshold in dots below which a label gets the compact preset
/// (fewer fields, no date, no separator).
const COMPACT_WIDTH: u32 = 500;

// ── Field and font vocabulary ───────────────────────────────────────────

/// One named piece of asset data that may be rendered as a text line.
///
/// Declared order in [`LabelConfig::fields`] is render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// The unique patrimonial asset code (title line).
    AssetCode,
    /// Catalog description of the asset.
    Description,
    /// Office code and name where the asset is located.
    Office,
    /// Conservation state of the asset.
    Condition,
    /// Brand and model, joined on one line.
    BrandModel,
    /// Serial number.
    Serial,
    /// Vehicle plate.
    Plate,
}

impl FieldKind {
    /// The standard six-field set rendered on medium and large labels.
    pub const STANDARD: [FieldKind; 6] = [
        FieldKind::AssetCode,
        FieldKind::Description,
        FieldKind::Office,
        FieldKind::Condition,
        FieldKind::BrandModel,
        FieldKind::Serial,
    ];

    /// The reduced set rendered on compact tickets.
    pub const COMPACT: [FieldKind; 4] = [
        FieldKind::AssetCode,
        FieldKind::Description,
        FieldKind::Office,
        FieldKind::Condition,
    ];

    /// Font role this field renders with.
    pub fn role(self) -> FontRole {
        match self {
            FieldKind::AssetCode => FontRole::Title,
            FieldKind::Description | FieldKind::Office | FieldKind::Condition => FontRole::Body,
            FieldKind::BrandModel | FieldKind::Serial | FieldKind::Plate => FontRole::Small,
        }
    }
}

/// Font role of a rendered field; each role has its own configured height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontRole {
    /// Prominent title line (the asset code).
    Title,
    /// Regular content line.
    Body,
    /// De-emphasized detail line.
    Small,
}

/// Per-role font heights in dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSizes {
    /// Height of title-role text.
    pub title: u32,
    /// Height of body-role text.
    pub body: u32,
    /// Height of small-role text.
    pub small: u32,
}

impl FontSizes {
    /// Height in dots for the given role.
    pub fn for_role(&self, role: FontRole) -> u32 {
        match role {
            FontRole::Title => self.title,
            FontRole::Body => self.body,
            FontRole::Small => self.small,
        }
    }
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 30,
            body: 20,
            small: 15,
        }
    }
}

/// Placement of the QR block relative to the text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QrPosition {
    /// QR on the left edge, text to its right.
    #[default]
    Left,
    /// QR on the right edge, text to its left.
    Right,
    /// QR along the top, text below.
    Top,
    /// QR along the bottom, text above.
    Bottom,
}

// ── Configuration ───────────────────────────────────────────────────────

/// Immutable-once-validated description of a label's geometry, content
/// selection, and target printer.
///
/// Invalid numeric values are representable; [`LabelConfig::validate`]
/// reports every violation and the generator rejects configurations that
/// fail it. Defaults describe the medium 400×300 sticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Label width in dots. Valid range 200–1400.
    pub width: u32,
    /// Label height in dots. Valid range 150–1000.
    pub height: u32,
    /// Print resolution, used for unit conversion and printer checks only.
    pub resolution: Resolution,
    /// Inset from every label edge in dots. Valid range 5–50.
    pub margin: u32,
    /// Whether to render the QR block.
    pub include_qr: bool,
    /// QR edge length in dots; must fit `min(width, height) - 2 * margin`.
    pub qr_size: u32,
    /// Placement of the QR block.
    pub qr_position: QrPosition,
    /// Fields to render, in order.
    pub fields: Vec<FieldKind>,
    /// Per-role font heights.
    pub fonts: FontSizes,
    /// Whether to trace the label edges with border rectangles.
    pub include_border: bool,
    /// Border rectangle thickness in dots.
    pub border_thickness: u32,
    /// Whether to stamp the generation date bottom-right.
    pub include_date: bool,
    /// Whether to draw a horizontal rule near the bottom edge.
    pub include_separator: bool,
    /// Target printer model; when set and known, width is validated
    /// against that printer's maximum at [`LabelConfig::resolution`].
    pub printer_model: Option<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        let height = 300;
        let margin = 15;
        Self {
            width: 400,
            height,
            resolution: Resolution::default(),
            margin,
            include_qr: true,
            qr_size: default_qr_size(height, margin),
            qr_position: QrPosition::default(),
            fields: FieldKind::STANDARD.to_vec(),
            fonts: FontSizes::default(),
            include_border: true,
            border_thickness: 2,
            include_date: true,
            include_separator: true,
            printer_model: None,
        }
    }
}

/// Default QR edge: half the interior height, capped at 100 dots.
fn default_qr_size(height: u32, margin: u32) -> u32 {
    (height.saturating_sub(2 * margin) / 2).min(100)
}

/// A single configuration violation reported by [`LabelConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    /// Width outside the printable range.
    #[error("width must be between 200 and 1400 dots (got {width})")]
    WidthOutOfRange {
        /// The offending width.
        width: u32,
    },
    /// Height outside the printable range.
    #[error("height must be between 150 and 1000 dots (got {height})")]
    HeightOutOfRange {
        /// The offending height.
        height: u32,
    },
    /// Margin outside the supported range.
    #[error("margin must be between 5 and 50 dots (got {margin})")]
    MarginOutOfRange {
        /// The offending margin.
        margin: u32,
    },
    /// QR size does not fit the label interior.
    #[error("QR size {qr_size} is too large for the sticker (max {max})")]
    QrTooLarge {
        /// The configured QR edge length.
        qr_size: u32,
        /// Largest QR edge that fits inside the margins.
        max: u32,
    },
    /// A font role has zero height.
    #[error("{role:?} font height must be positive")]
    ZeroFontHeight {
        /// The role with zero height.
        role: FontRole,
    },
    /// Width exceeds what the target printer can print at this resolution.
    #[error("width ({width} dots) exceeds the maximum for {model} at {dpi} dpi ({max} dots)")]
    WidthExceedsPrinter {
        /// The configured width.
        width: u32,
        /// The target printer model.
        model: String,
        /// The resolution checked against.
        dpi: u32,
        /// The printer's maximum width at that resolution.
        max: u32,
    },
}

/// Result of a read-only printer compatibility query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compatibility {
    /// Whether the configuration would print on the queried printer.
    pub compatible: bool,
    /// Explanation, phrased for end users.
    pub message: String,
}

/// Label dimensions expressed in both dots and millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicalDimensions {
    /// Width in millimeters, rounded to one decimal.
    pub width_mm: f64,
    /// Height in millimeters, rounded to one decimal.
    pub height_mm: f64,
    /// Width in dots.
    pub width_dots: u32,
    /// Height in dots.
    pub height_dots: u32,
    /// Resolution the conversion used, in dpi.
    pub dpi: u32,
}

/// The rectangle available for text fields, net of margins and QR space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentArea {
    /// Left edge in dots.
    pub x: u32,
    /// Top edge in dots.
    pub y: u32,
    /// Width in dots.
    pub width: u32,
    /// Height in dots.
    pub height: u32,
}

impl LabelConfig {
    /// Check every geometric invariant, returning one issue per violation.
    ///
    /// An empty vector means the configuration is valid. Out-of-range
    /// input is reported, never panicked on.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.width < 200 || self.width > 1400 {
            issues.push(ConfigIssue::WidthOutOfRange { width: self.width });
        }
        if self.height < 150 || self.height > 1000 {
            issues.push(ConfigIssue::HeightOutOfRange {
                height: self.height,
            });
        }
        if self.margin < 5 || self.margin > 50 {
            issues.push(ConfigIssue::MarginOutOfRange {
                margin: self.margin,
            });
        }

        let qr_max = self
            .width
            .min(self.height)
            .saturating_sub(2 * self.margin);
        if self.qr_size > qr_max {
            issues.push(ConfigIssue::QrTooLarge {
                qr_size: self.qr_size,
                max: qr_max,
            });
        }

        for role in [FontRole::Title, FontRole::Body, FontRole::Small] {
            if self.fonts.for_role(role) == 0 {
                issues.push(ConfigIssue::ZeroFontHeight { role });
            }
        }

        // Width check against the target printer, at this configuration's
        // own resolution. Unknown models and undeclared resolutions are
        // skipped here; `is_compatible_with` reports them.
        if let Some(model) = &self.printer_model
            && let Some(profile) = profile_for(model)
            && let Some(max) = profile.max_width_dots(self.resolution)
            && self.width > max
        {
            issues.push(ConfigIssue::WidthExceedsPrinter {
                width: self.width,
                model: model.clone(),
                dpi: self.resolution.dpi(),
                max,
            });
        }

        issues
    }

    /// Would this configuration print on `model` at `resolution`?
    ///
    /// Read-only and independent of the configuration's own
    /// `printer_model`/`resolution` fields. Unknown models are
    /// incompatible with an explanatory message, never an error.
    pub fn is_compatible_with(&self, model: &str, resolution: Resolution) -> Compatibility {
        let Some(profile) = profile_for(model) else {
            return Compatibility {
                compatible: false,
                message: format!("printer {model} not recognized"),
            };
        };

        if let Some(max) = profile.max_width_dots(resolution)
            && self.width > max
        {
            let width_mm = dots_to_mm(self.width, resolution);
            return Compatibility {
                compatible: false,
                message: format!(
                    "width {width_mm}mm exceeds the {}mm maximum for {model}",
                    profile.max_width_mm
                ),
            };
        }

        Compatibility {
            compatible: true,
            message: format!("compatible with {model} at {} dpi", resolution.dpi()),
        }
    }

    /// Dimensions in millimeters (and dots) at this configuration's
    /// resolution.
    pub fn physical_dimensions(&self) -> PhysicalDimensions {
        PhysicalDimensions {
            width_mm: dots_to_mm(self.width, self.resolution),
            height_mm: dots_to_mm(self.height, self.resolution),
            width_dots: self.width,
            height_dots: self.height,
            dpi: self.resolution.dpi(),
        }
    }

    /// The rectangle available for text, net of margins and — when the QR
    /// is included — the QR edge plus a fixed gap on its adjacent side.
    ///
    /// Saturating arithmetic: configurations that fail [`validate`](Self::validate)
    /// degrade to an empty area instead of panicking.
    pub fn content_area(&self) -> ContentArea {
        let interior_w = self.width.saturating_sub(2 * self.margin);
        let interior_h = self.height.saturating_sub(2 * self.margin);

        if !self.include_qr {
            return ContentArea {
                x: self.margin,
                y: self.margin,
                width: interior_w,
                height: interior_h,
            };
        }

        let reserved = self.qr_size + QR_CONTENT_GAP;
        match self.qr_position {
            QrPosition::Left => ContentArea {
                x: self.margin + reserved,
                y: self.margin,
                width: interior_w.saturating_sub(reserved),
                height: interior_h,
            },
            QrPosition::Right => ContentArea {
                x: self.margin,
                y: self.margin,
                width: interior_w.saturating_sub(reserved),
                height: interior_h,
            },
            QrPosition::Top => ContentArea {
                x: self.margin,
                y: self.margin + reserved,
                width: interior_w,
                height: interior_h.saturating_sub(reserved),
            },
            QrPosition::Bottom => ContentArea {
                x: self.margin,
                y: self.margin,
                width: interior_w,
                height: interior_h.saturating_sub(reserved),
            },
        }
    }
}

// ── Factory ─────────────────────────────────────────────────────────────

/// The requested printer model is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("printer {model} not recognized")]
pub struct UnknownPrinter {
    /// The model identifier that failed the lookup.
    pub model: String,
}

/// Caller-supplied overrides for [`LabelConfig::for_printer`].
///
/// Every field is optional; set fields win over the printer preset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    /// Override the preset margin.
    pub margin: Option<u32>,
    /// Override the preset QR edge length.
    pub qr_size: Option<u32>,
    /// Override the QR placement.
    pub qr_position: Option<QrPosition>,
    /// Override whether the QR is rendered.
    pub include_qr: Option<bool>,
    /// Override the rendered field set.
    pub fields: Option<Vec<FieldKind>>,
    /// Override the per-role font heights.
    pub fonts: Option<FontSizes>,
    /// Override whether the border is drawn.
    pub include_border: Option<bool>,
    /// Override the border thickness.
    pub border_thickness: Option<u32>,
    /// Override whether the date stamp is rendered.
    pub include_date: Option<bool>,
    /// Override whether the separator rule is drawn.
    pub include_separator: Option<bool>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut LabelConfig) {
        if let Some(margin) = self.margin {
            config.margin = margin;
        }
        if let Some(qr_size) = self.qr_size {
            config.qr_size = qr_size;
        }
        if let Some(qr_position) = self.qr_position {
            config.qr_position = qr_position;
        }
        if let Some(include_qr) = self.include_qr {
            config.include_qr = include_qr;
        }
        if let Some(fields) = self.fields {
            config.fields = fields;
        }
        if let Some(fonts) = self.fonts {
            config.fonts = fonts;
        }
        if let Some(include_border) = self.include_border {
            config.include_border = include_border;
        }
        if let Some(border_thickness) = self.border_thickness {
            config.border_thickness = border_thickness;
        }
        if let Some(include_date) = self.include_date {
            config.include_date = include_date;
        }
        if let Some(include_separator) = self.include_separator {
            config.include_separator = include_separator;
        }
    }
}

impl LabelConfig {
    /// Build a configuration tuned for a specific printer.
    ///
    /// Resolution comes from the model-suffix convention (`_300` models
    /// print at 300 dpi, the rest at 203). Dot dimensions come from
    /// `physical_size_mm` when given, otherwise from the printer-family
    /// default: compact `ZD411*` printers get a small ticket, the rest a
    /// medium label. Width never exceeds the printer maximum minus a
    /// safety margin. Labels below 500 dots wide get the compact preset
    /// (tighter margin, smaller fonts, four fields, no date stamp, no
    /// separator); wider labels get the full preset. `overrides` win over
    /// the preset.
    pub fn for_printer(
        model: &str,
        physical_size_mm: Option<(f64, f64)>,
        overrides: ConfigOverrides,
    ) -> Result<LabelConfig, UnknownPrinter> {
        let profile = profile_for(model).ok_or_else(|| UnknownPrinter {
            model: model.to_string(),
        })?;

        let resolution = resolution_for_model(model);
        // Fleet-wide fallback when the profile omits this resolution.
        let max_width = profile.max_width_dots(resolution).unwrap_or(match resolution {
            Resolution::Dpi203 => 900,
            Resolution::Dpi300 => 1200,
        });

        let (mut width, height) = match physical_size_mm {
            Some((w_mm, h_mm)) => (mm_to_dots(w_mm, resolution), mm_to_dots(h_mm, resolution)),
            None if model.starts_with("ZD411") => (400.min(max_width.saturating_sub(50)), 250),
            None => (600.min(max_width.saturating_sub(50)), 400),
        };
        if width > max_width {
            width = max_width.saturating_sub(20);
        }

        let mut config = if width < COMPACT_WIDTH {
            LabelConfig {
                width,
                height,
                resolution,
                margin: 10,
                qr_size: 80.min(height.saturating_sub(40)),
                fields: FieldKind::COMPACT.to_vec(),
                fonts: FontSizes {
                    title: 20,
                    body: 15,
                    small: 12,
                },
                include_date: false,
                include_separator: false,
                printer_model: Some(model.to_string()),
                ..LabelConfig::default()
            }
        } else {
            LabelConfig {
                width,
                height,
                resolution,
                margin: 15,
                qr_size: 120.min(height.saturating_sub(60)),
                fields: FieldKind::STANDARD.to_vec(),
                fonts: FontSizes {
                    title: 25,
                    body: 18,
                    small: 14,
                },
                include_date: true,
                include_separator: true,
                printer_model: Some(model.to_string()),
                ..LabelConfig::default()
            }
        };

        overrides.apply(&mut config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LabelConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "default config invalid: {issues:?}");
    }

    #[test]
    fn default_qr_size_caps_at_100() {
        assert_eq!(default_qr_size(300, 15), 100);
        assert_eq!(default_qr_size(200, 15), 85);
    }

    #[test]
    fn field_roles() {
        assert_eq!(FieldKind::AssetCode.role(), FontRole::Title);
        assert_eq!(FieldKind::Office.role(), FontRole::Body);
        assert_eq!(FieldKind::Serial.role(), FontRole::Small);
    }

    #[test]
    fn overrides_win_over_preset() {
        let config = LabelConfig::for_printer(
            "ZD220",
            None,
            ConfigOverrides {
                margin: Some(30),
                include_date: Some(false),
                ..ConfigOverrides::default()
            },
        )
        .unwrap();
        assert_eq!(config.margin, 30);
        assert!(!config.include_date);
        // Untouched preset values survive.
        assert_eq!(config.fonts.title, 25);
        assert!(config.include_separator);
    }

    #[test]
    fn serde_round_trip() {
        let config = LabelConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: LabelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: LabelConfig = serde_json::from_str(r#"{"width": 600}"#).unwrap();
        assert_eq!(config.width, 600);
        assert_eq!(config.height, 300);
        assert!(config.include_qr);
    }
}
