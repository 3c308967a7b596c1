//! Printer capability catalog and label size presets for tagforge.
//!
//! The catalog is a static, read-only registry of the Zebra desktop printers
//! the inventory fleet uses, keyed by model identifier. Each entry records
//! the maximum printable width per supported resolution; configurations are
//! checked against it before a label program is generated. Size presets map
//! friendly names to dot dimensions tuned for those printers.

#![warn(missing_docs)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Resolution ──────────────────────────────────────────────────────────

/// Print resolution of a thermal printhead, in dots per inch.
///
/// Only the two resolutions present in the fleet are representable; the
/// value is used for unit conversion and width checks, never for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Resolution {
    /// 203 dpi (8 dots/mm) — the common desktop-printer resolution.
    #[default]
    #[serde(rename = "203")]
    Dpi203,
    /// 300 dpi (12 dots/mm).
    #[serde(rename = "300")]
    Dpi300,
}

impl Resolution {
    /// All supported resolutions.
    pub const ALL: [Resolution; 2] = [Resolution::Dpi203, Resolution::Dpi300];

    /// Dots per inch as a plain number.
    pub fn dpi(self) -> u32 {
        match self {
            Resolution::Dpi203 => 203,
            Resolution::Dpi300 => 300,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dpi())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "203" => Ok(Resolution::Dpi203),
            "300" => Ok(Resolution::Dpi300),
            other => Err(format!("unsupported resolution: {other} (expected 203 or 300)")),
        }
    }
}

/// Convert a dot count to millimeters at the given resolution, rounded to
/// one decimal place.
pub fn dots_to_mm(dots: u32, resolution: Resolution) -> f64 {
    let mm = f64::from(dots) * 25.4 / f64::from(resolution.dpi());
    (mm * 10.0).round() / 10.0
}

/// Convert a millimeter length to dots at the given resolution, truncating
/// toward zero.
pub fn mm_to_dots(mm: f64, resolution: Resolution) -> u32 {
    (mm * f64::from(resolution.dpi()) / 25.4) as u32
}

// ── Printer catalog ─────────────────────────────────────────────────────

/// Capability record for one printer model.
///
/// `max_width_dots_203`/`max_width_dots_300` are `None` when the model does
/// not ship with that printhead resolution; width checks are skipped for
/// resolutions the profile does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrinterProfile {
    /// Model identifier (e.g., `"ZD220"`). Models fixed at one resolution
    /// carry a `_203`/`_300` suffix.
    pub model: &'static str,
    /// Maximum printable width in millimeters.
    pub max_width_mm: u32,
    /// Maximum printable width in dots at 203 dpi.
    pub max_width_dots_203: Option<u32>,
    /// Maximum printable width in dots at 300 dpi.
    pub max_width_dots_300: Option<u32>,
    /// Human-readable description for catalog listings.
    pub description: &'static str,
}

impl PrinterProfile {
    /// Maximum printable width in dots at the given resolution, if this
    /// model supports that resolution.
    pub fn max_width_dots(&self, resolution: Resolution) -> Option<u32> {
        match resolution {
            Resolution::Dpi203 => self.max_width_dots_203,
            Resolution::Dpi300 => self.max_width_dots_300,
        }
    }
}

/// The printer fleet, in catalog order.
pub const PRINTERS: &[PrinterProfile] = &[
    PrinterProfile {
        model: "ZD220",
        max_width_mm: 112,
        max_width_dots_203: Some(897),
        max_width_dots_300: Some(1323),
        description: "Zebra ZD220 - labels up to 112mm",
    },
    PrinterProfile {
        model: "ZD410",
        max_width_mm: 112,
        max_width_dots_203: Some(897),
        max_width_dots_300: Some(1323),
        description: "Zebra ZD410 - tickets up to 112mm",
    },
    PrinterProfile {
        model: "ZD411_203",
        max_width_mm: 56,
        max_width_dots_203: Some(449),
        max_width_dots_300: None,
        description: "Zebra ZD411 (203 dpi) - tickets up to 56mm",
    },
    PrinterProfile {
        model: "ZD411_300",
        max_width_mm: 54,
        max_width_dots_203: None,
        max_width_dots_300: Some(638),
        description: "Zebra ZD411 (300 dpi) - tickets up to 54mm",
    },
];

/// Look up a printer profile by model identifier.
///
/// Unknown models return `None`; callers report that as "not recognized"
/// rather than failing.
pub fn profile_for(model: &str) -> Option<&'static PrinterProfile> {
    PRINTERS.iter().find(|p| p.model == model)
}

/// Resolve the native resolution of a model from its identifier.
///
/// Models fixed at 300 dpi carry a `_300` suffix; everything else in the
/// fleet prints at 203 dpi.
pub fn resolution_for_model(model: &str) -> Resolution {
    if model.ends_with("_300") {
        Resolution::Dpi300
    } else {
        Resolution::Dpi203
    }
}

// ── Size presets ────────────────────────────────────────────────────────

/// A named label size, in dots at a specific resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizePreset {
    /// Preset identifier (e.g., `"medium_label_203"`).
    pub name: &'static str,
    /// Label width in dots.
    pub width_dots: u32,
    /// Label height in dots.
    pub height_dots: u32,
    /// Human-readable description including the physical size.
    pub description: &'static str,
    /// Printer model this preset is tuned for, when there is one.
    pub recommended_printer: Option<&'static str>,
}

/// Named label sizes, in catalog order.
///
/// The `*_203`/`*_300` entries are tuned per printhead; the four legacy
/// names at the end predate the printer catalog and carry no
/// recommendation.
pub const SIZE_PRESETS: &[SizePreset] = &[
    SizePreset {
        name: "small_ticket_203",
        width_dots: 400,
        height_dots: 200,
        description: "Small ticket ZD411 (50x25mm) - 203 dpi",
        recommended_printer: Some("ZD411_203"),
    },
    SizePreset {
        name: "small_ticket_300",
        width_dots: 590,
        height_dots: 295,
        description: "Small ticket ZD411 (50x25mm) - 300 dpi",
        recommended_printer: Some("ZD411_300"),
    },
    SizePreset {
        name: "medium_label_203",
        width_dots: 600,
        height_dots: 400,
        description: "Medium label ZD220/ZD410 (75x50mm) - 203 dpi",
        recommended_printer: Some("ZD220"),
    },
    SizePreset {
        name: "medium_label_300",
        width_dots: 885,
        height_dots: 590,
        description: "Medium label ZD220/ZD410 (75x50mm) - 300 dpi",
        recommended_printer: Some("ZD220"),
    },
    SizePreset {
        name: "large_label_203",
        width_dots: 800,
        height_dots: 600,
        description: "Large label ZD220/ZD410 (100x75mm) - 203 dpi",
        recommended_printer: Some("ZD220"),
    },
    SizePreset {
        name: "large_label_300",
        width_dots: 1181,
        height_dots: 885,
        description: "Large label ZD220/ZD410 (100x75mm) - 300 dpi",
        recommended_printer: Some("ZD220"),
    },
    SizePreset {
        name: "small",
        width_dots: 300,
        height_dots: 200,
        description: "Small (1.5\" x 1\")",
        recommended_printer: None,
    },
    SizePreset {
        name: "medium",
        width_dots: 400,
        height_dots: 300,
        description: "Medium (2\" x 1.5\")",
        recommended_printer: None,
    },
    SizePreset {
        name: "large",
        width_dots: 600,
        height_dots: 400,
        description: "Large (3\" x 2\")",
        recommended_printer: None,
    },
    SizePreset {
        name: "extra_large",
        width_dots: 800,
        height_dots: 600,
        description: "Extra large (4\" x 3\")",
        recommended_printer: None,
    },
];

/// Look up a size preset by name.
pub fn preset_named(name: &str) -> Option<&'static SizePreset> {
    SIZE_PRESETS.iter().find(|s| s.name == name)
}

/// Size presets recommended for a printer model, in catalog order.
pub fn recommended_sizes_for(model: &str) -> Vec<&'static SizePreset> {
    SIZE_PRESETS
        .iter()
        .filter(|s| s.recommended_printer == Some(model))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_lookup_known_models() {
        let p = profile_for("ZD220").unwrap();
        assert_eq!(p.max_width_mm, 112);
        assert_eq!(p.max_width_dots(Resolution::Dpi203), Some(897));
        assert_eq!(p.max_width_dots(Resolution::Dpi300), Some(1323));

        let p = profile_for("ZD411_203").unwrap();
        assert_eq!(p.max_width_dots(Resolution::Dpi203), Some(449));
        assert_eq!(p.max_width_dots(Resolution::Dpi300), None);
    }

    #[test]
    fn profile_lookup_unknown_model_is_none() {
        assert!(profile_for("ZT410").is_none());
        assert!(profile_for("").is_none());
    }

    #[test]
    fn resolution_from_model_suffix() {
        assert_eq!(resolution_for_model("ZD411_300"), Resolution::Dpi300);
        assert_eq!(resolution_for_model("ZD411_203"), Resolution::Dpi203);
        assert_eq!(resolution_for_model("ZD220"), Resolution::Dpi203);
    }

    #[test]
    fn resolution_parse_and_display() {
        assert_eq!("203".parse::<Resolution>().unwrap(), Resolution::Dpi203);
        assert_eq!("300".parse::<Resolution>().unwrap(), Resolution::Dpi300);
        assert!("600".parse::<Resolution>().is_err());
        assert_eq!(Resolution::Dpi203.to_string(), "203");
    }

    #[test]
    fn dots_mm_conversion_round_trips_within_one_dot() {
        for &dots in &[200u32, 400, 600, 897, 1400] {
            for res in Resolution::ALL {
                let mm = dots_to_mm(dots, res);
                let back = mm_to_dots(mm, res);
                assert!(
                    back.abs_diff(dots) <= 1,
                    "{dots} dots -> {mm} mm -> {back} dots at {res} dpi"
                );
            }
        }
    }

    #[test]
    fn dots_to_mm_matches_catalog() {
        // 897 dots at 203 dpi is the ZD220's 112mm printhead.
        assert_eq!(dots_to_mm(897, Resolution::Dpi203), 112.2);
        assert_eq!(mm_to_dots(112.0, Resolution::Dpi203), 895);
    }

    #[test]
    fn recommended_sizes_match_catalog() {
        let zd220 = recommended_sizes_for("ZD220");
        assert_eq!(zd220.len(), 4);
        assert!(zd220.iter().all(|s| s.recommended_printer == Some("ZD220")));

        let zd411 = recommended_sizes_for("ZD411_203");
        assert_eq!(zd411.len(), 1);
        assert_eq!(zd411[0].name, "small_ticket_203");

        assert!(recommended_sizes_for("unknown").is_empty());
    }

    #[test]
    fn preset_lookup() {
        let p = preset_named("medium_label_203").unwrap();
        assert_eq!((p.width_dots, p.height_dots), (600, 400));
        assert!(preset_named("nonexistent").is_none());
    }

    #[test]
    fn preset_widths_fit_recommended_printer() {
        for preset in SIZE_PRESETS {
            let Some(model) = preset.recommended_printer else {
                continue;
            };
            let profile = profile_for(model).expect("recommended printer must exist");
            let res = if preset.name.ends_with("_300") {
                Resolution::Dpi300
            } else {
                Resolution::Dpi203
            };
            if let Some(max) = profile.max_width_dots(res) {
                assert!(
                    preset.width_dots <= max,
                    "{} is wider than {} allows at {} dpi",
                    preset.name,
                    model,
                    res
                );
            }
        }
    }

    #[test]
    fn resolution_serde_uses_numeric_names() {
        let json = serde_json::to_string(&Resolution::Dpi300).unwrap();
        assert_eq!(json, "\"300\"");
        let back: Resolution = serde_json::from_str("\"203\"").unwrap();
        assert_eq!(back, Resolution::Dpi203);
    }
}
