//! Post-generation checks on emitted ZPL programs.
//!
//! [`validate_structure`] verifies coarse well-formedness (balanced
//! `^XA`/`^XZ` pairs, closed field data); [`estimate_extent`] approximates
//! the physical print area by scanning geometry commands. Both operate on
//! plain text and accept programs from any source, not only this crate's
//! generator.

use serde::Serialize;
use thiserror::Error;

use tagforge_profile::{Resolution, dots_to_mm};

/// Horizontal padding added after each `^FO` position to approximate the
/// footprint of the content that follows it, in dots.
const POSITION_PAD_X: u32 = 100;
/// Vertical padding added after each `^FO` position, in dots.
const POSITION_PAD_Y: u32 = 30;

// ── Structural validation ───────────────────────────────────────────────

/// One structural defect found in a program.
///
/// These are coarse, non-positional checks — a balance count, not a
/// parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureIssue {
    /// The program text is empty.
    #[error("program is empty")]
    Empty,
    /// No `^XA` start-of-format command anywhere.
    #[error("missing start-of-format command ^XA")]
    MissingStart,
    /// No `^XZ` end-of-format command anywhere.
    #[error("missing end-of-format command ^XZ")]
    MissingEnd,
    /// Start and end command counts differ (detects unbalanced blocks in
    /// batch output).
    #[error("unbalanced format blocks: {starts} ^XA vs {ends} ^XZ")]
    Unbalanced {
        /// Number of `^XA` commands.
        starts: usize,
        /// Number of `^XZ` commands.
        ends: usize,
    },
    /// `^FD` field data appears but no `^FS` close appears anywhere.
    #[error("field data ^FD without closing ^FS")]
    UnclosedFieldData,
}

/// Result of [`validate_structure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureReport {
    /// `true` when no issues were found.
    pub ok: bool,
    /// Every defect found, in check order.
    pub issues: Vec<StructureIssue>,
}

impl StructureReport {
    /// The issues rendered as display strings, for reports and JSON
    /// envelopes.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

/// Check structural well-formedness of a label program.
///
/// Warnings, not exceptions: callers decide whether to send a flawed
/// program anyway.
pub fn validate_structure(program: &str) -> StructureReport {
    if program.trim().is_empty() {
        return StructureReport {
            ok: false,
            issues: vec![StructureIssue::Empty],
        };
    }

    let mut issues = Vec::new();
    let starts = program.matches("^XA").count();
    let ends = program.matches("^XZ").count();

    if starts == 0 {
        issues.push(StructureIssue::MissingStart);
    }
    if ends == 0 {
        issues.push(StructureIssue::MissingEnd);
    }
    if starts != ends {
        issues.push(StructureIssue::Unbalanced { starts, ends });
    }
    if program.contains("^FD") && !program.contains("^FS") {
        issues.push(StructureIssue::UnclosedFieldData);
    }

    StructureReport {
        ok: issues.is_empty(),
        issues,
    }
}

// ── Print extent estimation ─────────────────────────────────────────────

/// Estimated physical footprint of a program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrintExtent {
    /// Estimated width in dots.
    pub width_dots: u32,
    /// Estimated height in dots.
    pub height_dots: u32,
    /// Estimated width in millimeters, rounded to one decimal.
    pub width_mm: f64,
    /// Estimated height in millimeters, rounded to one decimal.
    pub height_mm: f64,
    /// Estimated width in inches, rounded to two decimals.
    pub width_in: f64,
    /// Estimated height in inches, rounded to two decimals.
    pub height_in: f64,
}

/// Estimate the printed area of a program by scanning its geometry
/// commands.
///
/// Rectangle (`^GB`) width/height arguments contribute directly; each
/// position (`^FO`) contributes its coordinates plus fixed padding for
/// whatever content follows, since the format has no native measure
/// operation. Conservative and approximate by design.
pub fn estimate_extent(program: &str, resolution: Resolution) -> PrintExtent {
    let mut width_dots: u32 = 0;
    let mut height_dots: u32 = 0;

    for (w, h) in scan_pairs(program, "^GB") {
        width_dots = width_dots.max(w);
        height_dots = height_dots.max(h);
    }
    for (x, y) in scan_pairs(program, "^FO") {
        width_dots = width_dots.max(x + POSITION_PAD_X);
        height_dots = height_dots.max(y + POSITION_PAD_Y);
    }

    let dpi = f64::from(resolution.dpi());
    PrintExtent {
        width_dots,
        height_dots,
        width_mm: dots_to_mm(width_dots, resolution),
        height_mm: dots_to_mm(height_dots, resolution),
        width_in: round2(f64::from(width_dots) / dpi),
        height_in: round2(f64::from(height_dots) / dpi),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Every `(first, second)` numeric argument pair following `marker` in the
/// program text. Occurrences with malformed arguments are skipped.
fn scan_pairs<'a>(program: &'a str, marker: &'a str) -> impl Iterator<Item = (u32, u32)> + 'a {
    program.match_indices(marker).filter_map(move |(pos, _)| {
        let rest = &program[pos + marker.len()..];
        let (first, rest) = take_number(rest)?;
        let rest = rest.strip_prefix(',')?;
        let (second, _) = take_number(rest)?;
        Some((first, second))
    })
}

/// Split a leading decimal number off `s`. `None` when `s` does not start
/// with a digit or the number overflows `u32`.
fn take_number(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_fails() {
        let report = validate_structure("");
        assert!(!report.ok);
        assert_eq!(report.issues, vec![StructureIssue::Empty]);

        let report = validate_structure("   \n  ");
        assert_eq!(report.issues, vec![StructureIssue::Empty]);
    }

    #[test]
    fn missing_markers_reported() {
        let report = validate_structure("^FO10,10\n^FDX^FS");
        assert!(!report.ok);
        assert!(report.issues.contains(&StructureIssue::MissingStart));
        assert!(report.issues.contains(&StructureIssue::MissingEnd));
    }

    #[test]
    fn unbalanced_blocks_reported() {
        let report = validate_structure("^XA\n^XA\n^XZ");
        assert!(!report.ok);
        assert!(
            report
                .issues
                .contains(&StructureIssue::Unbalanced { starts: 2, ends: 1 })
        );
    }

    #[test]
    fn unclosed_field_data_reported() {
        let report = validate_structure("^XA\n^FO10,10\n^FDdangling\n^XZ");
        assert!(!report.ok);
        assert!(report.issues.contains(&StructureIssue::UnclosedFieldData));
    }

    #[test]
    fn well_formed_program_passes() {
        let report = validate_structure("^XA\n^LH0,0\n^FO10,10\n^A0N,20,20\n^FDX^FS\n^XZ");
        assert!(report.ok, "unexpected issues: {:?}", report.issues);
        assert!(report.messages().is_empty());
    }

    #[test]
    fn extent_tracks_largest_rectangle() {
        let extent = estimate_extent("^XA\n^FO0,0\n^GB600,400,2^FS\n^XZ", Resolution::Dpi203);
        assert_eq!(extent.width_dots, 600);
        assert_eq!(extent.height_dots, 400);
        assert_eq!(extent.width_mm, 75.1);
        assert_eq!(extent.width_in, 2.96);
    }

    #[test]
    fn extent_pads_positions() {
        let extent = estimate_extent("^XA\n^FO500,300\n^A0N,20,20\n^FDX^FS\n^XZ", Resolution::Dpi203);
        assert_eq!(extent.width_dots, 600);
        assert_eq!(extent.height_dots, 330);
    }

    #[test]
    fn extent_skips_malformed_arguments() {
        let extent = estimate_extent("^XA\n^FOx,y\n^GB100,50,1^FS\n^XZ", Resolution::Dpi203);
        assert_eq!(extent.width_dots, 100);
        assert_eq!(extent.height_dots, 50);
    }

    #[test]
    fn extent_of_empty_program_is_zero() {
        let extent = estimate_extent("", Resolution::Dpi300);
        assert_eq!(extent.width_dots, 0);
        assert_eq!(extent.height_mm, 0.0);
    }
}
