//! ZPL program generation.
//!
//! [`LabelGenerator`] walks a validated [`LabelConfig`] and one
//! [`AssetRecord`] and emits an ordered sequence of [`Instruction`]s — page
//! setup, optional border, QR block, positioned text fields, optional date
//! stamp and separator, page close — serialized one command per line.
//! Generation is deterministic (aside from reading the current date for the
//! optional stamp) and performs no I/O.

use std::borrow::Cow;
use std::fmt;

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::config::{ConfigIssue, FieldKind, FontRole, LabelConfig, QrPosition};
use crate::record::AssetRecord;

// ── Layout constants ────────────────────────────────────────────────────

/// Vertical gap after a title-role line, in dots.
const TITLE_GAP: u32 = 5;
/// Vertical gap after a body-role line, in dots.
const BODY_GAP: u32 = 3;
/// Vertical gap after a small-role line, in dots.
const SMALL_GAP: u32 = 2;
/// Horizontal space reserved for the date stamp, in dots.
const DATE_WIDTH: u32 = 80;
/// Distance of the separator rule from the bottom edge, in dots.
const SEPARATOR_OFFSET: u32 = 40;
/// Print speed passed to `^PR`, in inches per second.
const PRINT_SPEED: u32 = 4;

// ── Instructions ────────────────────────────────────────────────────────

/// One emitted ZPL command.
///
/// Serialization via `Display` yields exactly one program line per
/// instruction, so generator behavior is testable at the instruction level
/// before any text is joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `^XA` — start of format.
    StartFormat,
    /// `^LH` — label home (origin reset).
    LabelHome {
        /// Origin x in dots.
        x: u32,
        /// Origin y in dots.
        y: u32,
    },
    /// `^PR` — print rate.
    PrintRate {
        /// Speed in inches per second.
        speed: u32,
    },
    /// `^FO` — field origin for the next content command.
    FieldOrigin {
        /// Left edge in dots.
        x: u32,
        /// Top edge in dots.
        y: u32,
    },
    /// `^GB…^FS` — filled rectangle (borders, rules).
    GraphicBox {
        /// Box width in dots.
        width: u32,
        /// Box height in dots.
        height: u32,
        /// Line thickness in dots.
        thickness: u32,
    },
    /// `^BQ` — QR barcode setup, model 2.
    QrSetup {
        /// Magnification factor (1–10).
        magnification: u32,
    },
    /// `^A0N` — scalable font selection for the next field.
    Font {
        /// Character height (and width) in dots.
        height: u32,
    },
    /// `^FD…^FS` — one text field.
    FieldData {
        /// The rendered text.
        text: String,
    },
    /// `^FDQA,…^FS` — QR field data with automatic error correction.
    QrData {
        /// The opaque QR payload.
        payload: String,
    },
    /// `^XZ` — end of format.
    EndFormat,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::StartFormat => write!(f, "^XA"),
            Instruction::LabelHome { x, y } => write!(f, "^LH{x},{y}"),
            Instruction::PrintRate { speed } => write!(f, "^PR{speed}"),
            Instruction::FieldOrigin { x, y } => write!(f, "^FO{x},{y}"),
            Instruction::GraphicBox {
                width,
                height,
                thickness,
            } => write!(f, "^GB{width},{height},{thickness}^FS"),
            Instruction::QrSetup { magnification } => write!(f, "^BQN,2,{magnification}"),
            Instruction::Font { height } => write!(f, "^A0N,{height},{height}"),
            Instruction::FieldData { text } => write!(f, "^FD{text}^FS"),
            Instruction::QrData { payload } => write!(f, "^FDQA,{payload}^FS"),
            Instruction::EndFormat => write!(f, "^XZ"),
        }
    }
}

/// Accumulates [`Instruction`]s for one label program.
///
/// Builders are cheap and single-use: one per `generate` call, so batch
/// generation shares no mutable state between records.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one instruction.
    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    /// Position the next content command.
    pub fn field_origin(&mut self, x: u32, y: u32) -> &mut Self {
        self.push(Instruction::FieldOrigin { x, y })
    }

    /// Draw a filled rectangle at the current origin.
    pub fn graphic_box(&mut self, width: u32, height: u32, thickness: u32) -> &mut Self {
        self.push(Instruction::GraphicBox {
            width,
            height,
            thickness,
        })
    }

    /// Select the scalable font at the given height for the next field.
    pub fn font(&mut self, height: u32) -> &mut Self {
        self.push(Instruction::Font { height })
    }

    /// Emit one text field.
    pub fn field_data(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Instruction::FieldData { text: text.into() })
    }

    /// The instructions accumulated so far.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Serialize to program text, one instruction per line.
    pub fn finish(self) -> String {
        let lines: Vec<String> = self.instructions.iter().map(ToString::to_string).collect();
        lines.join("\n")
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Generation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The configuration failed validation; generation fails closed
    /// rather than clamping or guessing.
    #[error("invalid label configuration: {}", join_issues(.issues))]
    InvalidConfig {
        /// Every violation `validate()` reported.
        issues: Vec<ConfigIssue>,
    },
}

// ── Generator ───────────────────────────────────────────────────────────

/// Translates (configuration, record) pairs into ZPL label programs.
///
/// Holds only the configuration; each `generate` call builds its own
/// instruction buffer, so one generator may serve many records
/// sequentially and separate generators may run concurrently.
#[derive(Debug, Clone)]
pub struct LabelGenerator {
    config: LabelConfig,
}

impl LabelGenerator {
    /// Create a generator for the given configuration.
    ///
    /// The configuration is checked at `generate` time, not here, so an
    /// invalid one can still be constructed, inspected, and reported on.
    pub fn new(config: LabelConfig) -> Self {
        Self { config }
    }

    /// The configuration this generator renders with.
    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Generate the label program for one record, stamped with today's
    /// date when the configuration includes a date.
    pub fn generate(&self, record: &AssetRecord) -> Result<String, GenerateError> {
        self.generate_on(record, Local::now().date_naive())
    }

    /// Generate the label program for one record with an explicit stamp
    /// date. Deterministic; the entry point tests use.
    pub fn generate_on(
        &self,
        record: &AssetRecord,
        date: NaiveDate,
    ) -> Result<String, GenerateError> {
        let issues = self.config.validate();
        if !issues.is_empty() {
            return Err(GenerateError::InvalidConfig { issues });
        }

        let config = &self.config;
        let mut program = ProgramBuilder::new();

        program.push(Instruction::StartFormat);
        program.push(Instruction::LabelHome { x: 0, y: 0 });
        program.push(Instruction::PrintRate { speed: PRINT_SPEED });

        if config.include_border {
            self.emit_border(&mut program);
        }

        if config.include_qr
            && let Some(payload) = record.qr_payload()
        {
            self.emit_qr(&mut program, payload);
        }

        self.emit_fields(&mut program, record);

        if config.include_date {
            self.emit_date(&mut program, date);
        }

        if config.include_separator {
            self.emit_separator(&mut program);
        }

        program.push(Instruction::EndFormat);
        Ok(program.finish())
    }

    /// Generate one full program per record, in order, separated by a
    /// blank line.
    ///
    /// Purely sequential; the first failing record aborts the batch.
    /// Callers needing partial-success semantics iterate and call
    /// [`generate`](Self::generate) per record instead.
    pub fn generate_batch(&self, records: &[AssetRecord]) -> Result<String, GenerateError> {
        self.generate_batch_on(records, Local::now().date_naive())
    }

    /// Batch generation with an explicit stamp date.
    pub fn generate_batch_on(
        &self,
        records: &[AssetRecord],
        date: NaiveDate,
    ) -> Result<String, GenerateError> {
        let programs: Vec<String> = records
            .iter()
            .map(|record| self.generate_on(record, date))
            .collect::<Result<_, _>>()?;
        Ok(programs.join("\n\n"))
    }

    /// Four fixed-thickness rectangles tracing the label edges.
    fn emit_border(&self, program: &mut ProgramBuilder) {
        let config = &self.config;
        let t = config.border_thickness;

        // Top, bottom, left, right.
        program.field_origin(0, 0);
        program.graphic_box(config.width, t, t);
        program.field_origin(0, config.height.saturating_sub(t));
        program.graphic_box(config.width, t, t);
        program.field_origin(0, 0);
        program.graphic_box(t, config.height, t);
        program.field_origin(config.width.saturating_sub(t), 0);
        program.graphic_box(t, config.height, t);
    }

    /// The QR block at the configured position.
    fn emit_qr(&self, program: &mut ProgramBuilder, payload: &str) {
        let config = &self.config;
        let (x, y) = match config.qr_position {
            QrPosition::Left | QrPosition::Top => (config.margin, config.margin),
            QrPosition::Right => (
                config.width.saturating_sub(config.margin + config.qr_size),
                config.margin,
            ),
            QrPosition::Bottom => (
                config.margin,
                config.height.saturating_sub(config.margin + config.qr_size),
            ),
        };

        program.field_origin(x, y);
        program.push(Instruction::QrSetup {
            magnification: qr_magnification(config.qr_size),
        });
        program.push(Instruction::QrData {
            payload: payload.to_string(),
        });
    }

    /// The configured text fields, in declared order, skipping fields
    /// whose data is absent. Each field occupies one vertical slot sized
    /// by its font role.
    fn emit_fields(&self, program: &mut ProgramBuilder, record: &AssetRecord) {
        let config = &self.config;
        let area = config.content_area();
        let x = area.x;
        let mut y = area.y;

        for &field in &config.fields {
            let font = config.fonts.for_role(field.role());
            let text: Option<String> = match field {
                FieldKind::AssetCode => {
                    if record.code.is_empty() {
                        None
                    } else {
                        Some(record.code.clone())
                    }
                }
                FieldKind::Description => record
                    .description
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .map(|d| truncate_to_width(d, area.width, font).into_owned()),
                FieldKind::Office => record
                    .office_line()
                    .map(|line| format!("Office: {}", truncate_to_width(&line, area.width, font))),
                FieldKind::Condition => record
                    .condition
                    .map(|c| format!("Condition: {}", c.label())),
                FieldKind::BrandModel => record
                    .brand_model_line()
                    .map(|line| truncate_to_width(&line, area.width, font).into_owned()),
                FieldKind::Serial => record
                    .serial
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .map(|s| truncate_to_width(&format!("S/N: {s}"), area.width, font).into_owned()),
                FieldKind::Plate => record
                    .plate
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .map(|p| format!("Plate: {p}")),
            };

            let Some(text) = text else {
                continue;
            };

            program.field_origin(x, y);
            program.font(font);
            program.field_data(text);
            y += font + line_gap(field.role());
        }
    }

    /// The date stamp, anchored bottom-right independent of the field
    /// cursor.
    fn emit_date(&self, program: &mut ProgramBuilder, date: NaiveDate) {
        let config = &self.config;
        let x = config.width.saturating_sub(config.margin + DATE_WIDTH);
        let y = config
            .height
            .saturating_sub(config.margin + config.fonts.small);

        program.field_origin(x, y);
        program.font(config.fonts.small);
        program.field_data(date.format("%d/%m/%Y").to_string());
    }

    /// A one-dot horizontal rule near the bottom edge, margin to margin.
    fn emit_separator(&self, program: &mut ProgramBuilder) {
        let config = &self.config;
        let y = config.height.saturating_sub(SEPARATOR_OFFSET);
        program.field_origin(config.margin, y);
        program.graphic_box(config.width.saturating_sub(2 * config.margin), 1, 1);
    }
}

/// Cursor advance after a line of the given role.
fn line_gap(role: FontRole) -> u32 {
    match role {
        FontRole::Title => TITLE_GAP,
        FontRole::Body => BODY_GAP,
        FontRole::Small => SMALL_GAP,
    }
}

/// QR magnification for a requested edge length: one level per 50 dots,
/// floored at the minimum reliably scannable factor.
pub fn qr_magnification(qr_size: u32) -> u32 {
    (qr_size / 50).max(2)
}

/// Truncate `text` to the estimated character budget of `available_width`
/// at `font_height`, appending `...` when it does not fit.
///
/// The budget is `available_width * 0.6 / font_height` — a deliberate
/// approximation of proportional-font metrics carried over from the
/// printed-label fleet; exact glyph accounting would change observable
/// output on existing labels. Truncating an already-truncated string is a
/// no-op.
pub fn truncate_to_width(text: &str, available_width: u32, font_height: u32) -> Cow<'_, str> {
    if font_height == 0 {
        return Cow::Borrowed(text);
    }
    let budget = (f64::from(available_width) * 0.6 / f64::from(font_height)) as usize;
    if text.chars().count() <= budget {
        return Cow::Borrowed(text);
    }
    let kept: String = text.chars().take(budget.saturating_sub(3)).collect();
    Cow::Owned(format!("{kept}..."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_lines() {
        assert_eq!(Instruction::StartFormat.to_string(), "^XA");
        assert_eq!(Instruction::LabelHome { x: 0, y: 0 }.to_string(), "^LH0,0");
        assert_eq!(
            Instruction::GraphicBox {
                width: 600,
                height: 2,
                thickness: 2
            }
            .to_string(),
            "^GB600,2,2^FS"
        );
        assert_eq!(
            Instruction::QrSetup { magnification: 2 }.to_string(),
            "^BQN,2,2"
        );
        assert_eq!(Instruction::Font { height: 30 }.to_string(), "^A0N,30,30");
        assert_eq!(
            Instruction::QrData {
                payload: "abc123".into()
            }
            .to_string(),
            "^FDQA,abc123^FS"
        );
        assert_eq!(Instruction::EndFormat.to_string(), "^XZ");
    }

    #[test]
    fn builder_joins_one_instruction_per_line() {
        let mut builder = ProgramBuilder::new();
        builder.push(Instruction::StartFormat);
        builder.field_origin(10, 20);
        builder.push(Instruction::EndFormat);
        assert_eq!(builder.finish(), "^XA\n^FO10,20\n^XZ");
    }

    #[test]
    fn qr_magnification_floors_at_two() {
        assert_eq!(qr_magnification(0), 2);
        assert_eq!(qr_magnification(80), 2);
        assert_eq!(qr_magnification(100), 2);
        assert_eq!(qr_magnification(150), 3);
        assert_eq!(qr_magnification(500), 10);
    }

    #[test]
    fn truncation_keeps_short_text_borrowed() {
        // Budget: 300 * 0.6 / 20 = 9 chars.
        let out = truncate_to_width("SHORT", 300, 20);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, "SHORT");
    }

    #[test]
    fn truncation_appends_ellipsis() {
        let out = truncate_to_width("A VERY LONG DESCRIPTION", 300, 20);
        assert_eq!(out, "A VERY...");
        assert_eq!(out.chars().count(), 9);
    }

    #[test]
    fn truncation_is_idempotent() {
        let once = truncate_to_width("A VERY LONG DESCRIPTION", 300, 20).into_owned();
        let twice = truncate_to_width(&once, 300, 20);
        assert_eq!(once, twice);
    }

    #[test]
    fn truncation_handles_multibyte_text() {
        // 9-char budget over a string of 3-byte chars must not split a
        // code point.
        let out = truncate_to_width("ÑÑÑÑÑÑÑÑÑÑÑÑ", 300, 20);
        assert_eq!(out, "ÑÑÑÑÑÑ...");
    }

    #[test]
    fn tiny_budget_collapses_to_ellipsis() {
        let out = truncate_to_width("ANYTHING", 50, 20);
        assert_eq!(out, "...");
        let again = truncate_to_width(&out, 50, 20);
        assert_eq!(again, "...");
    }
}
