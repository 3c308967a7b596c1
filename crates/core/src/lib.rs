//! tagforge core library.
//!
//! Turns a [`LabelConfig`] plus one asset record into a ZPL label program:
//! [`LabelConfig`] describes the sticker geometry and content selection,
//! [`LabelGenerator`] emits the program, and [`check`] verifies structural
//! well-formedness of emitted (or third-party) programs. The core performs
//! no I/O; callers own file and transport concerns.

#![warn(missing_docs)]

/// Label geometry, content selection, and printer-aware validation.
pub mod config;
/// Asset records consumed read-only by the generator.
pub mod record;
/// The instruction builder and label program generator.
pub mod generate;
/// Structural checks and print-extent estimation for emitted programs.
pub mod check;

// ── Convenience re-exports ──────────────────────────────────────────────
// Flat imports for the common entry points; full module paths remain
// available for the rest.

pub use config::{
    Compatibility, ConfigIssue, ConfigOverrides, ContentArea, FieldKind, FontRole, FontSizes,
    LabelConfig, PhysicalDimensions, QrPosition, UnknownPrinter,
};
pub use record::{AssetRecord, Condition};

pub use generate::{GenerateError, Instruction, LabelGenerator, ProgramBuilder};

pub use check::{PrintExtent, StructureIssue, StructureReport, estimate_extent, validate_structure};
