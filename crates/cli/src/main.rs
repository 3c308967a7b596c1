//! tagforge — generate and check ZPL label programs for patrimonial
//! assets.
//!
//! `generate` turns a JSON record export into a batch of label programs,
//! `check` structure-checks an existing program file and estimates its
//! printed extent, and `profiles` lists the printer catalog. The binary
//! owns all file I/O; the core crates stay pure.

use std::fs;
use std::io::{self, IsTerminal};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tagforge_core::check::{estimate_extent, validate_structure};
use tagforge_core::config::{ConfigOverrides, FieldKind, LabelConfig, QrPosition};
use tagforge_core::generate::LabelGenerator;
use tagforge_core::record::AssetRecord;
use tagforge_profile::{PRINTERS, Resolution, preset_named, profile_for, recommended_sizes_for};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "tagforge",
    version,
    about = "tagforge — generate, check, and describe ZPL asset label programs"
)]
struct Cli {
    /// Output mode: "pretty" for terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a batch of label programs from a JSON record file.
    Generate {
        /// Path to a JSON array of asset records.
        #[arg(long)]
        records: String,
        /// Build the configuration for this printer model (geometry and
        /// preset come from the catalog).
        #[arg(long, conflicts_with_all = ["size", "width", "height"])]
        printer: Option<String>,
        /// Named size preset (see `profiles`). Defaults to "medium".
        #[arg(long)]
        size: Option<String>,
        /// Label width in dots (overrides the preset).
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Label height in dots (overrides the preset).
        #[arg(long, requires = "width")]
        height: Option<u32>,
        /// Print resolution in dpi.
        #[arg(long, default_value = "203")]
        dpi: Resolution,
        /// Skip the QR block.
        #[arg(long)]
        no_qr: bool,
        /// QR placement relative to the text area.
        #[arg(long, value_enum)]
        qr_position: Option<QrPositionArg>,
        /// Skip the border rectangles.
        #[arg(long)]
        no_border: bool,
        /// Skip the date stamp.
        #[arg(long)]
        no_date: bool,
        /// Skip the separator rule.
        #[arg(long)]
        no_separator: bool,
        /// Fields to render, in order.
        #[arg(long, value_enum, value_delimiter = ',')]
        fields: Option<Vec<FieldArg>>,
        /// Write the batch to this file instead of stdout.
        #[arg(long)]
        out: Option<String>,
    },

    /// Structure-check a label program file and estimate its print area.
    Check {
        /// Path to a ZPL program file.
        file: String,
        /// Print resolution used for the physical-unit estimate.
        #[arg(long, default_value = "203")]
        dpi: Resolution,
    },

    /// List the printer catalog and its recommended label sizes.
    Profiles {
        /// Show a single model instead of the whole catalog.
        #[arg(long)]
        model: Option<String>,
    },
}

/// QR placement flag.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum QrPositionArg {
    /// QR on the left edge.
    Left,
    /// QR on the right edge.
    Right,
    /// QR along the top.
    Top,
    /// QR along the bottom.
    Bottom,
}

impl From<QrPositionArg> for QrPosition {
    fn from(arg: QrPositionArg) -> Self {
        match arg {
            QrPositionArg::Left => QrPosition::Left,
            QrPositionArg::Right => QrPosition::Right,
            QrPositionArg::Top => QrPosition::Top,
            QrPositionArg::Bottom => QrPosition::Bottom,
        }
    }
}

/// Renderable field flag.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FieldArg {
    /// The patrimonial asset code.
    AssetCode,
    /// Catalog description.
    Description,
    /// Office code and name.
    Office,
    /// Conservation state.
    Condition,
    /// Brand and model.
    BrandModel,
    /// Serial number.
    Serial,
    /// Vehicle plate.
    Plate,
}

impl From<FieldArg> for FieldKind {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::AssetCode => FieldKind::AssetCode,
            FieldArg::Description => FieldKind::Description,
            FieldArg::Office => FieldKind::Office,
            FieldArg::Condition => FieldKind::Condition,
            FieldArg::BrandModel => FieldKind::BrandModel,
            FieldArg::Serial => FieldKind::Serial,
            FieldArg::Plate => FieldKind::Plate,
        }
    }
}

/// Output format, resolved from the `--output` flag or the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Pretty,
    Json,
}

impl Format {
    fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Generate {
            records,
            printer,
            size,
            width,
            height,
            dpi,
            no_qr,
            qr_position,
            no_border,
            no_date,
            no_separator,
            fields,
            out,
        } => {
            let config = build_config(
                printer.as_deref(),
                size.as_deref(),
                width.zip(height),
                dpi,
                no_qr,
                qr_position,
                no_border,
                no_date,
                no_separator,
                fields,
            )?;
            cmd_generate(&records, config, out.as_deref(), format)?;
        }
        Cmd::Check { file, dpi } => cmd_check(&file, dpi, format)?,
        Cmd::Profiles { model } => cmd_profiles(model.as_deref(), format)?,
    }

    Ok(())
}

// ── Configuration assembly ──────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn build_config(
    printer: Option<&str>,
    size: Option<&str>,
    dimensions: Option<(u32, u32)>,
    dpi: Resolution,
    no_qr: bool,
    qr_position: Option<QrPositionArg>,
    no_border: bool,
    no_date: bool,
    no_separator: bool,
    fields: Option<Vec<FieldArg>>,
) -> Result<LabelConfig> {
    let fields: Option<Vec<FieldKind>> =
        fields.map(|list| list.into_iter().map(FieldKind::from).collect());

    if let Some(model) = printer {
        let overrides = ConfigOverrides {
            include_qr: no_qr.then_some(false),
            qr_position: qr_position.map(QrPosition::from),
            include_border: no_border.then_some(false),
            include_date: no_date.then_some(false),
            include_separator: no_separator.then_some(false),
            fields,
            ..ConfigOverrides::default()
        };
        return LabelConfig::for_printer(model, None, overrides)
            .with_context(|| format!("cannot build a configuration for printer {model}"));
    }

    let mut config = LabelConfig::default();
    if let Some(name) = size {
        let preset = preset_named(name)
            .with_context(|| format!("unknown size preset: {name} (see `tagforge profiles`)"))?;
        config.width = preset.width_dots;
        config.height = preset.height_dots;
    }
    if let Some((width, height)) = dimensions {
        config.width = width;
        config.height = height;
    }
    config.resolution = dpi;
    if no_qr {
        config.include_qr = false;
    }
    if let Some(position) = qr_position {
        config.qr_position = position.into();
    }
    if no_border {
        config.include_border = false;
    }
    if no_date {
        config.include_date = false;
    }
    if no_separator {
        config.include_separator = false;
    }
    if let Some(fields) = fields {
        config.fields = fields;
    }
    Ok(config)
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_generate(
    records_path: &str,
    config: LabelConfig,
    out: Option<&str>,
    format: Format,
) -> Result<()> {
    let issues = config.validate();
    if !issues.is_empty() {
        match format {
            Format::Json => {
                let envelope = serde_json::json!({
                    "ok": false,
                    "issues": issues.iter().map(ToString::to_string).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            }
            Format::Pretty => {
                for issue in &issues {
                    eprintln!("error: {issue}");
                }
            }
        }
        process::exit(1);
    }

    let input = fs::read_to_string(records_path)
        .with_context(|| format!("cannot read records file {records_path}"))?;
    let records: Vec<AssetRecord> = serde_json::from_str(&input)
        .with_context(|| format!("cannot parse records file {records_path}"))?;

    let generator = LabelGenerator::new(config);
    let batch = generator
        .generate_batch(&records)
        .context("label generation failed")?;

    // Guard our own output before it reaches a printer queue.
    let report = validate_structure(&batch);
    if !report.ok && !records.is_empty() {
        for issue in &report.issues {
            eprintln!("warning: generated program: {issue}");
        }
    }

    if let Some(path) = out {
        fs::write(path, &batch).with_context(|| format!("cannot write {path}"))?;
    }

    // The program text goes to the file or the envelope, never both.
    let inline_program = out.is_none().then_some(batch.as_str());

    match format {
        Format::Json => {
            let envelope = serde_json::json!({
                "ok": true,
                "labels": records.len(),
                "out": out,
                "program": inline_program,
            });
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Pretty => {
            if let Some(path) = out {
                eprintln!("{} label(s) written to {path}", records.len());
            } else {
                println!("{batch}");
            }
        }
    }

    Ok(())
}

fn cmd_check(file: &str, dpi: Resolution, format: Format) -> Result<()> {
    let program =
        fs::read_to_string(file).with_context(|| format!("cannot read program file {file}"))?;

    let report = validate_structure(&program);
    let extent = estimate_extent(&program, dpi);

    match format {
        Format::Json => {
            let envelope = serde_json::json!({
                "ok": report.ok,
                "issues": report.messages(),
                "extent": extent,
            });
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Pretty => {
            for issue in &report.issues {
                eprintln!("error: {issue}");
            }
            println!(
                "labels: {}  estimated area: {}x{} dots ({}x{} mm at {dpi} dpi)",
                program.matches("^XA").count(),
                extent.width_dots,
                extent.height_dots,
                extent.width_mm,
                extent.height_mm,
            );
            if report.ok {
                eprintln!("structure ok");
            }
        }
    }

    if !report.ok {
        process::exit(1);
    }
    Ok(())
}

fn cmd_profiles(model: Option<&str>, format: Format) -> Result<()> {
    let profiles: Vec<_> = match model {
        Some(m) => {
            let profile = profile_for(m)
                .with_context(|| format!("printer {m} not recognized"))?;
            vec![profile]
        }
        None => PRINTERS.iter().collect(),
    };

    match format {
        Format::Json => {
            let listing: Vec<_> = profiles
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "profile": p,
                        "recommended_sizes": recommended_sizes_for(p.model),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Format::Pretty => {
            for profile in profiles {
                println!("{}: {}", profile.model, profile.description);
                for res in Resolution::ALL {
                    if let Some(max) = profile.max_width_dots(res) {
                        println!("  max width at {res} dpi: {max} dots");
                    }
                }
                for preset in recommended_sizes_for(profile.model) {
                    println!(
                        "  {} - {} ({}x{} dots)",
                        preset.name, preset.description, preset.width_dots, preset.height_dots
                    );
                }
            }
        }
    }

    Ok(())
}
