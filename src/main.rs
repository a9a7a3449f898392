//! # Certmerge CLI
//!
//! Command-line interface for batch certificate rendering.
//!
//! ## Usage
//!
//! ```bash
//! # One PNG per record
//! certmerge render --background cert.png --records people.json \
//!     --layout layout.json --id-field Name --out out/
//!
//! # Only some people, text only, 9x6cm, packed onto A4 sheets
//! certmerge render --background cert.png --records people.json \
//!     --layout layout.json --id-field Name --out out/ \
//!     --select Alice --select Bob --transparent \
//!     --width 9cm --height 6cm --paged --page a4 --margin 1cm --gap 5mm
//!
//! # Preview the first record at half size
//! certmerge preview --background cert.png --records people.json \
//!     --layout layout.json --id-field Name --scale 50 --png preview.png
//! ```

use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use certmerge::{
    CertmergeError,
    batch::{self, Batch, BatchConfig, FailurePolicy, OutputLayout, OutputMode, SheetSettings},
    layout::{DEFAULT_FONT_SIZE, FieldLayout, LayoutDocument},
    render::{CanvasTemplate, FontHandle},
    sink::{DirectorySink, encode_png},
    table::Table,
    units::{DEFAULT_DPI, Length, PageSize},
};

/// Certmerge - batch certificate renderer
#[derive(Parser, Debug)]
#[command(name = "certmerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by every subcommand.
#[derive(Args, Debug)]
struct Inputs {
    /// Background image (PNG or JPEG)
    #[arg(long, value_name = "FILE")]
    background: PathBuf,

    /// Records as a JSON array of objects
    #[arg(long, value_name = "FILE")]
    records: PathBuf,

    /// Field layout document (JSON)
    #[arg(long, value_name = "FILE")]
    layout: PathBuf,

    /// Field that identifies a record (used for selection and file names)
    #[arg(long)]
    id_field: String,

    /// Only render these identifiers (repeatable; default: all records)
    #[arg(long = "select", value_name = "ID")]
    selection: Vec<String>,

    /// TTF/OTF font to render with (default: embedded DejaVu Sans)
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every selected record
    Render {
        #[command(flatten)]
        inputs: Inputs,

        /// Output directory
        #[arg(long, default_value = "certificates")]
        out: PathBuf,

        /// Render text only, on a transparent canvas
        #[arg(long)]
        transparent: bool,

        /// Pack artifacts onto print pages instead of one file each
        #[arg(long)]
        paged: bool,

        /// Artifact width, e.g. 9cm (default: background width in pixels)
        #[arg(long, requires = "height")]
        width: Option<Length>,

        /// Artifact height, e.g. 6cm
        #[arg(long, requires = "width")]
        height: Option<Length>,

        /// Output resolution
        #[arg(long, default_value_t = DEFAULT_DPI)]
        dpi: u32,

        /// Page size: a4, a5, letter, or WIDTHxHEIGHT<unit>
        #[arg(long, default_value = "a4")]
        page: String,

        /// Page margin
        #[arg(long, default_value = "1cm")]
        margin: Length,

        /// Gap between artifacts on a page
        #[arg(long, default_value = "5mm")]
        gap: Length,

        /// Stop at the first record that fails instead of skipping it
        #[arg(long)]
        strict: bool,

        /// File name prefix for individual outputs
        #[arg(long, default_value = "certificate")]
        prefix: String,

        /// Render records one at a time
        #[arg(long)]
        sequential: bool,
    },
    /// Render the first selected record as a scaled preview
    Preview {
        #[command(flatten)]
        inputs: Inputs,

        /// Display scale in percent (20-200)
        #[arg(long, default_value = "100")]
        scale: u32,

        /// Render text only, on a transparent canvas
        #[arg(long)]
        transparent: bool,

        /// Where to write the preview
        #[arg(long, value_name = "FILE", default_value = "preview.png")]
        png: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Everything a subcommand needs, loaded from disk.
struct Loaded {
    background: image::DynamicImage,
    table: Table,
    layout: Vec<FieldLayout>,
    font: FontHandle,
}

fn load(inputs: &Inputs) -> Result<Loaded, CertmergeError> {
    let background = image::open(&inputs.background).map_err(|e| {
        CertmergeError::Image(format!(
            "Failed to open {}: {}",
            inputs.background.display(),
            e
        ))
    })?;

    let table = Table::from_json_str(&read_text(&inputs.records)?, inputs.id_field.clone())?;

    let doc: LayoutDocument = serde_json::from_str(&read_text(&inputs.layout)?)?;
    if doc.enabled_fields().is_empty() {
        return Err(CertmergeError::Layout(format!(
            "{} selects no fields to draw",
            inputs.layout.display()
        )));
    }
    let layout = doc.resolve(background.width(), background.height());

    let font = resolve_font(inputs.font.as_deref());

    Ok(Loaded {
        background,
        table,
        layout,
        font,
    })
}

/// Size the font is loaded at; each field renders at its own size.
const BASE_FONT_SIZE: f32 = DEFAULT_FONT_SIZE as f32;

/// Load the requested font, falling back to the embedded one if it is
/// missing or unreadable.
fn resolve_font(path: Option<&Path>) -> FontHandle {
    let Some(path) = path else {
        return FontHandle::fallback(BASE_FONT_SIZE);
    };
    let loaded = std::fs::read(path)
        .map_err(CertmergeError::from)
        .and_then(|bytes| FontHandle::from_bytes(bytes, BASE_FONT_SIZE));
    match loaded {
        Ok(font) => font,
        Err(e) => {
            warn!(
                "Failed to load font {}: {}, using embedded DejaVu Sans",
                path.display(),
                e
            );
            FontHandle::fallback(BASE_FONT_SIZE)
        }
    }
}

fn read_text(path: &Path) -> Result<String, CertmergeError> {
    std::fs::read_to_string(path).map_err(|e| {
        CertmergeError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

fn run() -> Result<(), CertmergeError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            inputs,
            out,
            transparent,
            paged,
            width,
            height,
            dpi,
            page,
            margin,
            gap,
            strict,
            prefix,
            sequential,
        } => {
            let loaded = load(&inputs)?;

            let output_layout = if paged {
                OutputLayout::Paged(SheetSettings {
                    page: PageSize::parse(&page)?,
                    margin,
                    gap,
                })
            } else {
                OutputLayout::Individual
            };

            let config = BatchConfig {
                output_mode: if transparent {
                    OutputMode::Transparent
                } else {
                    OutputMode::Composited
                },
                output_layout,
                artifact_size: width.zip(height),
                dpi,
                failure_policy: if strict {
                    FailurePolicy::Abort
                } else {
                    FailurePolicy::SkipAndContinue
                },
                name_prefix: prefix,
                parallel: !sequential,
            };

            let mut sink = DirectorySink::create(&out)?;
            let report = Batch::new(
                &loaded.background,
                &loaded.table,
                &loaded.layout,
                &loaded.font,
                &config,
            )
            .select(inputs.selection)
            .on_progress(|p| info!("{}/{}", p.processed, p.total))
            .run(&mut sink)?;

            println!("{}", report.summary());
            for skipped in &report.skipped {
                println!("  skipped {}: {}", skipped.id, skipped.reason);
            }
            for failed in &report.failed_outputs {
                println!("  not written {}: {}", failed.id, failed.reason);
            }
            if report.pages > 0 {
                println!("{} page(s)", report.pages);
            }
            println!("Saved {} file(s) to {}", report.emitted.len(), out.display());
        }
        Commands::Preview {
            inputs,
            scale,
            transparent,
            png,
        } => {
            let loaded = load(&inputs)?;
            let template = if transparent {
                CanvasTemplate::transparent(loaded.background.width(), loaded.background.height())
            } else {
                CanvasTemplate::composited(&loaded.background)
            };

            let image = batch::preview(
                &template,
                &loaded.table,
                &inputs.selection,
                &loaded.layout,
                &loaded.font,
                scale,
            )?
            .ok_or_else(|| CertmergeError::Layout("No records to preview".to_string()))?;

            std::fs::write(&png, encode_png(&image)?)?;
            println!("Saved preview to {}", png.display());
        }
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
