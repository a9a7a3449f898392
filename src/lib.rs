//! # Certmerge - Mail-Merge Certificate Renderer
//!
//! Certmerge batch-renders personalised text onto a background image, one
//! artifact per record of a table, and can pack the results onto print pages.
//! It provides:
//!
//! - **Styled text**: aligned text with simulated bold and italic
//! - **Record rendering**: one record + field layout → one artifact
//! - **Sheet packing**: greedy row-by-row placement onto fixed-size pages
//! - **Batch driving**: selection, resizing to print size, skip-and-continue
//!
//! ## Quick Start
//!
//! ```no_run
//! use certmerge::{
//!     batch::{Batch, BatchConfig},
//!     layout::LayoutDocument,
//!     render::FontHandle,
//!     sink::DirectorySink,
//!     table::Table,
//! };
//!
//! let background = image::open("template.png")
//!     .map_err(|e| certmerge::CertmergeError::Image(e.to_string()))?;
//! let table = Table::from_json_str(&std::fs::read_to_string("people.json")?, "Name")?;
//! let doc: LayoutDocument = serde_json::from_str(&std::fs::read_to_string("layout.json")?)?;
//! let layout = doc.resolve(background.width(), background.height());
//! let font = FontHandle::fallback(80.0);
//!
//! let config = BatchConfig::default();
//! let mut sink = DirectorySink::create("out")?;
//! let report = Batch::new(&background, &table, &layout, &font, &config).run(&mut sink)?;
//! println!("{}", report.summary());
//!
//! # Ok::<(), certmerge::CertmergeError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`units`] | Physical length → pixel conversion, page sizes |
//! | [`layout`] | Field layout specs and the layout document |
//! | [`table`] | Records and selection |
//! | [`render`] | Fonts, styled text, record rendering |
//! | [`sheet`] | Print sheet packing |
//! | [`batch`] | Batch orchestration and reporting |
//! | [`sink`] | Output destinations |
//! | [`error`] | Error types |

pub mod batch;
pub mod error;
pub mod layout;
pub mod render;
pub mod sheet;
pub mod sink;
pub mod table;
pub mod units;

// Re-exports for convenience
pub use batch::{Batch, BatchConfig, BatchReport};
pub use error::CertmergeError;
pub use layout::{Align, FieldLayout, LayoutDocument};
pub use render::{CanvasTemplate, FontHandle, RenderedArtifact};
pub use sheet::{SheetConfig, SheetPacker};
pub use table::{Record, Table};
