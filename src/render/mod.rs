//! # Rendering Module
//!
//! Turns records into finished artifact images.
//!
//! ## Modules
//!
//! - [`font`]: TTF measurement and glyph rasterization
//! - [`style`]: Aligned text with simulated bold and italic
//! - [`transform`]: Affine resampling used for the italic shear
//! - [`record`]: One record + layout → one artifact
//!
//! ## Usage Example
//!
//! ```
//! use certmerge::layout::LayoutDocument;
//! use certmerge::render::{CanvasTemplate, FontHandle, RecordRenderer};
//! use certmerge::table::Table;
//!
//! let table = Table::from_json_str(r#"[{"Name": "Alice"}]"#, "Name").unwrap();
//! let doc: LayoutDocument = serde_json::from_str(r#"{"fields": [{"field": "Name", "size": 40}]}"#).unwrap();
//!
//! let template = CanvasTemplate::transparent(400, 200);
//! let layout = doc.resolve(400, 200);
//! let font = FontHandle::fallback(40.0);
//!
//! let renderer = RecordRenderer::new(&template, &layout, &font);
//! let artifact = renderer.render("Alice", &table.records()[0]).unwrap();
//! assert_eq!((artifact.width(), artifact.height()), (400, 200));
//! ```

pub mod font;
pub mod record;
pub mod style;
pub mod transform;

pub use font::{FontHandle, TextMetrics};
pub use record::{CanvasTemplate, RecordRenderer, RenderedArtifact};
pub use style::{Fragment, Styled, TextStyle, draw_styled, render_styled};
