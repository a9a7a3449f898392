//! # Field Layout
//!
//! Per-field rendering specs and the layout document they are persisted in.
//!
//! The layout document is the opaque configuration blob a front end saves and
//! restores. It is deliberately forgiving: every property except the field
//! name is optional, unknown keys are ignored, and malformed values fall back
//! to defaults instead of failing the batch.
//!
//! ## Example
//!
//! ```
//! use certmerge::layout::{Align, LayoutDocument};
//!
//! let json = r##"{
//!     "fields": [
//!         {"field": "Name", "x": 500, "y": 420, "size": 64, "align": "center", "bold": true},
//!         {"field": "Date", "color": "#444444"}
//!     ]
//! }"##;
//!
//! let doc: LayoutDocument = serde_json::from_str(json).unwrap();
//! let layout = doc.resolve(1000, 1000);
//! assert_eq!(layout[0].font_size, 64);
//! assert_eq!(layout[1].align, Align::Center);
//! assert_eq!((layout[1].x, layout[1].y), (500, 620));
//! ```

use image::Rgba;
use log::warn;
use serde::{Deserialize, Serialize};

/// Font size used when a field spec omits one.
pub const DEFAULT_FONT_SIZE: u32 = 80;

/// Vertical distance between fields placed at their default position.
pub const DEFAULT_FIELD_SPACING: u32 = 120;

/// Largest font size accepted from a layout document.
pub const MAX_FONT_SIZE: u32 = 1000;

/// Horizontal alignment of text relative to its anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    /// Parse `left` / `center` / `right`, plus the `左` / `中` / `右` labels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" | "左" => Some(Align::Left),
            "center" | "centre" | "middle" | "中" => Some(Align::Center),
            "right" | "右" => Some(Align::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }

    /// Left edge of a run of width `width` anchored at `anchor_x`.
    #[inline]
    pub fn origin_x(self, anchor_x: f32, width: f32) -> f32 {
        match self {
            Align::Left => anchor_x,
            Align::Center => anchor_x - width / 2.0,
            Align::Right => anchor_x - width,
        }
    }
}

/// Parse a `#RRGGBB` / `#RRGGBBAA` / `#RGB` colour.
pub fn parse_color(s: &str) -> Option<Rgba<u8>> {
    let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => {
            let mut out = [0u8, 0, 0, 255];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(Rgba(out))
        }
        6 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255])),
        8 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, channel(6)?])),
        _ => None,
    }
}

/// Format a colour as `#RRGGBB`, or `#RRGGBBAA` when not opaque.
pub fn format_color(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

/// A fully resolved rendering spec for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    /// Record field whose value is drawn.
    pub field: String,
    /// Anchor position in canvas pixels.
    pub x: u32,
    pub y: u32,
    /// Point size (pixel em size).
    pub font_size: u32,
    pub color: Rgba<u8>,
    pub align: Align,
    pub bold: bool,
    pub italic: bool,
}

impl FieldLayout {
    /// Initial placement for a field that was just selected for display:
    /// horizontally centred, stacked below the canvas midpoint by list index.
    pub fn initial(field: impl Into<String>, index: usize, canvas_width: u32, canvas_height: u32) -> Self {
        let y = canvas_height / 2 + index as u32 * DEFAULT_FIELD_SPACING;
        Self {
            field: field.into(),
            x: canvas_width / 2,
            y: y.min(canvas_height),
            font_size: DEFAULT_FONT_SIZE,
            color: Rgba([0, 0, 0, 255]),
            align: Align::Center,
            bold: false,
            italic: false,
        }
    }
}

/// One field entry as stored in a layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    #[serde(default, alias = "font_size", skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Text alignment: "left", "center", "right".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    /// Deselected fields keep their settings for later reuse.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl FieldSpec {
    /// Store a resolved layout back into document form.
    pub fn from_layout(layout: &FieldLayout) -> Self {
        Self {
            field: layout.field.clone(),
            x: Some(layout.x as i64),
            y: Some(layout.y as i64),
            size: Some(layout.font_size as i64),
            color: Some(format_color(layout.color)),
            align: Some(layout.align.as_str().to_string()),
            bold: layout.bold,
            italic: layout.italic,
            enabled: true,
        }
    }
}

/// The persisted layout: an ordered list of field specs.
///
/// List order is z-order: later fields draw over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl LayoutDocument {
    pub fn from_layouts(layouts: &[FieldLayout]) -> Self {
        Self {
            fields: layouts.iter().map(FieldSpec::from_layout).collect(),
        }
    }

    /// Resolve enabled entries against a canvas, filling defaults and
    /// clamping positions into the canvas.
    pub fn resolve(&self, canvas_width: u32, canvas_height: u32) -> Vec<FieldLayout> {
        self.fields
            .iter()
            .filter(|spec| spec.enabled)
            .enumerate()
            .map(|(index, spec)| {
                let mut layout =
                    FieldLayout::initial(spec.field.clone(), index, canvas_width, canvas_height);

                if let Some(x) = spec.x {
                    layout.x = x.clamp(0, canvas_width as i64) as u32;
                }
                if let Some(y) = spec.y {
                    layout.y = y.clamp(0, canvas_height as i64) as u32;
                }
                if let Some(size) = spec.size {
                    layout.font_size = size.clamp(1, MAX_FONT_SIZE as i64) as u32;
                }
                if let Some(color) = &spec.color {
                    match parse_color(color) {
                        Some(c) => layout.color = c,
                        None => warn!(
                            "Field '{}': unreadable color '{}', using black",
                            spec.field, color
                        ),
                    }
                }
                if let Some(align) = &spec.align {
                    match Align::parse(align) {
                        Some(a) => layout.align = a,
                        None => warn!(
                            "Field '{}': unknown alignment '{}', centering",
                            spec.field, align
                        ),
                    }
                }
                layout.bold = spec.bold;
                layout.italic = spec.italic;
                layout
            })
            .collect()
    }

    /// Names of the fields that will be drawn, in draw order.
    pub fn enabled_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|spec| spec.enabled)
            .map(|spec| spec.field.as_str())
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
