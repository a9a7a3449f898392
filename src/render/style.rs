//! # Styled Text
//!
//! Renders one string at an anchor with alignment and simulated bold/italic.
//!
//! Neither style uses a real font variant:
//!
//! - **Bold** draws the text at the four diagonal offsets `(±1, ±1)` before
//!   drawing it once more in place. This thickens strokes by roughly a pixel on
//!   each side regardless of font size; it is an approximation with no stroke
//!   width guarantee.
//! - **Italic** draws into a padded transparent fragment and shears it
//!   horizontally by [`ITALIC_SHEAR`], pivoting on the text's top line. The
//!   caller composites the fragment at the returned offset.
//!
//! ```text
//!   fragment (tw*1.5 + 60) x (th*2 + 60)
//!   ┌──────────────────────────────┐
//!   │ 30px                         │
//!   │    ┌─────────┐               │
//!   │    │ /Alice/ │  ← sheared    │
//!   │    └─────────┘               │
//!   │                              │
//!   └──────────────────────────────┘
//!   pasted at (x - 30, anchor.y - 30)
//! ```

use image::{Rgba, RgbaImage, imageops};
use log::debug;

use super::font::{FontHandle, TextMetrics};
use super::transform::{Affine, warp};
use crate::layout::{Align, FieldLayout};

/// Diagonal offset used to thicken strokes for simulated bold.
pub const BOLD_OFFSET: f32 = 1.0;

/// Horizontal shear factor for simulated italic.
pub const ITALIC_SHEAR: f32 = 0.3;

/// Padding around the italic fragment so the shear does not clip glyphs.
pub const ITALIC_PADDING: u32 = 60;

/// Width estimate per character when text cannot be measured, as a fraction
/// of the font size.
const FALLBACK_ADVANCE: f32 = 0.7;

/// Colour, alignment and style flags for one text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgba<u8>,
    pub align: Align,
    pub bold: bool,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Rgba([0, 0, 0, 255]),
            align: Align::Left,
            bold: false,
            italic: false,
        }
    }
}

impl From<&FieldLayout> for TextStyle {
    fn from(layout: &FieldLayout) -> Self {
        Self {
            color: layout.color,
            align: layout.align,
            bold: layout.bold,
            italic: layout.italic,
        }
    }
}

/// A rendered image piece waiting to be composited at `offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub image: RgbaImage,
    pub offset: (i64, i64),
}

impl Fragment {
    /// Alpha-blend this fragment onto `canvas`, clipping at the edges.
    pub fn composite_onto(&self, canvas: &mut RgbaImage) {
        imageops::overlay(canvas, &self.image, self.offset.0, self.offset.1);
    }
}

/// Result of rendering one styled run.
#[derive(Debug, Clone, PartialEq)]
pub enum Styled {
    /// Text was drawn directly onto the canvas.
    Drawn,
    /// Text was rendered into a fragment the caller must composite.
    Fragment(Fragment),
}

impl Styled {
    /// Finish the run on `canvas`: composite the fragment if there is one.
    pub fn composite_onto(self, canvas: &mut RgbaImage) {
        if let Styled::Fragment(fragment) = self {
            fragment.composite_onto(canvas);
        }
    }
}

/// Measure `text`, falling back to a size-based estimate.
///
/// Never fails: a run that cannot be measured is estimated as
/// `chars * size * 0.7` wide and `size` tall.
pub fn measure_or_estimate(font: &FontHandle, text: &str) -> TextMetrics {
    font.measure(text).unwrap_or_else(|| {
        debug!("No ink box for {:?} at {}pt, estimating", text, font.size());
        TextMetrics {
            width: text.chars().count() as f32 * font.size() * FALLBACK_ADVANCE,
            height: font.size(),
            bearing_x: 0.0,
        }
    })
}

/// Draw `text` at `(left, top)`, thickened when `bold` is set.
fn draw_run(
    target: &mut RgbaImage,
    font: &FontHandle,
    text: &str,
    (left, top): (f32, f32),
    metrics: &TextMetrics,
    color: Rgba<u8>,
    bold: bool,
) {
    if bold {
        for (dx, dy) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
            font.draw(
                target,
                text,
                left + dx * BOLD_OFFSET,
                top + dy * BOLD_OFFSET,
                metrics.bearing_x,
                color,
            );
        }
    }
    font.draw(target, text, left, top, metrics.bearing_x, color);
}

/// Render `text` anchored at `anchor` onto `canvas`.
///
/// Upright text is drawn in place and [`Styled::Drawn`] is returned. Italic
/// text leaves `canvas` untouched and returns a [`Styled::Fragment`] with its
/// paste offset. The vertical origin is always `anchor.1` (the text's top
/// line); only the horizontal origin depends on alignment.
pub fn render_styled(
    canvas: &mut RgbaImage,
    text: &str,
    font: &FontHandle,
    anchor: (i32, i32),
    style: &TextStyle,
) -> Styled {
    let metrics = measure_or_estimate(font, text);
    let x = style.align.origin_x(anchor.0 as f32, metrics.width);
    let y = anchor.1 as f32;

    if !style.italic {
        draw_run(canvas, font, text, (x, y), &metrics, style.color, style.bold);
        return Styled::Drawn;
    }

    let half_pad = (ITALIC_PADDING / 2) as f32;
    let frag_width = (metrics.width * 1.5).ceil() as u32 + ITALIC_PADDING;
    let frag_height = (metrics.height * 2.0).ceil() as u32 + ITALIC_PADDING;
    let mut upright = RgbaImage::new(frag_width, frag_height);

    let x0 = x.round();
    // Keep the sub-pixel part of the origin inside the fragment
    let inner_left = half_pad + (x - x0);
    draw_run(
        &mut upright,
        font,
        text,
        (inner_left, half_pad),
        &metrics,
        style.color,
        style.bold,
    );

    let sheared = warp(
        &upright,
        &Affine::shear_x(ITALIC_SHEAR, -half_pad * ITALIC_SHEAR),
    );

    Styled::Fragment(Fragment {
        image: sheared,
        offset: (x0 as i64 - half_pad as i64, anchor.1 as i64 - half_pad as i64),
    })
}

/// Render and composite in one step.
pub fn draw_styled(
    canvas: &mut RgbaImage,
    text: &str,
    font: &FontHandle,
    anchor: (i32, i32),
    style: &TextStyle,
) {
    render_styled(canvas, text, font, anchor, style).composite_onto(canvas);
}
