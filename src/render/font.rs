//! TTF font handle for field text.
//!
//! Measures and rasterizes text with ab_glyph, alpha-blending glyph coverage
//! straight onto an RGBA canvas. Sizes follow the point-size convention of
//! desktop imaging libraries: a size of 80 means the em square is 80px tall.

use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use image::{Pixel, Rgba, RgbaImage};
use std::sync::OnceLock;

use crate::error::CertmergeError;

static DEJAVU_SANS: OnceLock<FontArc> = OnceLock::new();

fn dejavu_sans() -> &'static FontArc {
    DEJAVU_SANS.get_or_init(|| {
        FontArc::try_from_slice(include_bytes!("fonts/DejaVuSans.ttf"))
            .expect("Failed to load embedded DejaVu Sans")
    })
}

/// Ink measurements of a text run, relative to its draw origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Horizontal ink extent.
    pub width: f32,
    /// Distance from the layout top line down to the lowest ink row.
    pub height: f32,
    /// Offset of the first ink column from the pen start.
    pub bearing_x: f32,
}

/// A loaded font at a particular size.
#[derive(Clone)]
pub struct FontHandle {
    font: FontArc,
    size: f32,
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle").field("size", &self.size).finish()
    }
}

impl FontHandle {
    /// Load a TTF/OTF font from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>, size: f32) -> Result<Self, CertmergeError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| CertmergeError::Font(format!("Failed to parse font: {}", e)))?;
        Ok(Self { font, size })
    }

    /// The embedded font, always available.
    pub fn fallback(size: f32) -> Self {
        Self {
            font: dejavu_sans().clone(),
            size,
        }
    }

    /// Same font data at another size.
    pub fn with_size(&self, size: f32) -> Self {
        Self {
            font: self.font.clone(),
            size,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// ab_glyph scales by ascent-to-descent height; convert from em size.
    fn px_scale(&self) -> PxScale {
        match self.font.units_per_em() {
            Some(upem) if upem > 0.0 => {
                PxScale::from(self.size * self.font.height_unscaled() / upem)
            }
            _ => PxScale::from(self.size),
        }
    }

    /// Lay out a single line with the pen starting at `(x, top)`.
    fn layout(&self, text: &str, x: f32, top: f32) -> Vec<Glyph> {
        let scale = self.px_scale();
        let scaled = self.font.as_scaled(scale);
        let baseline = top + scaled.ascent();

        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = x;
        let mut previous = None;

        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, baseline)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }
        glyphs
    }

    /// Measure the ink box of `text`.
    ///
    /// Returns `None` when no glyph has an outline (empty or blank text).
    pub fn measure(&self, text: &str) -> Option<TextMetrics> {
        let mut bounds: Option<(f32, f32, f32)> = None;
        for glyph in self.layout(text, 0.0, 0.0) {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let b = outlined.px_bounds();
                bounds = Some(match bounds {
                    None => (b.min.x, b.max.x, b.max.y),
                    Some((min_x, max_x, max_y)) => {
                        (min_x.min(b.min.x), max_x.max(b.max.x), max_y.max(b.max.y))
                    }
                });
            }
        }

        bounds.map(|(min_x, max_x, max_y)| TextMetrics {
            width: max_x - min_x,
            height: max_y.max(0.0),
            bearing_x: min_x,
        })
    }

    /// Draw `text` so its ink starts at column `left` with the layout top at `top`.
    ///
    /// Pixels outside `target` are clipped.
    pub fn draw(
        &self,
        target: &mut RgbaImage,
        text: &str,
        left: f32,
        top: f32,
        bearing_x: f32,
        color: Rgba<u8>,
    ) {
        let (width, height) = (target.width() as i64, target.height() as i64);

        for glyph in self.layout(text, left - bearing_x, top) {
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i64 + bounds.min.x as i64;
                let y = py as i64 + bounds.min.y as i64;
                if x < 0 || y < 0 || x >= width || y >= height {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32).round() as u8;
                if alpha == 0 {
                    return;
                }
                let src = Rgba([color[0], color[1], color[2], alpha]);
                target.get_pixel_mut(x as u32, y as u32).blend(&src);
            });
        }
    }
}
