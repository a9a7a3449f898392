//! Record rendering: one record in, one finished artifact out.

use image::{DynamicImage, RgbaImage};

use super::font::FontHandle;
use super::style::{TextStyle, render_styled};
use crate::error::CertmergeError;
use crate::layout::FieldLayout;
use crate::table::Record;

/// The canvas every artifact starts from.
///
/// Templates are shared read-only across the whole batch; each render works
/// on its own copy.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasTemplate {
    /// Text drawn over a copy of the background image.
    Composited(RgbaImage),
    /// Text only, on a fully transparent canvas the size of the background.
    Transparent { width: u32, height: u32 },
}

impl CanvasTemplate {
    pub fn composited(background: &DynamicImage) -> Self {
        Self::Composited(background.to_rgba8())
    }

    pub fn transparent(width: u32, height: u32) -> Self {
        Self::Transparent { width, height }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Composited(image) => image.dimensions(),
            Self::Transparent { width, height } => (*width, *height),
        }
    }

    /// A fresh canvas to draw one record on.
    pub fn instantiate(&self) -> RgbaImage {
        match self {
            Self::Composited(image) => image.clone(),
            Self::Transparent { width, height } => RgbaImage::new(*width, *height),
        }
    }
}

/// One rendered record, named by its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    pub id: String,
    pub image: RgbaImage,
}

impl RenderedArtifact {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Renders records against a fixed template, layout and font.
///
/// Fields are drawn in layout order, so a later field paints over an earlier
/// one where they overlap.
#[derive(Debug, Clone, Copy)]
pub struct RecordRenderer<'a> {
    template: &'a CanvasTemplate,
    layout: &'a [FieldLayout],
    font: &'a FontHandle,
}

impl<'a> RecordRenderer<'a> {
    pub fn new(template: &'a CanvasTemplate, layout: &'a [FieldLayout], font: &'a FontHandle) -> Self {
        Self {
            template,
            layout,
            font,
        }
    }

    pub fn template(&self) -> &CanvasTemplate {
        self.template
    }

    /// Render `record` into a new artifact named `id`.
    ///
    /// Fails with [`CertmergeError::MissingField`] when the record lacks a
    /// field the layout draws; nothing is returned for that record.
    pub fn render(&self, id: &str, record: &Record) -> Result<RenderedArtifact, CertmergeError> {
        let mut canvas = self.template.instantiate();

        for field in self.layout {
            let text = record
                .display(&field.field)
                .ok_or_else(|| CertmergeError::MissingField {
                    record: id.to_string(),
                    field: field.field.clone(),
                })?;

            let font = self.font.with_size(field.font_size as f32);
            let anchor = (field.x as i32, field.y as i32);
            render_styled(&mut canvas, &text, &font, anchor, &TextStyle::from(field))
                .composite_onto(&mut canvas);
        }

        Ok(RenderedArtifact {
            id: id.to_string(),
            image: canvas,
        })
    }
}
