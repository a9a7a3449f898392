//! Affine resampling of RGBA fragments.

use image::{Rgba, RgbaImage};

/// An inverse affine map: the output pixel at `(x, y)` takes the source
/// pixel at `(a*x + b*y + c, d*x + e*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
    };

    /// Horizontal shear by `factor` with a horizontal translation of `offset`.
    ///
    /// Rows further down sample further right, so content leans to the right.
    pub fn shear_x(factor: f32, offset: f32) -> Self {
        Self {
            b: factor,
            c: offset,
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }
}

/// Resample `src` through `map` with nearest-neighbour sampling at pixel
/// centres. Samples outside the source are transparent.
pub fn warp(src: &RgbaImage, map: &Affine) -> RgbaImage {
    let (width, height) = src.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let (sx, sy) = map.apply(x as f32 + 0.5, y as f32 + 0.5);
        let (sx, sy) = (sx.floor(), sy.floor());
        if sx < 0.0 || sy < 0.0 || sx >= width as f32 || sy >= height as f32 {
            Rgba([0, 0, 0, 0])
        } else {
            *src.get_pixel(sx as u32, sy as u32)
        }
    })
}
