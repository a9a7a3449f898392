//! # Sheet Packing
//!
//! Arranges artifacts onto fixed-size print pages, row by row.
//!
//! This is a greedy shelf packer: artifacts are placed left to right in input
//! order, a row wraps when the next artifact would cross the right margin, and
//! a page is finished when the next artifact would cross the bottom margin.
//! It does not reorder or rotate anything, so the same input always produces
//! the same pages.
//!
//! ```text
//!   ┌──────────────── page_width ────────────────┐
//!   │ margin                                     │
//!   │   ┌─────┐ gap ┌─────┐ gap ┌──┐             │
//!   │   │  1  │     │  2  │     │3 │  ← row 1    │
//!   │   └─────┘     └─────┘     └──┘             │
//!   │     gap (below the tallest in the row)     │
//!   │   ┌─────┐ gap ┌─────┐                      │
//!   │   │  4  │     │  5  │         ← row 2      │
//!   │   └─────┘     └─────┘                      │
//!   └────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use certmerge::sheet::{SheetConfig, plan};
//!
//! let config = SheetConfig::new(900, 1200, 50, 10);
//! let placements = plan(&config, &[(300, 400); 5]).unwrap();
//!
//! let pages: Vec<usize> = placements.iter().map(|p| p.page).collect();
//! assert_eq!(pages, vec![1, 1, 1, 1, 2]);
//! ```

use image::{Rgba, RgbaImage, imageops};
use log::debug;

use crate::error::CertmergeError;
use crate::units::{Length, PageSize};

/// Page geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetConfig {
    pub page_width: u32,
    pub page_height: u32,
    /// Blank border on all four sides.
    pub margin: u32,
    /// Spacing between neighbouring artifacts, horizontally and vertically.
    pub gap: u32,
    /// Page base colour. Artifacts are alpha-blended over it.
    pub background: Rgba<u8>,
}

impl SheetConfig {
    pub fn new(page_width: u32, page_height: u32, margin: u32, gap: u32) -> Self {
        Self {
            page_width,
            page_height,
            margin,
            gap,
            background: Rgba([255, 255, 255, 255]),
        }
    }

    /// Page geometry for a physical page size at `dpi`.
    pub fn from_physical(page: &PageSize, margin: Length, gap: Length, dpi: u32) -> Self {
        let (width, height) = page.to_pixels(dpi);
        Self::new(width, height, margin.to_pixels(dpi), gap.to_pixels(dpi))
    }

    /// Width and height inside the margins.
    pub fn usable(&self) -> (u32, u32) {
        (
            self.page_width.saturating_sub(self.margin.saturating_mul(2)),
            self.page_height.saturating_sub(self.margin.saturating_mul(2)),
        )
    }

    /// Reject an artifact size that could never fit, even on an empty page.
    pub fn check_fits(&self, width: u32, height: u32) -> Result<(), CertmergeError> {
        let (usable_width, usable_height) = self.usable();
        if width > usable_width || height > usable_height {
            return Err(CertmergeError::DegenerateGeometry {
                artifact_width: width,
                artifact_height: height,
                usable_width,
                usable_height,
            });
        }
        Ok(())
    }
}

/// Where one artifact landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Position of the artifact in the input sequence.
    pub index: usize,
    /// 1-based page number.
    pub page: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Whether two placements on the same page share any pixel.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.page == other.page
            && self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// A finished page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub image: RgbaImage,
    pub placements: Vec<Placement>,
}

impl Page {
    fn blank(number: usize, config: &SheetConfig) -> Self {
        Self {
            number,
            image: RgbaImage::from_pixel(config.page_width, config.page_height, config.background),
            placements: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Shelf cursor: the geometry half of the packer.
#[derive(Debug, Clone)]
struct Shelf {
    config: SheetConfig,
    x: u32,
    y: u32,
    row_height: u32,
    page: usize,
    placed_on_page: usize,
    placed: usize,
}

impl Shelf {
    fn new(config: SheetConfig) -> Self {
        Self {
            x: config.margin,
            y: config.margin,
            row_height: 0,
            page: 1,
            placed_on_page: 0,
            placed: 0,
            config,
        }
    }

    /// Find the spot for the next artifact. Returns the placement and whether
    /// a new page had to be started for it.
    fn advance(&mut self, width: u32, height: u32) -> Result<(Placement, bool), CertmergeError> {
        self.config.check_fits(width, height)?;
        let right = self.config.page_width.saturating_sub(self.config.margin);
        let bottom = self.config.page_height.saturating_sub(self.config.margin);

        // Row full: wrap to the next row
        if self.x + width > right {
            self.x = self.config.margin;
            self.y += self.row_height + self.config.gap;
            self.row_height = 0;
        }

        // Page full: start a new page
        let mut new_page = false;
        if self.y + height > bottom && self.placed_on_page > 0 {
            self.page += 1;
            self.x = self.config.margin;
            self.y = self.config.margin;
            self.row_height = 0;
            self.placed_on_page = 0;
            new_page = true;
        }

        let placement = Placement {
            index: self.placed,
            page: self.page,
            x: self.x,
            y: self.y,
            width,
            height,
        };

        self.row_height = self.row_height.max(height);
        self.x += width + self.config.gap;
        self.placed_on_page += 1;
        self.placed += 1;

        Ok((placement, new_page))
    }
}

/// Compute placements for a sequence of artifact sizes without drawing.
pub fn plan(config: &SheetConfig, sizes: &[(u32, u32)]) -> Result<Vec<Placement>, CertmergeError> {
    let mut shelf = Shelf::new(*config);
    sizes
        .iter()
        .map(|&(w, h)| shelf.advance(w, h).map(|(placement, _)| placement))
        .collect()
}

/// Incremental page builder.
///
/// Feed artifacts with [`SheetPacker::place`] in output order; pages that
/// fill up are kept until [`SheetPacker::finish`].
#[derive(Debug, Clone)]
pub struct SheetPacker {
    shelf: Shelf,
    current: Page,
    finished: Vec<Page>,
}

impl SheetPacker {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            current: Page::blank(1, &config),
            shelf: Shelf::new(config),
            finished: Vec::new(),
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.shelf.config
    }

    /// Paste `image` at the next free spot, starting a new page if needed.
    pub fn place(&mut self, image: &RgbaImage) -> Result<Placement, CertmergeError> {
        let (placement, new_page) = self.shelf.advance(image.width(), image.height())?;

        if new_page {
            let next = Page::blank(placement.page, &self.shelf.config);
            let done = std::mem::replace(&mut self.current, next);
            debug!(
                "Page {} finished with {} artifact(s)",
                done.number,
                done.placements.len()
            );
            self.finished.push(done);
        }

        imageops::overlay(
            &mut self.current.image,
            image,
            placement.x as i64,
            placement.y as i64,
        );
        self.current.placements.push(placement);
        Ok(placement)
    }

    /// Number of pages started so far, including the one in progress.
    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    /// Finish packing. The in-progress page is kept when it holds anything,
    /// or when it is the only page.
    pub fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() || self.finished.is_empty() {
            self.finished.push(self.current);
        }
        self.finished
    }
}

/// Pack `images` onto pages.
///
/// Every size is checked before any page is drawn, so an impossible
/// configuration fails without doing work.
pub fn pack<'a, I>(config: &SheetConfig, images: I) -> Result<Vec<Page>, CertmergeError>
where
    I: IntoIterator<Item = &'a RgbaImage>,
    I::IntoIter: Clone,
{
    let images = images.into_iter();
    for image in images.clone() {
        config.check_fits(image.width(), image.height())?;
    }

    let mut packer = SheetPacker::new(*config);
    for image in images {
        packer.place(image)?;
    }
    Ok(packer.finish())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, color)
    }

    #[test]
    fn test_five_on_a_page_geometry() {
        let config = SheetConfig::new(900, 1200, 50, 10);
        let placements = plan(&config, &[(300, 400); 5]).unwrap();
        let spots: Vec<(usize, u32, u32)> =
            placements.iter().map(|p| (p.page, p.x, p.y)).collect();
        assert_eq!(
            spots,
            vec![
                (1, 50, 50),
                (1, 360, 50),
                (1, 50, 460),
                (1, 360, 460),
                (2, 50, 50),
            ]
        );
    }

    #[test]
    fn test_row_height_is_tallest_in_row() {
        let config = SheetConfig::new(1000, 1000, 0, 5);
        let placements = plan(&config, &[(400, 100), (400, 300), (400, 50)]).unwrap();
        assert_eq!((placements[2].x, placements[2].y), (0, 305));
    }

    #[test]
    fn test_exact_fit_does_not_wrap() {
        // Usable width 800 holds exactly two 395px items with a 10px gap
        let config = SheetConfig::new(900, 500, 50, 10);
        let placements = plan(&config, &[(395, 100), (395, 100)]).unwrap();
        assert_eq!(placements[1].y, 50);
        assert_eq!(placements[1].x, 455);
    }

    #[test]
    fn test_no_overlap_and_every_item_placed_once() {
        let config = SheetConfig::new(600, 800, 20, 7);
        let sizes: Vec<(u32, u32)> = (0..40)
            .map(|i| (50 + (i * 37) % 200, 60 + (i * 53) % 300))
            .collect();
        let placements = plan(&config, &sizes).unwrap();

        assert_eq!(placements.len(), sizes.len());
        for (i, p) in placements.iter().enumerate() {
            assert_eq!(p.index, i);
            assert!(p.x + p.width <= config.page_width - config.margin);
            assert!(p.y + p.height <= config.page_height - config.margin);
            for q in &placements[i + 1..] {
                assert!(!p.overlaps(q), "{:?} overlaps {:?}", p, q);
            }
        }
    }

    #[test]
    fn test_order_is_row_major() {
        let config = SheetConfig::new(500, 500, 10, 10);
        let placements = plan(&config, &[(100, 100); 9]).unwrap();
        for pair in placements.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!((a.page, a.y, a.x) < (b.page, b.y, b.x));
        }
    }

    #[test]
    fn test_page_count_never_decreases() {
        let config = SheetConfig::new(700, 900, 30, 12);
        let mut last = 0;
        for n in 0..60 {
            let placements = plan(&config, &vec![(210, 260); n]).unwrap();
            let pages = placements.last().map(|p| p.page).unwrap_or(1);
            assert!(pages >= last);
            last = pages;
        }
    }

    #[test]
    fn test_oversized_artifact_is_rejected() {
        let config = SheetConfig::new(900, 1200, 50, 10);
        match plan(&config, &[(801, 100)]) {
            Err(CertmergeError::DegenerateGeometry {
                usable_width,
                usable_height,
                ..
            }) => assert_eq!((usable_width, usable_height), (800, 1100)),
            other => panic!("expected degenerate geometry, got {:?}", other),
        }
        assert!(config.check_fits(800, 1100).is_ok());
    }

    #[test]
    fn test_margins_larger_than_page() {
        let config = SheetConfig::new(100, 100, 60, 0);
        assert_eq!(config.usable(), (0, 0));
        assert!(plan(&config, &[(1, 1)]).is_err());
    }

    #[test]
    fn test_huge_margin_is_degenerate_not_overflow() {
        let config = SheetConfig::new(1000, 1000, u32::MAX, 0);
        assert_eq!(config.usable(), (0, 0));
        assert!(matches!(
            config.check_fits(1, 1),
            Err(CertmergeError::DegenerateGeometry { .. })
        ));

        let config = SheetConfig::new(1000, 1000, 1 << 31, 0);
        assert_eq!(config.usable(), (0, 0));
        assert!(config.check_fits(10, 10).is_err());
    }

    #[test]
    fn test_pack_emits_pages() {
        let config = SheetConfig::new(900, 1200, 50, 10);
        let images: Vec<RgbaImage> = (0..5).map(|_| solid(300, 400, Rgba([0, 0, 255, 255]))).collect();
        let pages = pack(&config, &images).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].placements.len(), 4);
        assert_eq!(pages[1].placements.len(), 1);
        assert_eq!(pages[1].number, 2);
        assert_eq!(pages[0].image.dimensions(), (900, 1200));
        assert_eq!(*pages[0].image.get_pixel(60, 60), Rgba([0, 0, 255, 255]));
        assert_eq!(*pages[0].image.get_pixel(10, 10), Rgba([255, 255, 255, 255]));
        // Second page only holds the first slot
        assert_eq!(*pages[1].image.get_pixel(400, 60), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_transparent_artifacts_show_white_page() {
        let config = SheetConfig::new(200, 200, 10, 0);
        let mut cutout = RgbaImage::new(50, 50);
        cutout.put_pixel(25, 25, Rgba([0, 0, 0, 255]));
        let pages = pack(&config, [&cutout]).unwrap();

        let page = &pages[0].image;
        assert_eq!(*page.get_pixel(11, 11), Rgba([255, 255, 255, 255]));
        assert_eq!(*page.get_pixel(35, 35), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_empty_input_yields_one_blank_page() {
        let config = SheetConfig::new(100, 100, 5, 5);
        let pages = pack(&config, std::iter::empty::<&RgbaImage>()).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn test_pack_checks_sizes_before_drawing() {
        let config = SheetConfig::new(300, 300, 10, 10);
        let ok = solid(100, 100, Rgba([0, 0, 0, 255]));
        let huge = solid(500, 100, Rgba([0, 0, 0, 255]));
        assert!(pack(&config, [&ok, &huge]).is_err());
    }

    #[test]
    fn test_from_physical_a4() {
        let config = SheetConfig::from_physical(&PageSize::A4, Length::cm(1.0), Length::mm(5.0), 300);
        assert_eq!((config.page_width, config.page_height), (2480, 3508));
        assert_eq!((config.margin, config.gap), (118, 59));
    }
}
