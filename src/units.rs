//! # Physical Units
//!
//! Converts physical lengths to pixel counts at a fixed resolution, and
//! describes the print sheet sizes artifacts are packed onto.
//!
//! ## Usage
//!
//! ```
//! use certmerge::units::{Length, PageSize, Unit, to_pixels};
//!
//! // 2.54cm at 300 DPI is exactly one inch
//! assert_eq!(to_pixels(2.54, Unit::Centimeter, 300), 300);
//!
//! let margin: Length = "1cm".parse().unwrap();
//! assert_eq!(margin.to_pixels(300), 118);
//!
//! let (w, h) = PageSize::A4.to_pixels(300);
//! assert_eq!((w, h), (2480, 3508));
//! ```
//!
//! ## Calculations
//!
//! ```text
//! pixels = round(length * dpi / units_per_inch)
//!
//! For A4 at 300 DPI:
//!   21.0cm * 300 / 2.54 = 2480.3 → 2480px
//!   29.7cm * 300 / 2.54 = 3507.9 → 3508px
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CertmergeError;

/// Default output resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 300;

/// A physical (or pixel) unit of length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Millimeter,
    Centimeter,
    Inch,
    Point,
    /// Already in pixels; DPI is ignored.
    Pixel,
}

impl Unit {
    /// How many of this unit make up one inch. `None` for pixels.
    #[inline]
    pub fn per_inch(self) -> Option<f32> {
        match self {
            Unit::Millimeter => Some(25.4),
            Unit::Centimeter => Some(2.54),
            Unit::Inch => Some(1.0),
            Unit::Point => Some(72.0),
            Unit::Pixel => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Inch => "in",
            Unit::Point => "pt",
            Unit::Pixel => "px",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "mm" => Some(Unit::Millimeter),
            "cm" => Some(Unit::Centimeter),
            "in" | "\"" => Some(Unit::Inch),
            "pt" => Some(Unit::Point),
            "px" => Some(Unit::Pixel),
            _ => None,
        }
    }
}

/// Convert a physical length to a pixel count at `dpi`.
///
/// Negative lengths are a caller error; they saturate to zero.
#[inline]
pub fn to_pixels(length: f32, unit: Unit, dpi: u32) -> u32 {
    let px = match unit.per_inch() {
        Some(per_inch) => length * dpi as f32 / per_inch,
        None => length,
    };
    px.round().max(0.0) as u32
}

/// A length with its unit, e.g. `9cm` or `5mm`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    pub const fn mm(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Millimeter,
        }
    }

    pub const fn cm(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Centimeter,
        }
    }

    pub const fn px(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Pixel,
        }
    }

    #[inline]
    pub fn to_pixels(&self, dpi: u32) -> u32 {
        to_pixels(self.value, self.unit, dpi)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for Length {
    type Err = CertmergeError;

    /// Parse `<number><unit>`. A bare number is millimetres.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, suffix) = s.split_at(split);

        let value: f32 = number
            .parse()
            .map_err(|_| CertmergeError::InvalidLength(format!("'{}' has no number", s)))?;
        let unit = if suffix.trim().is_empty() {
            Unit::Millimeter
        } else {
            Unit::from_suffix(suffix.trim()).ok_or_else(|| {
                CertmergeError::InvalidLength(format!(
                    "unknown unit '{}' (use mm, cm, in, pt or px)",
                    suffix.trim()
                ))
            })?
        };

        Ok(Self { value, unit })
    }
}

/// # Page Size
///
/// Physical dimensions of a print sheet.
///
/// | Preset | Size |
/// |--------|------|
/// | A4 | 210 x 297 mm |
/// | A5 | 148 x 210 mm |
/// | LETTER | 8.5 x 11 in |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub name: &'static str,
    pub width: Length,
    pub height: Length,
}

impl PageSize {
    pub const A4: Self = Self {
        name: "A4",
        width: Length::mm(210.0),
        height: Length::mm(297.0),
    };

    pub const A5: Self = Self {
        name: "A5",
        width: Length::mm(148.0),
        height: Length::mm(210.0),
    };

    pub const LETTER: Self = Self {
        name: "Letter",
        width: Length {
            value: 8.5,
            unit: Unit::Inch,
        },
        height: Length {
            value: 11.0,
            unit: Unit::Inch,
        },
    };

    /// Page dimensions in pixels at `dpi`.
    pub fn to_pixels(&self, dpi: u32) -> (u32, u32) {
        (self.width.to_pixels(dpi), self.height.to_pixels(dpi))
    }

    /// Parse a page size.
    ///
    /// Formats:
    /// - `"a4"`, `"a5"`, `"letter"` → built-in presets
    /// - `"WIDTHxHEIGHT<unit>"` → custom size, e.g. `"21x29.7cm"` or `"100x150"` (mm)
    pub fn parse(s: &str) -> Result<Self, CertmergeError> {
        let lower = s.trim().to_lowercase();
        if let Some(preset) = Self::built_in()
            .into_iter()
            .find(|p| p.name.to_lowercase() == lower)
        {
            return Ok(preset);
        }

        let (w, h) = lower.split_once('x').ok_or_else(|| {
            CertmergeError::InvalidLength(format!(
                "Unknown page size '{}'. Use a4, a5, letter or WIDTHxHEIGHT<unit>",
                s
            ))
        })?;
        let height: Length = h.parse()?;
        // Width inherits the unit written after the height ("21x29.7cm")
        let width = match w.parse::<f32>() {
            Ok(value) => Length {
                value,
                unit: height.unit,
            },
            Err(_) => w.parse()?,
        };

        Ok(Self {
            name: "Custom",
            width,
            height,
        })
    }

    /// List all built-in page sizes.
    pub fn built_in() -> Vec<Self> {
        vec![Self::A4, Self::A5, Self::LETTER]
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

// ============================================================================
// TESTS
// ============================================================================
