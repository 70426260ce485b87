//! Named page sizes and page rectangles.
//!
//! Sizes are expressed in PDF points (1/72 inch) and match the values used
//! by common desktop publishing tools for the ISO A/B series and the North
//! American formats.

use std::fmt;
use std::str::FromStr;

use crate::error::PdfError;

/// A page rectangle anchored at the origin, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from width and height.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when the rectangle is wider than it is tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// The same rectangle with width and height swapped.
    pub fn rotated(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// Named page sizes supported by the resize and document-creation
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum PageSize {
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    A8,
    A9,
    A10,
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B9,
    B10,
    Letter,
    Legal,
    Postcard,
}

impl PageSize {
    /// Look up a page size by identifier, case-insensitively.
    ///
    /// Returns `None` for unknown identifiers so callers can treat them as
    /// "no size override".
    pub fn lookup(id: &str) -> Option<Self> {
        let id = id.trim().to_ascii_uppercase();
        Some(match id.as_str() {
            "A0" => Self::A0,
            "A1" => Self::A1,
            "A2" => Self::A2,
            "A3" => Self::A3,
            "A4" => Self::A4,
            "A5" => Self::A5,
            "A6" => Self::A6,
            "A7" => Self::A7,
            "A8" => Self::A8,
            "A9" => Self::A9,
            "A10" => Self::A10,
            "B0" => Self::B0,
            "B1" => Self::B1,
            "B2" => Self::B2,
            "B3" => Self::B3,
            "B4" => Self::B4,
            "B5" => Self::B5,
            "B6" => Self::B6,
            "B7" => Self::B7,
            "B8" => Self::B8,
            "B9" => Self::B9,
            "B10" => Self::B10,
            "LETTER" => Self::Letter,
            "LEGAL" => Self::Legal,
            "POSTCARD" => Self::Postcard,
            _ => return None,
        })
    }

    /// Portrait dimensions of this size, in points.
    pub fn dimensions(self) -> Rect {
        let (w, h) = match self {
            Self::A0 => (2384.0, 3370.0),
            Self::A1 => (1684.0, 2384.0),
            Self::A2 => (1191.0, 1684.0),
            Self::A3 => (842.0, 1191.0),
            Self::A4 => (595.0, 842.0),
            Self::A5 => (420.0, 595.0),
            Self::A6 => (298.0, 420.0),
            Self::A7 => (210.0, 298.0),
            Self::A8 => (148.0, 210.0),
            Self::A9 => (105.0, 148.0),
            Self::A10 => (74.0, 105.0),
            Self::B0 => (2834.0, 4008.0),
            Self::B1 => (2004.0, 2834.0),
            Self::B2 => (1417.0, 2004.0),
            Self::B3 => (1001.0, 1417.0),
            Self::B4 => (708.0, 1001.0),
            Self::B5 => (498.0, 708.0),
            Self::B6 => (354.0, 498.0),
            Self::B7 => (249.0, 354.0),
            Self::B8 => (175.0, 249.0),
            Self::B9 => (124.0, 175.0),
            Self::B10 => (87.0, 124.0),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
            Self::Postcard => (283.0, 416.0),
        };
        Rect::new(w, h)
    }

    /// Dimensions with the requested orientation applied.
    pub fn resolve(self, landscape: bool) -> Rect {
        let rect = self.dimensions();
        if landscape { rect.rotated() } else { rect }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Letter => "Letter",
            Self::Legal => "Legal",
            Self::Postcard => "Postcard",
            other => return write!(f, "{other:?}"),
        };
        f.write_str(name)
    }
}

impl FromStr for PageSize {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
            .ok_or_else(|| PdfError::invalid_input(format!("unknown page size: {s}")))
    }
}
