//! Overlay placement math.

use std::str::FromStr;

use crate::error::PdfError;
use crate::geometry::Rect;

/// Vertical anchor for an overlay box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalPlacement {
    /// Baseline at the top margin.
    Top,
    /// Baseline at the bottom margin.
    #[default]
    Bottom,
    /// Baseline at half the height above the margin.
    Center,
}

/// Horizontal anchor for an overlay box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalPlacement {
    /// Box starts at the left margin.
    Left,
    /// Box ends at the right margin.
    Right,
    /// Box centered between the margins.
    #[default]
    Center,
}

impl FromStr for VerticalPlacement {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "center" => Ok(Self::Center),
            other => Err(PdfError::invalid_input(format!(
                "unknown vertical placement: {other}"
            ))),
        }
    }
}

impl FromStr for HorizontalPlacement {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" => Ok(Self::Center),
            other => Err(PdfError::invalid_input(format!(
                "unknown horizontal placement: {other}"
            ))),
        }
    }
}

/// Baseline origin of an overlay box on a page.
///
/// `page` is the page's display rectangle (rotation already applied) and
/// `text_width` the rendered width of the overlay text.
pub fn overlay_position(
    vertical: VerticalPlacement,
    horizontal: HorizontalPlacement,
    margin: f32,
    page: Rect,
    text_width: f32,
) -> (f32, f32) {
    let x = match horizontal {
        HorizontalPlacement::Left => margin,
        HorizontalPlacement::Right => page.width - margin - text_width,
        HorizontalPlacement::Center => (page.width - margin - text_width) / 2.0,
    };
    let y = match vertical {
        VerticalPlacement::Top => page.height - margin,
        VerticalPlacement::Bottom => margin,
        VerticalPlacement::Center => (page.height - margin) / 2.0,
    };
    (x, y)
}
