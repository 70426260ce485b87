//! Text overlays and page numbering.

pub mod placement;
pub mod stamper;

pub use placement::{HorizontalPlacement, VerticalPlacement, overlay_position};
pub use stamper::{OverlayOptions, Stamper};
