//! PDF document assembly: merging with outline reconciliation, text
//! overlays and page numbers, page resizing and simple document creation.
//!
//! The core entry points are [`Merger`] for synchronous merging and
//! [`PdfService`] for running any operation on the blocking thread pool
//! with an optional deadline.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::{Merger, OutlineMode, SourceDocument};
//!
//! # fn example(report: Vec<u8>, appendix: Vec<u8>) -> pdfbind::Result<()> {
//! let mut report = SourceDocument::new(report, "Report");
//! report.outline_mode = OutlineMode::WholeHierarchy;
//! let mut appendix = SourceDocument::new(appendix, "Appendix");
//! appendix.start_on_odd_page = true;
//!
//! let output = Merger::new().merge(&[report, appendix])?;
//! std::fs::write("combined.pdf", &output.content)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]

pub mod engine;
pub mod error;
pub mod geometry;
pub mod merge;
pub mod outline;
pub mod output;
pub mod overlay;
pub mod pages;
pub mod service;

pub use engine::DocumentHandle;
pub use error::{PdfError, Result};
pub use geometry::{PageSize, Rect};
pub use merge::{BookmarkStyles, MergeOutput, Merger, OutlineMode, SourceDocument};
pub use outline::{BookmarkNode, NamedDestination};
pub use overlay::{HorizontalPlacement, OverlayOptions, Stamper, VerticalPlacement};
pub use pages::{centered_text_document, resize_document};
pub use service::{DocumentInfo, PdfService};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name.
pub const NAME: &str = "pdfbind";
