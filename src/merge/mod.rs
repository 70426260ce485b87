//! Document merging with outline reconciliation.

pub mod bookmarks;
pub mod merger;
pub mod source;

pub use merger::{MergeOutput, Merger};
pub use source::{BookmarkStyles, OutlineMode, SourceDocument};
