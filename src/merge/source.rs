//! Merge inputs and their per-source options.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PdfError;
use crate::outline::BookmarkNode;

/// How a source contributes to the merged document's outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutlineMode {
    /// The source contributes nothing.
    #[default]
    None,
    /// The source's own outline entries appear at the top level; no entry
    /// is created for the source itself.
    DescendantsOnly,
    /// One entry for the source; its own outline is dropped.
    ThisOnly,
    /// One entry for the source with its own outline nested below.
    WholeHierarchy,
}

impl FromStr for OutlineMode {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "descendants-only" | "descendants" => Ok(Self::DescendantsOnly),
            "this-only" | "this" => Ok(Self::ThisOnly),
            "whole-hierarchy" | "whole" => Ok(Self::WholeHierarchy),
            other => Err(PdfError::invalid_input(format!(
                "unknown outline mode: {other}"
            ))),
        }
    }
}

/// Outline attribute overrides for a source's synthetic entry.
///
/// A present value sets or replaces the attribute; an absent value removes
/// it.
pub type BookmarkStyles = BTreeMap<String, Option<String>>;

/// One document in a merge request.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Raw PDF bytes. Sources with empty content are skipped.
    pub content: Vec<u8>,
    /// Title used for the source's outline entry.
    pub title: String,
    /// Outline contribution mode.
    pub outline_mode: OutlineMode,
    /// Insert a blank page before this source when it would otherwise
    /// start on an even page.
    pub start_on_odd_page: bool,
    /// Outline attribute overrides, see [`BookmarkStyles`].
    pub bookmark_styles: BookmarkStyles,
}

impl SourceDocument {
    /// A source with default options.
    pub fn new(content: Vec<u8>, title: impl Into<String>) -> Self {
        Self {
            content,
            title: title.into(),
            outline_mode: OutlineMode::default(),
            start_on_odd_page: false,
            bookmark_styles: BookmarkStyles::new(),
        }
    }
}

/// A source's recorded position and outline contribution, collected while
/// pages are copied and consumed when the final outline is assembled.
#[derive(Debug, Clone)]
pub(crate) struct MergedDocumentInfo {
    pub title: String,
    /// 1-based page the source starts on in the merged document, after
    /// any inserted blank page.
    pub start_page: u32,
    /// The source's native outline, already shifted.
    pub outline: Vec<BookmarkNode>,
    pub outline_mode: OutlineMode,
    pub bookmark_styles: BookmarkStyles,
}
