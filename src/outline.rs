//! In-memory outline (bookmark) trees and named destinations.
//!
//! Outlines read from source documents and outlines about to be written to a
//! merged document share this representation, so the merge pipeline can
//! shift page references and graft subtrees without touching PDF objects.

use std::collections::BTreeMap;

use lopdf::Object;

/// One outline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkNode {
    /// Display title.
    pub title: String,
    /// 1-based page number the entry points at, if it has a destination.
    pub page: Option<u32>,
    /// RGB color, each component in `0.0..=1.0`.
    pub color: Option<[f32; 3]>,
    /// Whether the entry's children are shown expanded.
    pub open: bool,
    /// Child entries. `None` means the entry never had a children list,
    /// which is distinct from an empty one.
    pub kids: Option<Vec<BookmarkNode>>,
    /// Additional string attributes carried through to the outline
    /// dictionary verbatim.
    pub extra: BTreeMap<String, String>,
}

impl BookmarkNode {
    /// Create a leaf entry pointing at a page.
    pub fn new(title: impl Into<String>, page: u32) -> Self {
        Self {
            title: title.into(),
            page: Some(page),
            color: None,
            open: false,
            kids: None,
            extra: BTreeMap::new(),
        }
    }
}

/// A named destination pointing into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedDestination {
    /// 1-based page number.
    pub page: u32,
    /// Destination parameters following the page reference, e.g.
    /// `/XYZ null null null`.
    pub params: Vec<Object>,
}

impl NamedDestination {
    /// A destination showing the top-left of `page` at the current zoom.
    pub fn to_page(page: u32) -> Self {
        Self {
            page,
            params: vec![
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ],
        }
    }
}

/// Map of destination name to destination.
pub type NamedDestinations = BTreeMap<String, NamedDestination>;

/// Shift every page reference in an outline tree by `offset` pages.
pub fn shift_outline(nodes: &mut [BookmarkNode], offset: u32) {
    for node in nodes {
        if let Some(page) = node.page.as_mut() {
            *page += offset;
        }
        if let Some(kids) = node.kids.as_mut() {
            shift_outline(kids, offset);
        }
    }
}

/// Shift every named destination by `offset` pages.
pub fn shift_destinations(dests: &mut NamedDestinations, offset: u32) {
    for dest in dests.values_mut() {
        dest.page += offset;
    }
}
