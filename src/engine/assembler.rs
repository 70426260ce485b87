//! Construction of the output document.
//!
//! [`DocumentAssembler`] collects pages from imported source documents and
//! synthesized blank pages, then writes the page tree, outline tree and
//! named-destination name tree in one finalization pass.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

use crate::engine::document::{DocumentHandle, inherited_page_attr};
use crate::error::{PdfError, Result};
use crate::geometry::Rect;
use crate::outline::{BookmarkNode, NamedDestinations};

/// Pages of a source document after its objects were moved into the
/// output object table.
pub struct ImportedSource {
    pages: BTreeMap<u32, ObjectId>,
}

impl ImportedSource {
    /// Number of pages the source contributed.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

/// Accumulates pages and serializes the final document.
pub struct DocumentAssembler {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAssembler {
    /// Start an empty output document.
    pub fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
            pages: Vec::new(),
        }
    }

    /// Move a source document's objects into the output object table.
    ///
    /// The source is renumbered past the current maximum object id, so
    /// its internal references stay intact. Attributes a page inherits
    /// through its `Pages` chain are copied onto the page dictionary
    /// first; reparenting into the output tree severs that chain.
    pub fn import_source(&mut self, handle: DocumentHandle) -> ImportedSource {
        let mut source = handle.into_document();
        for page_id in source.get_pages().into_values() {
            materialize_inherited_attrs(&mut source, page_id);
        }
        source.renumber_objects_with(self.doc.max_id + 1);
        self.doc.max_id = source.max_id;
        let pages = source.get_pages();
        self.doc.objects.extend(source.objects);
        ImportedSource { pages }
    }

    /// Append one page of an imported source to the output page sequence.
    pub fn copy_page(&mut self, source: &ImportedSource, page_number: u32) -> Result<()> {
        let id = source.pages.get(&page_number).copied().ok_or_else(|| {
            PdfError::unreadable(format!("page {page_number} missing from source"))
        })?;
        self.pages.push(id);
        Ok(())
    }

    /// Append a blank page with the given size and rotation.
    pub fn push_blank_page(&mut self, rect: Rect, rotation: i64) {
        let mut page = dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                0.into(),
                0.into(),
                rect.width.into(),
                rect.height.into(),
            ],
        };
        if rotation != 0 {
            page.set("Rotate", rotation);
        }
        let id = self.doc.add_object(page);
        self.pages.push(id);
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Write the page tree, outline and named destinations, then
    /// serialize the document.
    pub fn finalize(
        mut self,
        outline: &[BookmarkNode],
        destinations: &NamedDestinations,
    ) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(PdfError::EmptyResult);
        }

        let pages_id = self.doc.new_object_id();
        for &page_id in &self.pages {
            if let Ok(page) = self.doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
                page.set("Parent", pages_id);
            }
        }
        let kids: Vec<Object> = self.pages.iter().map(|&id| id.into()).collect();
        let count = self.pages.len() as i64;
        self.doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }
            .into(),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if let Some(outlines_id) = write_outline_tree(&mut self.doc, outline, &self.pages) {
            catalog.set("Outlines", outlines_id);
            catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));
        }
        if let Some(names) = destinations_name_tree(destinations, &self.pages) {
            catalog.set("Names", Object::Dictionary(names));
        }
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", catalog_id);

        self.doc.prune_objects();
        self.doc.renumber_objects();
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

const INHERITABLE_PAGE_KEYS: [&[u8]; 3] = [b"Resources", b"MediaBox", b"Rotate"];

/// Copy inheritable attributes missing from the page dictionary down
/// from its `Pages` chain.
fn materialize_inherited_attrs(doc: &mut Document, page_id: ObjectId) {
    for key in INHERITABLE_PAGE_KEYS {
        let present = doc
            .get_object(page_id)
            .ok()
            .and_then(|object| object.as_dict().ok())
            .is_some_and(|dict| dict.has(key));
        if present {
            continue;
        }
        let Some(value) = inherited_page_attr(doc, page_id, key) else {
            continue;
        };
        if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            page.set(key, value);
        }
    }
}

/// Write an outline tree rooted at a fresh `Outlines` dictionary and
/// return its object id, or `None` for an empty tree.
fn write_outline_tree(
    doc: &mut Document,
    nodes: &[BookmarkNode],
    pages: &[ObjectId],
) -> Option<ObjectId> {
    let root_id = doc.new_object_id();
    let (first, last, visible) = write_outline_level(doc, nodes, root_id, pages)?;
    doc.objects.insert(
        root_id,
        dictionary! {
            "Type" => "Outlines",
            "First" => first,
            "Last" => last,
            "Count" => visible,
        }
        .into(),
    );
    Some(root_id)
}

/// Write one level of sibling outline items. Returns the first and last
/// item ids plus the number of entries visible when the level is open,
/// or `None` for an empty level.
fn write_outline_level(
    doc: &mut Document,
    nodes: &[BookmarkNode],
    parent: ObjectId,
    pages: &[ObjectId],
) -> Option<(ObjectId, ObjectId, i64)> {
    let ids: Vec<ObjectId> = nodes.iter().map(|_| doc.new_object_id()).collect();
    let (&first_id, &last_id) = (ids.first()?, ids.last()?);
    let mut visible = nodes.len() as i64;
    for (i, node) in nodes.iter().enumerate() {
        let mut dict = Dictionary::new();
        dict.set("Title", Object::string_literal(node.title.clone()));
        dict.set("Parent", parent);
        if i > 0 {
            dict.set("Prev", ids[i - 1]);
        }
        if i + 1 < ids.len() {
            dict.set("Next", ids[i + 1]);
        }
        if let Some(page) = node.page
            && page >= 1
            && (page as usize) <= pages.len()
        {
            dict.set(
                "Dest",
                vec![
                    pages[(page - 1) as usize].into(),
                    "XYZ".into(),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ],
            );
        }
        if let Some(color) = node.color
            && color != [0.0, 0.0, 0.0]
        {
            dict.set(
                "C",
                vec![color[0].into(), color[1].into(), color[2].into()],
            );
        }
        for (key, value) in &node.extra {
            if key == "Style" {
                let lowered = value.to_lowercase();
                let mut flags = 0i64;
                if lowered.contains("italic") {
                    flags |= 1;
                }
                if lowered.contains("bold") {
                    flags |= 2;
                }
                if flags != 0 {
                    dict.set("F", flags);
                }
            } else {
                dict.set(key.clone(), Object::string_literal(value.clone()));
            }
        }
        if let Some(kids) = node.kids.as_deref()
            && let Some((first, last, child_visible)) =
                write_outline_level(doc, kids, ids[i], pages)
        {
            dict.set("First", first);
            dict.set("Last", last);
            if node.open {
                dict.set("Count", child_visible);
                visible += child_visible;
            } else {
                dict.set("Count", -(kids.len() as i64));
            }
        }
        doc.objects.insert(ids[i], Object::Dictionary(dict));
    }
    Some((first_id, last_id, visible))
}

/// Build the catalog `Names` dictionary for the collected destinations,
/// or `None` when there are none that point at an existing page.
fn destinations_name_tree(
    destinations: &NamedDestinations,
    pages: &[ObjectId],
) -> Option<Dictionary> {
    let mut names: Vec<Object> = Vec::new();
    for (name, dest) in destinations {
        let Some(&page_id) = (dest.page as usize)
            .checked_sub(1)
            .and_then(|index| pages.get(index))
        else {
            continue;
        };
        let mut array = vec![Object::Reference(page_id)];
        array.extend(dest.params.iter().cloned());
        names.push(Object::string_literal(name.clone()));
        names.push(Object::Array(array));
    }
    if names.is_empty() {
        return None;
    }
    let leaf = dictionary! { "Names" => names };
    Some(dictionary! { "Dests" => Object::Dictionary(leaf) })
}
