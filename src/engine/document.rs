//! Read access to a loaded PDF document.
//!
//! [`DocumentHandle`] wraps a parsed `lopdf::Document` and exposes the
//! views the assembly pipeline needs: page metrics with inheritable
//! attributes resolved, encryption detection, and the document's outline
//! and named destinations lifted into the crate's in-memory types.

use std::collections::{BTreeMap, HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{PdfError, Result};
use crate::geometry::Rect;
use crate::outline::{BookmarkNode, NamedDestination, NamedDestinations};

const MAX_REFERENCE_DEPTH: usize = 16;
const MAX_TREE_DEPTH: usize = 64;

/// Follow reference chains until a direct object is reached.
pub(crate) fn resolve<'a>(doc: &'a Document, mut object: &'a Object) -> &'a Object {
    let mut depth = 0;
    while let Object::Reference(id) = object {
        if depth >= MAX_REFERENCE_DEPTH {
            break;
        }
        match doc.get_object(*id) {
            Ok(next) => object = next,
            Err(_) => break,
        }
        depth += 1;
    }
    object
}

fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Look up a page attribute, walking the `Parent` chain for inheritable
/// keys (`MediaBox`, `Rotate`, `Resources`). Returns the raw stored value,
/// which may itself be a reference.
pub(crate) fn inherited_page_attr(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        match dict.get(b"Parent").ok().and_then(|p| p.as_reference().ok()) {
            Some(parent) => current = parent,
            None => return None,
        }
    }
    None
}

/// The page's media box as `[llx, lly, urx, ury]`.
pub(crate) fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4]> {
    let raw = inherited_page_attr(doc, page_id, b"MediaBox")
        .ok_or_else(|| PdfError::unreadable("page has no MediaBox"))?;
    let resolved = resolve(doc, &raw);
    let values = resolved
        .as_array()
        .map_err(|_| PdfError::unreadable("MediaBox is not an array"))?;
    if values.len() != 4 {
        return Err(PdfError::unreadable("MediaBox does not have 4 entries"));
    }
    let mut out = [0.0f32; 4];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = as_number(resolve(doc, value))
            .ok_or_else(|| PdfError::unreadable("MediaBox entry is not a number"))?;
    }
    Ok(out)
}

/// The page's size, origin-normalized.
pub(crate) fn page_rect(doc: &Document, page_id: ObjectId) -> Result<Rect> {
    let [llx, lly, urx, ury] = page_media_box(doc, page_id)?;
    Ok(Rect::new((urx - llx).abs(), (ury - lly).abs()))
}

/// The page's `/Rotate` value normalized to 0, 90, 180 or 270.
pub(crate) fn page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    let rotation = inherited_page_attr(doc, page_id, b"Rotate")
        .and_then(|raw| resolve(doc, &raw).as_i64().ok())
        .unwrap_or(0);
    (rotation.rem_euclid(360) / 90) * 90
}

/// A parsed source document.
#[derive(Debug)]
pub struct DocumentHandle {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl DocumentHandle {
    /// Parse a document from memory.
    ///
    /// # Errors
    ///
    /// [`PdfError::Unreadable`] when the bytes are not a PDF, or
    /// [`PdfError::EncryptedDocument`] when the parser reports an
    /// encryption failure.
    pub fn open(content: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(content).map_err(PdfError::from_load_error)?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already-built document.
    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Whether the document carries an encryption dictionary.
    pub fn is_encrypted(&self) -> bool {
        self.doc.trailer.get(b"Encrypt").is_ok()
    }

    /// PDF version string from the header.
    pub fn version(&self) -> &str {
        &self.doc.version
    }

    /// Object id of a 1-based page number.
    pub(crate) fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        self.pages.get(&page_number).copied().ok_or_else(|| {
            PdfError::unreadable(format!("page {page_number} not found"))
        })
    }

    /// Size of the given page, ignoring rotation.
    pub fn page_rect(&self, page_number: u32) -> Result<Rect> {
        page_rect(&self.doc, self.page_id(page_number)?)
    }

    /// Normalized rotation of the given page.
    pub fn page_rotation(&self, page_number: u32) -> Result<i64> {
        Ok(page_rotation(&self.doc, self.page_id(page_number)?))
    }

    /// Borrow the underlying document.
    pub(crate) fn document(&self) -> &Document {
        &self.doc
    }

    /// Take ownership of the underlying document.
    pub(crate) fn into_document(self) -> Document {
        self.doc
    }

    /// The document's outline tree with page references resolved to
    /// 1-based page numbers. Missing or malformed outlines read as empty.
    pub fn outline(&self) -> Vec<BookmarkNode> {
        let dests = self.named_destinations();
        let page_numbers: HashMap<ObjectId, u32> =
            self.pages.iter().map(|(n, id)| (*id, *n)).collect();
        let Some(first) = self
            .doc
            .catalog()
            .ok()
            .and_then(|catalog| catalog.get(b"Outlines").ok())
            .map(|outlines| resolve(&self.doc, outlines))
            .and_then(|outlines| outlines.as_dict().ok())
            .and_then(|outlines| outlines.get(b"First").ok())
            .and_then(|first| first.as_reference().ok())
        else {
            return Vec::new();
        };
        let mut visited = HashSet::new();
        self.read_outline_chain(first, &page_numbers, &dests, &mut visited, 0)
    }

    fn read_outline_chain(
        &self,
        first: ObjectId,
        page_numbers: &HashMap<ObjectId, u32>,
        dests: &NamedDestinations,
        visited: &mut HashSet<ObjectId>,
        depth: usize,
    ) -> Vec<BookmarkNode> {
        let mut nodes = Vec::new();
        if depth >= MAX_TREE_DEPTH {
            return nodes;
        }
        let mut current = Some(first);
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let Ok(dict) = self.doc.get_object(id).and_then(Object::as_dict) else {
                break;
            };
            let title = match dict.get(b"Title").map(|t| resolve(&self.doc, t)) {
                Ok(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
                _ => String::new(),
            };
            let page = self.outline_item_page(dict, page_numbers, dests);
            let open = dict
                .get(b"Count")
                .ok()
                .and_then(|c| c.as_i64().ok())
                .is_some_and(|c| c > 0);
            let color = dict
                .get(b"C")
                .ok()
                .and_then(|c| resolve(&self.doc, c).as_array().ok())
                .and_then(|values| {
                    if values.len() != 3 {
                        return None;
                    }
                    let mut rgb = [0.0f32; 3];
                    for (slot, value) in rgb.iter_mut().zip(values) {
                        *slot = as_number(resolve(&self.doc, value))?;
                    }
                    Some(rgb)
                });
            let kids = dict
                .get(b"First")
                .ok()
                .and_then(|f| f.as_reference().ok())
                .map(|kid_first| {
                    self.read_outline_chain(kid_first, page_numbers, dests, visited, depth + 1)
                });
            nodes.push(BookmarkNode {
                title,
                page,
                color,
                open,
                kids,
                extra: BTreeMap::new(),
            });
            current = dict.get(b"Next").ok().and_then(|n| n.as_reference().ok());
        }
        nodes
    }

    fn outline_item_page(
        &self,
        item: &Dictionary,
        page_numbers: &HashMap<ObjectId, u32>,
        dests: &NamedDestinations,
    ) -> Option<u32> {
        let dest = if let Ok(dest) = item.get(b"Dest") {
            dest.clone()
        } else {
            let action = resolve(&self.doc, item.get(b"A").ok()?).as_dict().ok()?;
            if let Ok(kind) = action.get(b"S")
                && !matches!(resolve(&self.doc, kind), Object::Name(n) if n == b"GoTo")
            {
                return None;
            }
            action.get(b"D").ok()?.clone()
        };
        self.destination_page(&dest, page_numbers, dests)
    }

    fn destination_page(
        &self,
        dest: &Object,
        page_numbers: &HashMap<ObjectId, u32>,
        dests: &NamedDestinations,
    ) -> Option<u32> {
        match resolve(&self.doc, dest) {
            Object::Array(values) => match values.first()? {
                Object::Reference(page_ref) => page_numbers.get(page_ref).copied(),
                Object::Integer(index) => Some(u32::try_from(*index).ok()? + 1),
                _ => None,
            },
            Object::String(bytes, _) | Object::Name(bytes) => {
                let name = String::from_utf8_lossy(bytes).into_owned();
                dests.get(&name).map(|d| d.page)
            }
            Object::Dictionary(dict) => {
                let inner = dict.get(b"D").ok()?.clone();
                self.destination_page(&inner, page_numbers, dests)
            }
            _ => None,
        }
    }

    /// All named destinations, from both the catalog's `Dests` dictionary
    /// and the `Names` name tree, resolved to 1-based page numbers.
    pub fn named_destinations(&self) -> NamedDestinations {
        let mut out = NamedDestinations::new();
        let page_numbers: HashMap<ObjectId, u32> =
            self.pages.iter().map(|(n, id)| (*id, *n)).collect();
        let Ok(catalog) = self.doc.catalog() else {
            return out;
        };
        if let Ok(dests) = catalog.get(b"Dests")
            && let Ok(dict) = resolve(&self.doc, dests).as_dict()
        {
            for (name, value) in dict.iter() {
                self.collect_destination(name, value, &page_numbers, &mut out);
            }
        }
        if let Ok(names) = catalog.get(b"Names")
            && let Ok(names) = resolve(&self.doc, names).as_dict()
            && let Ok(dests_tree) = names.get(b"Dests")
        {
            self.walk_name_tree(dests_tree, &page_numbers, &mut out, 0);
        }
        out
    }

    fn walk_name_tree(
        &self,
        node: &Object,
        page_numbers: &HashMap<ObjectId, u32>,
        out: &mut NamedDestinations,
        depth: usize,
    ) {
        if depth >= MAX_TREE_DEPTH {
            return;
        }
        let Ok(dict) = resolve(&self.doc, node).as_dict() else {
            return;
        };
        if let Ok(names) = dict.get(b"Names")
            && let Ok(pairs) = resolve(&self.doc, names).as_array()
        {
            for pair in pairs.chunks_exact(2) {
                if let Object::String(name, _) = resolve(&self.doc, &pair[0]) {
                    self.collect_destination(name, &pair[1], page_numbers, out);
                }
            }
        }
        if let Ok(kids) = dict.get(b"Kids")
            && let Ok(kids) = resolve(&self.doc, kids).as_array()
        {
            for kid in kids {
                self.walk_name_tree(kid, page_numbers, out, depth + 1);
            }
        }
    }

    fn collect_destination(
        &self,
        name: &[u8],
        value: &Object,
        page_numbers: &HashMap<ObjectId, u32>,
        out: &mut NamedDestinations,
    ) {
        let resolved = resolve(&self.doc, value);
        let array = match resolved {
            Object::Array(values) => values.clone(),
            Object::Dictionary(dict) => match dict.get(b"D").map(|d| resolve(&self.doc, d)) {
                Ok(Object::Array(values)) => values.clone(),
                _ => return,
            },
            _ => return,
        };
        let Some(page) = (match array.first() {
            Some(Object::Reference(page_ref)) => page_numbers.get(page_ref).copied(),
            Some(Object::Integer(index)) => u32::try_from(*index).ok().map(|i| i + 1),
            _ => None,
        }) else {
            return;
        };
        out.insert(
            String::from_utf8_lossy(name).into_owned(),
            NamedDestination {
                page,
                params: array[1..].to_vec(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn document_with_pages(sizes: &[(f32, f32)]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for &(w, h) in sizes {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn page_count_and_rect() {
        let handle = DocumentHandle::from_document(document_with_pages(&[
            (595.0, 842.0),
            (612.0, 792.0),
        ]));
        assert_eq!(handle.page_count(), 2);
        assert_eq!(handle.page_rect(1).unwrap(), Rect::new(595.0, 842.0));
        assert_eq!(handle.page_rect(2).unwrap(), Rect::new(612.0, 792.0));
    }

    #[test]
    fn media_box_is_inherited_from_pages_node() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 420.into(), 595.into()],
                "Rotate" => 90,
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let handle = DocumentHandle::from_document(doc);
        assert_eq!(handle.page_rect(1).unwrap(), Rect::new(420.0, 595.0));
        assert_eq!(handle.page_rotation(1).unwrap(), 90);
    }

    #[test]
    fn rotation_is_normalized() {
        let mut doc = document_with_pages(&[(595.0, 842.0)]);
        let page_id = doc.get_pages()[&1];
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Rotate", 450);
        let handle = DocumentHandle::from_document(doc);
        assert_eq!(handle.page_rotation(1).unwrap(), 90);
    }

    #[test]
    fn encrypt_entry_in_trailer_is_detected() {
        let mut doc = document_with_pages(&[(595.0, 842.0)]);
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        let handle = DocumentHandle::from_document(doc);
        assert!(handle.is_encrypted());
    }

    #[test]
    fn plain_document_is_not_encrypted() {
        let handle = DocumentHandle::from_document(document_with_pages(&[(595.0, 842.0)]));
        assert!(!handle.is_encrypted());
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        let err = DocumentHandle::open(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Unreadable(_) | PdfError::EncryptedDocument));
    }

    #[test]
    fn outline_reads_titles_and_pages() {
        let mut doc = document_with_pages(&[(595.0, 842.0), (595.0, 842.0)]);
        let pages = doc.get_pages();
        let outlines_id = doc.new_object_id();
        let first_id = doc.new_object_id();
        let second_id = doc.new_object_id();
        doc.objects.insert(
            first_id,
            dictionary! {
                "Title" => Object::string_literal("One"),
                "Parent" => outlines_id,
                "Next" => second_id,
                "Dest" => vec![
                    pages[&1].into(),
                    "XYZ".into(),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ],
            }
            .into(),
        );
        doc.objects.insert(
            second_id,
            dictionary! {
                "Title" => Object::string_literal("Two"),
                "Parent" => outlines_id,
                "Prev" => first_id,
                "Dest" => vec![
                    pages[&2].into(),
                    "XYZ".into(),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ],
            }
            .into(),
        );
        doc.objects.insert(
            outlines_id,
            dictionary! {
                "Type" => "Outlines",
                "First" => first_id,
                "Last" => second_id,
                "Count" => 2,
            }
            .into(),
        );
        let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_object_mut(root)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Outlines", outlines_id);

        let handle = DocumentHandle::from_document(doc);
        let outline = handle.outline();
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].title, "One");
        assert_eq!(outline[0].page, Some(1));
        assert_eq!(outline[1].title, "Two");
        assert_eq!(outline[1].page, Some(2));
    }

    #[test]
    fn named_destinations_from_dests_dictionary() {
        let mut doc = document_with_pages(&[(595.0, 842.0), (595.0, 842.0)]);
        let pages = doc.get_pages();
        let dests_id = doc.add_object(dictionary! {
            "intro" => vec![
                pages[&2].into(),
                "XYZ".into(),
                Object::Null,
                Object::Null,
                Object::Null,
            ],
        });
        let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_object_mut(root)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Dests", dests_id);

        let handle = DocumentHandle::from_document(doc);
        let dests = handle.named_destinations();
        assert_eq!(dests.len(), 1);
        assert_eq!(dests["intro"].page, 2);
    }
}
