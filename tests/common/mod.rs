//! Shared builders for synthetic test documents.
#![allow(dead_code)]

use lopdf::{Document, Object, dictionary};

/// Serialize a document to bytes.
pub fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("failed to serialize fixture");
    bytes
}

/// A document with one page per `(width, height)` entry.
pub fn pdf_with_page_sizes(sizes: &[(f32, f32)]) -> Vec<u8> {
    to_bytes(build_document(sizes, &[]))
}

/// A document of `count` A4 pages.
pub fn pdf_with_pages(count: usize) -> Vec<u8> {
    pdf_with_page_sizes(&vec![(595.0, 842.0); count])
}

/// A document of A4 pages with a flat outline of `(title, page)` entries.
pub fn pdf_with_outline(count: usize, outline: &[(&str, u32)]) -> Vec<u8> {
    to_bytes(build_document(&vec![(595.0, 842.0); count], outline))
}

/// A document carrying a named destination for its first page.
pub fn pdf_with_named_destination(count: usize, name: &str) -> Vec<u8> {
    let mut doc = build_document(&vec![(595.0, 842.0); count], &[]);
    let pages = doc.get_pages();
    let dests_id = doc.add_object(dictionary! {
        name => vec![
            pages[&1].into(),
            "XYZ".into(),
            Object::Null,
            Object::Null,
            Object::Null,
        ],
    });
    let root = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .expect("fixture has a catalog");
    doc.get_object_mut(root)
        .and_then(Object::as_dict_mut)
        .expect("fixture catalog is a dictionary")
        .set("Dests", dests_id);
    to_bytes(doc)
}

/// A single-page document whose page inherits its media box and rotation
/// from the `Pages` node instead of carrying them itself.
pub fn pdf_with_inherited_page_attrs(width: f32, height: f32, rotation: i64) -> Vec<u8> {
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
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Rotate" => rotation,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    to_bytes(doc)
}

/// A single-page document whose trailer carries an encryption dictionary.
pub fn encrypted_pdf() -> Vec<u8> {
    let mut doc = build_document(&[(595.0, 842.0)], &[]);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => Object::String(vec![0x41; 32], lopdf::StringFormat::Hexadecimal),
        "U" => Object::String(vec![0x42; 32], lopdf::StringFormat::Hexadecimal),
        "P" => -44,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::String(vec![0x11; 16], lopdf::StringFormat::Hexadecimal),
            Object::String(vec![0x11; 16], lopdf::StringFormat::Hexadecimal),
        ],
    );
    to_bytes(doc)
}

/// True when `needle` occurs in `haystack`.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn build_document(sizes: &[(f32, f32)], outline: &[(&str, u32)]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for &(width, height) in sizes {
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
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
    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if !outline.is_empty() {
        let pages = {
            // Page ids in page order; get_pages needs a catalog, so map
            // the kids directly.
            let mut ids = Vec::new();
            if let Ok(Object::Dictionary(tree)) = doc.get_object(pages_id) {
                if let Ok(kids) = tree.get(b"Kids").and_then(Object::as_array) {
                    for kid in kids {
                        ids.push(kid.as_reference().expect("kid is a reference"));
                    }
                }
            }
            ids
        };
        let outlines_id = doc.new_object_id();
        let item_ids: Vec<_> = outline.iter().map(|_| doc.new_object_id()).collect();
        for (i, (title, page)) in outline.iter().enumerate() {
            let mut item = dictionary! {
                "Title" => Object::string_literal(*title),
                "Parent" => outlines_id,
                "Dest" => vec![
                    pages[(*page - 1) as usize].into(),
                    "XYZ".into(),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ],
            };
            if i > 0 {
                item.set("Prev", item_ids[i - 1]);
            }
            if i + 1 < item_ids.len() {
                item.set("Next", item_ids[i + 1]);
            }
            doc.objects.insert(item_ids[i], item.into());
        }
        doc.objects.insert(
            outlines_id,
            dictionary! {
                "Type" => "Outlines",
                "First" => item_ids[0],
                "Last" => *item_ids.last().unwrap(),
                "Count" => item_ids.len() as i64,
            }
            .into(),
        );
        catalog.set("Outlines", outlines_id);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);
    doc
}
