//! Text metrics and content-stream generation for stamped text.
//!
//! Only the standard 14 Type1 fonts are used, so no font programs are
//! embedded; widths come from the Helvetica AFM table (Courier is fixed
//! pitch). Text is written with WinAnsi encoding.

use lopdf::content::Operation;
use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

use crate::engine::document::{inherited_page_attr, resolve};
use crate::error::{PdfError, Result};
use crate::geometry::Rect;

/// Fraction of the font size above the baseline covered by glyphs.
pub(crate) const ASCENT: f32 = 0.718;
/// Fraction of the font size below the baseline covered by glyphs.
pub(crate) const DESCENT: f32 = -0.207;

/// Helvetica AFM widths for ASCII 32..=126, in 1/1000 of the font size.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

const FALLBACK_WIDTH: u16 = 556;
const COURIER_WIDTH: u16 = 600;

/// Map a caller-supplied font name onto one of the standard 14 base fonts.
pub(crate) fn base_font(name: &str) -> &'static str {
    let lowered = name.to_lowercase();
    if lowered.contains("courier") {
        "Courier"
    } else if lowered.contains("times") {
        "Times-Roman"
    } else {
        "Helvetica"
    }
}

/// Width of `text` rendered in the given font at `font_size`, in points.
pub fn text_width(text: &str, font_name: &str, font_size: f32) -> f32 {
    let fixed_pitch = base_font(font_name) == "Courier";
    let millis: u32 = text
        .chars()
        .map(|c| {
            if fixed_pitch {
                u32::from(COURIER_WIDTH)
            } else {
                let code = c as u32;
                if (0x20..=0x7E).contains(&code) {
                    u32::from(HELVETICA_WIDTHS[(code - 0x20) as usize])
                } else {
                    u32::from(FALLBACK_WIDTH)
                }
            }
        })
        .sum();
    millis as f32 * font_size / 1000.0
}

/// Encode text for a WinAnsi-encoded string operand. Characters outside
/// Latin-1 degrade to `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF { code as u8 } else { b'?' }
        })
        .collect()
}

/// Matrix mapping display coordinates to media coordinates for a rotated
/// page, or `None` for unrotated pages. `media` is the unrotated page size.
pub(crate) fn rotation_matrix(rotation: i64, media: Rect) -> Option<[f32; 6]> {
    match rotation {
        90 => Some([0.0, 1.0, -1.0, 0.0, media.width, 0.0]),
        180 => Some([-1.0, 0.0, 0.0, -1.0, media.width, media.height]),
        270 => Some([0.0, -1.0, 1.0, 0.0, 0.0, media.height]),
        _ => None,
    }
}

/// Operations drawing a white box with black text at `(x, y)` (baseline
/// origin), optionally under a rotation matrix.
pub(crate) fn overlay_operations(
    text: &str,
    x: f32,
    y: f32,
    box_width: f32,
    font_size: f32,
    font_resource: &str,
    rotation: Option<[f32; 6]>,
) -> Vec<Operation> {
    let mut ops = vec![Operation::new("q", vec![])];
    if let Some(m) = rotation {
        ops.push(Operation::new(
            "cm",
            m.iter().map(|&v| v.into()).collect(),
        ));
    }
    ops.push(Operation::new(
        "rg",
        vec![1.0.into(), 1.0.into(), 1.0.into()],
    ));
    ops.push(Operation::new(
        "re",
        vec![
            x.into(),
            (y + DESCENT * font_size).into(),
            box_width.into(),
            ((ASCENT - DESCENT) * font_size).into(),
        ],
    ));
    ops.push(Operation::new("f", vec![]));
    ops.push(Operation::new(
        "rg",
        vec![0.0.into(), 0.0.into(), 0.0.into()],
    ));
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font_resource.as_bytes().to_vec()), font_size.into()],
    ));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(
            encode_win_ansi(text),
            lopdf::StringFormat::Literal,
        )],
    ));
    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Add a non-embedded standard font object to the document.
pub(crate) fn add_standard_font(doc: &mut Document, font_name: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font(font_name),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Make `font_id` reachable from the page under `resource_name`.
///
/// Inherited resources are materialized on the page first, so sibling
/// pages sharing a resources dictionary are not affected.
pub(crate) fn register_page_font(
    doc: &mut Document,
    page_id: ObjectId,
    resource_name: &str,
    font_id: ObjectId,
) -> Result<()> {
    enum ResourcesSlot {
        OnPage,
        Indirect(ObjectId),
    }

    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|_| PdfError::unreadable("page object is not a dictionary"))?;
    let slot = match page.get(b"Resources") {
        Ok(Object::Reference(id)) => ResourcesSlot::Indirect(*id),
        Ok(_) => ResourcesSlot::OnPage,
        Err(_) => {
            let inherited = inherited_page_attr(doc, page_id, b"Resources")
                .map(|raw| resolve(doc, &raw).clone())
                .and_then(|resolved| resolved.as_dict().ok().cloned())
                .unwrap_or_else(Dictionary::new);
            let page = doc
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|_| PdfError::unreadable("page object is not a dictionary"))?;
            page.set("Resources", Object::Dictionary(inherited));
            ResourcesSlot::OnPage
        }
    };

    let font_slot = {
        let resources = match &slot {
            ResourcesSlot::OnPage => doc
                .get_object(page_id)
                .and_then(Object::as_dict)
                .and_then(|page| page.get(b"Resources"))
                .and_then(Object::as_dict)
                .map_err(|_| PdfError::unreadable("page resources are malformed"))?,
            ResourcesSlot::Indirect(id) => doc
                .get_object(*id)
                .and_then(Object::as_dict)
                .map_err(|_| PdfError::unreadable("page resources are malformed"))?,
        };
        match resources.get(b"Font") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    };

    if let Some(font_dict_id) = font_slot {
        let fonts = doc
            .get_object_mut(font_dict_id)
            .and_then(Object::as_dict_mut)
            .map_err(|_| PdfError::unreadable("page font dictionary is malformed"))?;
        fonts.set(resource_name, font_id);
        return Ok(());
    }

    let resources = match slot {
        ResourcesSlot::OnPage => doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .and_then(|page| page.get_mut(b"Resources"))
            .and_then(Object::as_dict_mut)
            .map_err(|_| PdfError::unreadable("page resources are malformed"))?,
        ResourcesSlot::Indirect(id) => doc
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|_| PdfError::unreadable("page resources are malformed"))?,
    };
    if resources.get(b"Font").and_then(Object::as_dict).is_err() {
        resources.set("Font", Object::Dictionary(Dictionary::new()));
    }
    resources
        .get_mut(b"Font")
        .and_then(Object::as_dict_mut)
        .map_err(|_| PdfError::unreadable("page font dictionary is malformed"))?
        .set(resource_name, font_id);
    Ok(())
}

/// Append a content stream to the page's `Contents`, preserving whatever
/// is already there.
pub(crate) fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    stream_id: ObjectId,
) -> Result<()> {
    enum ContentsKind {
        Missing,
        Single(ObjectId),
        Array,
        Inline,
    }

    let kind = {
        let page = doc
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|_| PdfError::unreadable("page object is not a dictionary"))?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => ContentsKind::Single(*id),
            Ok(Object::Array(_)) => ContentsKind::Array,
            Ok(Object::Stream(_)) => ContentsKind::Inline,
            _ => ContentsKind::Missing,
        }
    };

    // Inline content streams are hoisted into the object table so the
    // page can hold an array of references.
    if let ContentsKind::Inline = kind {
        let inline = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|_| PdfError::unreadable("page object is not a dictionary"))?
            .remove(b"Contents");
        if let Some(stream) = inline {
            let hoisted = doc.add_object(stream);
            let page = doc
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|_| PdfError::unreadable("page object is not a dictionary"))?;
            page.set(
                "Contents",
                vec![Object::Reference(hoisted), Object::Reference(stream_id)],
            );
        }
        return Ok(());
    }

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| PdfError::unreadable("page object is not a dictionary"))?;
    match kind {
        ContentsKind::Array => {
            if let Ok(array) = page.get_mut(b"Contents").and_then(Object::as_array_mut) {
                array.push(Object::Reference(stream_id));
            }
        }
        ContentsKind::Single(existing) => {
            page.set(
                "Contents",
                vec![Object::Reference(existing), Object::Reference(stream_id)],
            );
        }
        ContentsKind::Missing => {
            page.set("Contents", Object::Reference(stream_id));
        }
        ContentsKind::Inline => unreachable!("handled above"),
    }
    Ok(())
}
