//! Whole-page transformations: re-laying content onto a new page size and
//! generating simple text-only documents.
//!
//! Resizing wraps each source page in a Form XObject, scales it to fit
//! inside the target page's margins and centers it. Page rotation is
//! baked into the placement, so output pages carry no `/Rotate`.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::engine::document::{inherited_page_attr, page_media_box, page_rotation};
use crate::engine::text::{ASCENT, DESCENT, add_standard_font, text_width};
use crate::error::{PdfError, Result};
use crate::geometry::Rect;

const FORM_RESOURCE: &str = "Fm0";
const TEXT_FONT_RESOURCE: &str = "F1";

struct PagePlan {
    content: Vec<u8>,
    bbox: [f32; 4],
    rotation: i64,
    resources: Option<Object>,
}

/// Re-lay every page of `pdf` onto pages of `target` size, keeping
/// `margin` points free on every side.
///
/// # Errors
///
/// [`PdfError::EmptyResult`] when the document has no pages, plus the
/// usual load errors for unreadable or encrypted inputs.
pub fn resize_document(pdf: &[u8], target: Rect, margin: f32) -> Result<Vec<u8>> {
    if target.width <= 0.0 || target.height <= 0.0 {
        return Err(PdfError::invalid_input("target page size must be positive"));
    }
    let mut src = Document::load_mem(pdf).map_err(PdfError::from_load_error)?;
    if src.trailer.get(b"Encrypt").is_ok() {
        return Err(PdfError::EncryptedDocument);
    }
    src.renumber_objects();
    let src_pages = src.get_pages();
    if src_pages.is_empty() {
        return Err(PdfError::EmptyResult);
    }

    let mut plans = Vec::with_capacity(src_pages.len());
    for (_, page_id) in &src_pages {
        plans.push(PagePlan {
            content: src.get_page_content(*page_id)?,
            bbox: page_media_box(&src, *page_id)?,
            rotation: page_rotation(&src, *page_id),
            resources: inherited_page_attr(&src, *page_id, b"Resources"),
        });
    }

    let mut out = Document::with_version("1.5");
    out.objects.extend(src.objects);
    out.max_id = src.max_id;

    let pages_id = out.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(plans.len());
    for plan in plans {
        let [llx, lly, urx, ury] = plan.bbox;
        let mut form = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![llx.into(), lly.into(), urx.into(), ury.into()],
        };
        if llx != 0.0 || lly != 0.0 {
            form.set(
                "Matrix",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    (-llx).into(),
                    (-lly).into(),
                ],
            );
        }
        if let Some(resources) = plan.resources {
            form.set("Resources", resources);
        }
        let form_id = out.add_object(Stream::new(form, plan.content));

        let source = Rect::new((urx - llx).abs(), (ury - lly).abs());
        let matrix = placement_matrix(source, plan.rotation, target, margin);
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new("cm", matrix.iter().map(|&v| v.into()).collect()),
            Operation::new(
                "Do",
                vec![Object::Name(FORM_RESOURCE.as_bytes().to_vec())],
            ),
            Operation::new("Q", vec![]),
        ];
        let encoded = Content { operations }.encode()?;
        let content_id = out.add_object(Stream::new(dictionary! {}, encoded));

        let xobjects = dictionary! { FORM_RESOURCE => form_id };
        let page_id = out.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                target.width.into(),
                target.height.into(),
            ],
            "Resources" => dictionary! { "XObject" => xobjects },
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    out.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }
        .into(),
    );
    let catalog_id = out.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    out.trailer.set("Root", catalog_id);

    out.prune_objects();
    out.renumber_objects();
    out.compress();
    let mut bytes = Vec::new();
    out.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Matrix placing a source page (normalized size `source`, with the given
/// `/Rotate`) centered and scaled to fit on `target` inside `margin`.
fn placement_matrix(source: Rect, rotation: i64, target: Rect, margin: f32) -> [f32; 6] {
    // /Rotate turns the page clockwise at display time; baking it in
    // means rotating the content counterclockwise by the complement.
    let baked = (360 - rotation).rem_euclid(360);
    let display = if rotation == 90 || rotation == 270 {
        source.rotated()
    } else {
        source
    };
    // Quarter turn when source and target orientation disagree.
    let extra = if display.is_landscape() && !target.is_landscape() {
        270
    } else if !display.is_landscape() && target.is_landscape() {
        90
    } else {
        0
    };
    let total = (baked + extra) % 360;

    let (fw, fh) = match total {
        90 | 270 => (source.height, source.width),
        _ => (source.width, source.height),
    };
    let avail_w = (target.width - 2.0 * margin).max(1.0);
    let avail_h = (target.height - 2.0 * margin).max(1.0);
    let scale = (avail_w / fw).min(avail_h / fh);
    let ox = (target.width - scale * fw) / 2.0;
    let oy = (target.height - scale * fh) / 2.0;

    let (w, h) = (source.width, source.height);
    match total {
        90 => [0.0, scale, -scale, 0.0, ox + scale * h, oy],
        180 => [-scale, 0.0, 0.0, -scale, ox + scale * w, oy + scale * h],
        270 => [0.0, -scale, scale, 0.0, ox, oy + scale * w],
        _ => [scale, 0.0, 0.0, scale, ox, oy],
    }
}

/// Create a single-page document with the given lines centered on the
/// page, both horizontally and vertically.
pub fn centered_text_document(
    lines: &[String],
    font_name: &str,
    font_size: f32,
    page: Rect,
) -> Result<Vec<u8>> {
    if lines.is_empty() {
        return Err(PdfError::invalid_input("no text lines given"));
    }
    if font_name.trim().is_empty() {
        return Err(PdfError::invalid_input("font name must not be empty"));
    }
    if font_size <= 0.0 {
        return Err(PdfError::invalid_input("font size must be positive"));
    }

    let mut doc = Document::with_version("1.5");
    let font_id = add_standard_font(&mut doc, font_name);

    let leading = font_size * 1.5;
    let count = lines.len() as f32;
    let mut operations = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let width = text_width(line, font_name, font_size);
        let x = (page.width - width) / 2.0;
        // Center the block: distribute baselines around the page middle,
        // shifted so the glyph block itself is centered.
        let y = page.height / 2.0 + ((count - 1.0) / 2.0 - i as f32) * leading
            - (ASCENT + DESCENT) * font_size / 2.0;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(TEXT_FONT_RESOURCE.as_bytes().to_vec()),
                font_size.into(),
            ],
        ));
        operations.push(Operation::new("Td", vec![x.into(), y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(
                crate::engine::text::encode_win_ansi(line),
                lopdf::StringFormat::Literal,
            )],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    let encoded = Content { operations }.encode()?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let pages_id = doc.new_object_id();
    let fonts = dictionary! { TEXT_FONT_RESOURCE => font_id };
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            page.width.into(),
            page.height.into(),
        ],
        "Resources" => dictionary! { "Font" => fonts },
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
