//! Stamping overlays onto existing documents.
//!
//! An overlay is a white box with black text, appended to the page content
//! as a separate stream so the original content is untouched. Placement
//! works in the page's display coordinates; a rotation matrix maps the
//! box back onto rotated pages.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Stream};

use crate::engine::document::{page_media_box, page_rotation};
use crate::engine::text::{
    add_standard_font, append_page_content, overlay_operations, register_page_font,
    rotation_matrix, text_width,
};
use crate::error::{PdfError, Result};
use crate::geometry::Rect;
use crate::overlay::placement::{HorizontalPlacement, VerticalPlacement, overlay_position};

/// Font name the overlay font is registered under in page resources.
const FONT_RESOURCE: &str = "FovL";

/// Overlay appearance and placement.
#[derive(Debug, Clone)]
pub struct OverlayOptions {
    /// Vertical anchor.
    pub vertical: VerticalPlacement,
    /// Horizontal anchor.
    pub horizontal: HorizontalPlacement,
    /// Font name; mapped onto a standard base font.
    pub font_name: String,
    /// Font size in points.
    pub font_size: f32,
    /// Distance from the page edges in points.
    pub margin: f32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            vertical: VerticalPlacement::Bottom,
            horizontal: HorizontalPlacement::Center,
            font_name: "Helvetica".to_string(),
            font_size: 10.0,
            margin: 20.0,
        }
    }
}

/// Text of the page number for one page, or `None` for skipped pages.
///
/// `page_index` is zero-based. With a `total_page_count` the text reads
/// `"{number} / {last}"`, where `last` is the number the final page would
/// receive.
pub fn page_number_text(
    page_index: usize,
    pages_to_skip: u32,
    first_page_number: u32,
    total_page_count: Option<u32>,
) -> Option<String> {
    let index = page_index as i64;
    let skip = i64::from(pages_to_skip);
    let first = i64::from(first_page_number);
    if index < skip {
        return None;
    }
    let number = index - skip + first;
    Some(match total_page_count {
        Some(total) => {
            let last = i64::from(total) - skip + first - 1;
            format!("{number} / {last}")
        }
        None => number.to_string(),
    })
}

/// Applies overlays to every page of a document.
#[derive(Debug, Default)]
pub struct Stamper;

impl Stamper {
    /// Create a stamper.
    pub fn new() -> Self {
        Self
    }

    /// Stamp each page with the text returned by `page_text` for its
    /// zero-based index. Pages with no text, or empty text, stay as they
    /// are.
    ///
    /// # Errors
    ///
    /// [`PdfError::EncryptedDocument`] for encrypted inputs and
    /// [`PdfError::Unreadable`] for bytes that do not parse.
    pub fn stamp<F>(&self, pdf: &[u8], options: &OverlayOptions, page_text: F) -> Result<Vec<u8>>
    where
        F: Fn(usize) -> Option<String>,
    {
        let mut doc = Document::load_mem(pdf).map_err(PdfError::from_load_error)?;
        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(PdfError::EncryptedDocument);
        }

        let pages: Vec<_> = doc.get_pages().into_iter().collect();
        let font_id = add_standard_font(&mut doc, &options.font_name);

        for (page_number, page_id) in pages {
            let Some(text) = page_text((page_number - 1) as usize) else {
                continue;
            };
            if text.is_empty() {
                continue;
            }

            let [llx, lly, urx, ury] = page_media_box(&doc, page_id)?;
            let media = Rect::new((urx - llx).abs(), (ury - lly).abs());
            let rotation = page_rotation(&doc, page_id);
            let display = if rotation == 90 || rotation == 270 {
                media.rotated()
            } else {
                media
            };

            let width = text_width(&text, &options.font_name, options.font_size);
            let (x, y) = overlay_position(
                options.vertical,
                options.horizontal,
                options.margin,
                display,
                width,
            );
            let operations = overlay_operations(
                &text,
                x,
                y,
                width,
                options.font_size,
                FONT_RESOURCE,
                rotation_matrix(rotation, media),
            );
            let encoded = Content { operations }.encode()?;
            let stream_id = doc.add_object(Stream::new(Dictionary::new(), encoded));
            append_page_content(&mut doc, page_id, stream_id)?;
            register_page_font(&mut doc, page_id, FONT_RESOURCE, font_id)?;
        }

        doc.compress();
        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }

    /// Stamp the same text onto every page.
    pub fn add_overlay(
        &self,
        pdf: &[u8],
        text: &str,
        options: &OverlayOptions,
    ) -> Result<Vec<u8>> {
        let text = text.to_string();
        self.stamp(pdf, options, |_| Some(text.clone()))
    }

    /// Number the pages at the bottom center.
    ///
    /// Pages before `pages_to_skip` receive no number; the first numbered
    /// page gets `first_page_number`. With `total_page_count` the stamp
    /// includes the final page's number, like `"17 / 35"`.
    pub fn add_page_numbers(
        &self,
        pdf: &[u8],
        pages_to_skip: u32,
        first_page_number: u32,
        total_page_count: Option<u32>,
        options: &OverlayOptions,
    ) -> Result<Vec<u8>> {
        self.stamp(pdf, options, |index| {
            page_number_text(index, pages_to_skip, first_page_number, total_page_count)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_skips_and_counts() {
        // 5 pages, skip 1, first number 1, total 5.
        let texts: Vec<Option<String>> = (0..5)
            .map(|i| page_number_text(i, 1, 1, Some(5)))
            .collect();
        assert_eq!(texts[0], None);
        assert_eq!(texts[1].as_deref(), Some("1 / 4"));
        assert_eq!(texts[2].as_deref(), Some("2 / 4"));
        assert_eq!(texts[3].as_deref(), Some("3 / 4"));
        assert_eq!(texts[4].as_deref(), Some("4 / 4"));
    }

    #[test]
    fn numbering_without_total_is_bare() {
        assert_eq!(page_number_text(0, 0, 1, None).as_deref(), Some("1"));
        assert_eq!(page_number_text(3, 0, 7, None).as_deref(), Some("10"));
    }

    #[test]
    fn garbage_input_is_rejected() {
        let err = Stamper::new()
            .add_overlay(b"nope", "DRAFT", &OverlayOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PdfError::Unreadable(_) | PdfError::EncryptedDocument
        ));
    }
}
