//! The merge pipeline.
//!
//! Sources are opened in order; pages are copied into a single object
//! table while outline contributions and named destinations are collected
//! with their page numbers shifted to the merged document. Blank pages
//! are inserted where a source asks to start on an odd page.

use crate::engine::{DocumentAssembler, DocumentHandle};
use crate::error::{PdfError, Result};
use crate::geometry::Rect;
use crate::merge::bookmarks::assemble_outline;
use crate::merge::source::{MergedDocumentInfo, SourceDocument};
use crate::outline::{NamedDestinations, shift_destinations, shift_outline};

/// Result of a merge.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// The merged PDF.
    pub content: Vec<u8>,
    /// Total pages, including inserted blank pages.
    pub page_count: u32,
}

/// Merges source documents into one PDF.
///
/// # Examples
///
/// ```no_run
/// use pdfbind::{Merger, OutlineMode, SourceDocument};
///
/// # fn example(report: Vec<u8>, appendix: Vec<u8>) -> pdfbind::Result<()> {
/// let mut first = SourceDocument::new(report, "Report");
/// first.outline_mode = OutlineMode::WholeHierarchy;
/// let second = SourceDocument::new(appendix, "Appendix");
///
/// let output = Merger::new().merge(&[first, second])?;
/// println!("merged into {} pages", output.page_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Merger;

impl Merger {
    /// Create a merger.
    pub fn new() -> Self {
        Self
    }

    /// Merge the sources in order.
    ///
    /// # Errors
    ///
    /// * [`PdfError::InvalidInput`] when `sources` is empty.
    /// * [`PdfError::EmptyResult`] when no source has content or the
    ///   result would have no pages.
    /// * [`PdfError::EncryptedDocument`] when any source is encrypted;
    ///   nothing is produced in that case.
    /// * [`PdfError::Unreadable`] when a source cannot be parsed.
    pub fn merge(&self, sources: &[SourceDocument]) -> Result<MergeOutput> {
        self.merge_with(sources, |content| Ok(content.to_vec()))
    }

    /// Merge with a per-source content transform applied before merging.
    ///
    /// The transform sees each non-empty source's bytes; the single-source
    /// fast path returns the transformed bytes directly.
    pub fn merge_with<F>(&self, sources: &[SourceDocument], transform: F) -> Result<MergeOutput>
    where
        F: Fn(&[u8]) -> Result<Vec<u8>>,
    {
        if sources.is_empty() {
            return Err(PdfError::invalid_input("no source documents given"));
        }

        let mut prepared: Vec<SourceDocument> = Vec::with_capacity(sources.len());
        for source in sources {
            if source.content.is_empty() {
                continue;
            }
            let mut source = source.clone();
            source.content = transform(&source.content)?;
            prepared.push(source);
        }

        match prepared.len() {
            0 => Err(PdfError::EmptyResult),
            1 => Self::single_source(prepared.remove(0)),
            _ => Self::merge_prepared(prepared),
        }
    }

    /// Fast path: a lone source is passed through untouched.
    fn single_source(source: SourceDocument) -> Result<MergeOutput> {
        let page_count = DocumentHandle::open(&source.content)?.page_count();
        if page_count == 0 {
            return Err(PdfError::EmptyResult);
        }
        Ok(MergeOutput {
            content: source.content,
            page_count,
        })
    }

    fn merge_prepared(sources: Vec<SourceDocument>) -> Result<MergeOutput> {
        let mut assembler = DocumentAssembler::new();
        let mut infos: Vec<MergedDocumentInfo> = Vec::with_capacity(sources.len());
        let mut destinations = NamedDestinations::new();
        let mut page_offset: u32 = 0;
        // Size and rotation of the most recent non-empty source's last
        // page; blank separator pages copy it.
        let mut previous_last_page: Option<(Rect, i64)> = None;

        for source in sources {
            let handle = DocumentHandle::open(&source.content)?;
            if handle.is_encrypted() {
                return Err(PdfError::EncryptedDocument);
            }
            let page_count = handle.page_count();
            let mut outline = handle.outline();
            let mut dests = handle.named_destinations();

            if source.start_on_odd_page
                && page_count > 0
                && assembler.page_count() % 2 == 1
                && let Some((rect, rotation)) = previous_last_page
            {
                assembler.push_blank_page(rect, rotation);
                page_offset += 1;
            }
            let start_page = page_offset + 1;

            if page_count > 0 {
                previous_last_page = Some((
                    handle.page_rect(page_count)?,
                    handle.page_rotation(page_count)?,
                ));
            }

            shift_outline(&mut outline, page_offset);
            shift_destinations(&mut dests, page_offset);
            for (name, dest) in dests {
                destinations.entry(name).or_insert(dest);
            }

            let imported = assembler.import_source(handle);
            for page_number in 1..=page_count {
                assembler.copy_page(&imported, page_number)?;
            }
            page_offset += page_count;

            infos.push(MergedDocumentInfo {
                title: source.title,
                start_page,
                outline,
                outline_mode: source.outline_mode,
                bookmark_styles: source.bookmark_styles,
            });
        }

        let page_count = assembler.page_count();
        if page_count == 0 {
            return Err(PdfError::EmptyResult);
        }
        let outline = assemble_outline(infos);
        let content = assembler.finalize(&outline, &destinations)?;
        Ok(MergeOutput {
            content,
            page_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::source::OutlineMode;
    use lopdf::{Document, dictionary};

    fn pdf_with_pages(count: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for _ in 0..count {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count as i64,
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn merged_page_count_is_the_sum() {
        let sources = vec![
            SourceDocument::new(pdf_with_pages(2), "A"),
            SourceDocument::new(pdf_with_pages(3), "B"),
        ];
        let output = Merger::new().merge(&sources).unwrap();
        assert_eq!(output.page_count, 5);
        let merged = Document::load_mem(&output.content).unwrap();
        assert_eq!(merged.get_pages().len(), 5);
    }

    #[test]
    fn single_source_is_returned_verbatim() {
        let bytes = pdf_with_pages(2);
        let mut source = SourceDocument::new(bytes.clone(), "Only");
        source.start_on_odd_page = true;
        let output = Merger::new().merge(&[source]).unwrap();
        assert_eq!(output.content, bytes);
        assert_eq!(output.page_count, 2);
    }

    #[test]
    fn empty_sources_are_skipped_before_the_fast_path() {
        let bytes = pdf_with_pages(1);
        let sources = vec![
            SourceDocument::new(Vec::new(), "Empty"),
            SourceDocument::new(bytes.clone(), "Only"),
        ];
        let output = Merger::new().merge(&sources).unwrap();
        assert_eq!(output.content, bytes);
    }

    #[test]
    fn no_sources_is_invalid_input() {
        let err = Merger::new().merge(&[]).unwrap_err();
        assert!(matches!(err, PdfError::InvalidInput(_)));
    }

    #[test]
    fn all_empty_sources_is_an_empty_result() {
        let sources = vec![
            SourceDocument::new(Vec::new(), "A"),
            SourceDocument::new(Vec::new(), "B"),
        ];
        let err = Merger::new().merge(&sources).unwrap_err();
        assert!(matches!(err, PdfError::EmptyResult));
    }

    #[test]
    fn transform_is_applied_per_source() {
        let sources = vec![
            SourceDocument::new(pdf_with_pages(1), "A"),
            SourceDocument::new(pdf_with_pages(1), "B"),
        ];
        let seen = std::cell::Cell::new(0u32);
        let output = Merger::new()
            .merge_with(&sources, |content| {
                seen.set(seen.get() + 1);
                Ok(content.to_vec())
            })
            .unwrap();
        assert_eq!(seen.get(), 2);
        assert_eq!(output.page_count, 2);
    }

    #[test]
    fn transform_failure_aborts_the_merge() {
        let sources = vec![SourceDocument::new(pdf_with_pages(1), "A")];
        let err = Merger::new()
            .merge_with(&sources, |_| Err(PdfError::unreadable("bad")))
            .unwrap_err();
        assert!(matches!(err, PdfError::Unreadable(_)));
    }

    #[test]
    fn unreadable_source_fails_the_merge() {
        let sources = vec![
            SourceDocument::new(pdf_with_pages(1), "A"),
            SourceDocument::new(b"not a pdf".to_vec(), "B"),
        ];
        let err = Merger::new().merge(&sources).unwrap_err();
        assert!(matches!(
            err,
            PdfError::Unreadable(_) | PdfError::EncryptedDocument
        ));
    }

    #[test]
    fn outline_modes_drive_the_merged_outline() {
        let mut first = SourceDocument::new(pdf_with_pages(1), "First");
        first.outline_mode = OutlineMode::ThisOnly;
        let mut second = SourceDocument::new(pdf_with_pages(1), "Second");
        second.outline_mode = OutlineMode::None;
        let mut third = SourceDocument::new(pdf_with_pages(1), "Third");
        third.outline_mode = OutlineMode::WholeHierarchy;

        let output = Merger::new().merge(&[first, second, third]).unwrap();
        let handle = DocumentHandle::open(&output.content).unwrap();
        let outline = handle.outline();
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].title, "First");
        assert_eq!(outline[0].page, Some(1));
        assert_eq!(outline[1].title, "Third");
        assert_eq!(outline[1].page, Some(3));
    }
}
