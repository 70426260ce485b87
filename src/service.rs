//! Async facade over the assembly engine.
//!
//! Engine calls are CPU-bound lopdf work, so they run on the blocking
//! thread pool. An optional deadline applies per call; when it elapses the
//! call resolves to [`PdfError::Timeout`] and the result is discarded.

use std::time::Duration;

use serde::Serialize;
use tokio::task;

use crate::error::{PdfError, Result};
use crate::geometry::PageSize;
use crate::merge::{MergeOutput, Merger, SourceDocument};
use crate::overlay::{OverlayOptions, Stamper};
use crate::pages::{centered_text_document, resize_document};
use crate::{DocumentHandle, outline::BookmarkNode};

/// Default margin, in points, for resized pages.
pub const DEFAULT_RESIZE_MARGIN: f32 = 18.0;

/// Summary of a parsed document, as reported by [`PdfService::document_info`].
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    /// Number of pages.
    pub page_count: u32,
    /// PDF version from the file header.
    pub version: String,
    /// Whether the document carries an encryption dictionary.
    pub encrypted: bool,
    /// Width and height of the first page in points, if there is one.
    pub page_dimensions: Option<(f32, f32)>,
    /// Number of top-level outline entries.
    pub outline_entries: usize,
}

/// Runs assembly operations on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct PdfService {
    timeout: Option<Duration>,
}

impl PdfService {
    /// A service without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A service whose calls fail with [`PdfError::Timeout`] after
    /// `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    async fn run<T, F>(&self, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let handle = task::spawn_blocking(task);
        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => return Err(PdfError::Timeout),
            },
            None => handle.await,
        };
        joined.map_err(|err| PdfError::Other(format!("worker failed: {err}")))?
    }

    /// Merge sources in order. See [`Merger::merge`].
    pub async fn merge(&self, sources: Vec<SourceDocument>) -> Result<MergeOutput> {
        self.run(move || Merger::new().merge(&sources)).await
    }

    /// Merge sources, resizing every page onto `page_size` first.
    pub async fn resize_merge(
        &self,
        sources: Vec<SourceDocument>,
        page_size: PageSize,
        landscape: bool,
    ) -> Result<MergeOutput> {
        let target = page_size.resolve(landscape);
        self.run(move || {
            Merger::new().merge_with(&sources, |content| {
                resize_document(content, target, DEFAULT_RESIZE_MARGIN)
            })
        })
        .await
    }

    /// Re-lay a document onto a new page size. `page_size` of `None`
    /// keeps the default (A4).
    pub async fn resize(
        &self,
        pdf: Vec<u8>,
        page_size: Option<PageSize>,
        landscape: bool,
        margin: f32,
    ) -> Result<Vec<u8>> {
        let target = page_size.unwrap_or(PageSize::A4).resolve(landscape);
        self.run(move || resize_document(&pdf, target, margin)).await
    }

    /// Stamp the same overlay text onto every page.
    pub async fn add_overlay(
        &self,
        pdf: Vec<u8>,
        text: String,
        options: OverlayOptions,
    ) -> Result<Vec<u8>> {
        self.run(move || Stamper::new().add_overlay(&pdf, &text, &options))
            .await
    }

    /// Number pages at the bottom center. See
    /// [`Stamper::add_page_numbers`].
    pub async fn add_page_numbers(
        &self,
        pdf: Vec<u8>,
        pages_to_skip: u32,
        first_page_number: u32,
        total_page_count: Option<u32>,
        options: OverlayOptions,
    ) -> Result<Vec<u8>> {
        self.run(move || {
            Stamper::new().add_page_numbers(
                &pdf,
                pages_to_skip,
                first_page_number,
                total_page_count,
                &options,
            )
        })
        .await
    }

    /// Create a single-page document with centered text lines.
    pub async fn centered_text_document(
        &self,
        lines: Vec<String>,
        font_name: String,
        font_size: f32,
        page_size: PageSize,
        landscape: bool,
    ) -> Result<Vec<u8>> {
        let page = page_size.resolve(landscape);
        self.run(move || centered_text_document(&lines, &font_name, font_size, page))
            .await
    }

    /// Number of pages in a document.
    pub async fn page_count(&self, pdf: Vec<u8>) -> Result<u32> {
        self.run(move || Ok(DocumentHandle::open(&pdf)?.page_count()))
            .await
    }

    /// Summarize a document.
    pub async fn document_info(&self, pdf: Vec<u8>) -> Result<DocumentInfo> {
        self.run(move || {
            let handle = DocumentHandle::open(&pdf)?;
            let page_count = handle.page_count();
            let page_dimensions = if page_count > 0 {
                let rect = handle.page_rect(1)?;
                Some((rect.width, rect.height))
            } else {
                None
            };
            let outline: Vec<BookmarkNode> = handle.outline();
            Ok(DocumentInfo {
                page_count,
                version: handle.version().to_string(),
                encrypted: handle.is_encrypted(),
                page_dimensions,
                outline_entries: outline.len(),
            })
        })
        .await
    }
}
