//! Error types for PDF assembly operations.

use std::io;
use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors produced by the assembly engine, the async service and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// A caller-supplied argument was rejected before any processing started.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The document is password protected and cannot be processed.
    #[error("document is encrypted and cannot be processed")]
    EncryptedDocument,

    /// The bytes could not be parsed as a PDF document.
    #[error("unreadable document: {0}")]
    Unreadable(String),

    /// The operation would produce a document with no pages.
    #[error("operation produced a document with no pages")]
    EmptyResult,

    /// The operation did not complete within the configured deadline.
    #[error("operation timed out")]
    Timeout,

    /// A file could not be read from or written to storage.
    #[error("failed to access {path}: {source}")]
    Resource {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The output file already exists and overwriting was not requested.
    #[error("output file already exists: {0} (use --force to overwrite)")]
    OutputExists(PathBuf),

    /// An I/O error outside of a specific file path.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An unexpected internal failure, such as a panicked worker thread.
    #[error("{0}")]
    Other(String),
}

impl PdfError {
    /// Build an [`PdfError::InvalidInput`] from anything displayable.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Build an [`PdfError::Unreadable`] from anything displayable.
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self::Unreadable(reason.into())
    }

    /// Map a `lopdf` load failure, distinguishing encrypted documents from
    /// plain parse errors.
    pub(crate) fn from_load_error(err: lopdf::Error) -> Self {
        Self::classify_load_message(err.to_string())
    }

    fn classify_load_message(message: String) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("crypt") || lowered.contains("password") {
            Self::EncryptedDocument
        } else {
            Self::Unreadable(message)
        }
    }

    /// Process exit code for this error.
    ///
    /// Codes are stable so scripts can branch on them:
    /// 2 = invalid input, 3 = unreadable, 4 = output exists,
    /// 5 = encrypted, 6 = empty result, 7 = timeout, 8 = storage,
    /// 1 = everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) => 2,
            Self::Unreadable(_) => 3,
            Self::OutputExists(_) => 4,
            Self::EncryptedDocument => 5,
            Self::EmptyResult => 6,
            Self::Timeout => 7,
            Self::Resource { .. } => 8,
            Self::Io(_) | Self::Other(_) => 1,
        }
    }
}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        Self::Unreadable(err.to_string())
    }
}
