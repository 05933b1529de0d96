//! Error types for the pdf2img library.
//!
//! A single enum, [`Pdf2ImgError`], covers every failure. Variants are grouped
//! into four kinds (see [`ErrorKind`]) so that callers which only care about
//! the category can match on [`Pdf2ImgError::kind`] instead of every variant.
//!
//! * **Document** errors abort the invocation before any page is written
//!   (missing file, not a PDF, wrong password), or abort the remaining pages
//!   when pdfium fails on a single page.
//! * **Config** errors mean the requested transform would produce a
//!   degenerate image for a page. They are raised before anything is written
//!   for that page.
//! * **Io** errors come from the output writer. Pages written before the
//!   failure stay on disk.
//!
//! Nothing in the library retries; every error carries the path and, where it
//! applies, the 1-based page number.

use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`Pdf2ImgError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Source file missing, unreadable, not a PDF, or not renderable.
    Document,
    /// Configuration that would produce a degenerate image.
    Config,
    /// Output directory not creatable / file not writable.
    Io,
    /// Bug or misuse inside the library (job state machine, panicked task).
    Internal,
}

/// All errors returned by the pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Document errors ───────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium in a directory on the system library search path.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Rotation outside {0, 90, 180, 270}.
    #[error("Invalid rotation '{0}': expected auto, 0, 90, 180 or 270")]
    InvalidRotation(String),

    /// Cropping `margin` pixels from each edge would leave nothing.
    #[error(
        "Page {page}: crop margin {margin}px leaves no image \
         (page is {width}x{height}px, margin must be < half of each side)"
    )]
    CropExceedsPage {
        page: usize,
        margin: u32,
        width: u32,
        height: u32,
    },

    /// A page must be at least 2 px wide to be split into halves.
    #[error("Page {page}: {width}px is too narrow to split into left/right halves")]
    PageTooNarrowToSplit { page: usize, width: u32 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write an output image.
    #[error("Page {page}: failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        page: usize,
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed before anything reached the disk.
    #[error("Page {page}: failed to encode '{path}': {source}")]
    EncodeFailed {
        path: PathBuf,
        page: usize,
        #[source]
        source: image::ImageError,
    },

    // ── Internal ──────────────────────────────────────────────────────────
    /// A job was moved to a state its current state cannot reach.
    #[error("Job {job}: invalid transition {from} → {to}")]
    InvalidJobTransition {
        job: String,
        from: &'static str,
        to: &'static str,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2ImgError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::NotAPdf { .. }
            | Self::CorruptPdf { .. }
            | Self::PasswordRequired { .. }
            | Self::WrongPassword { .. }
            | Self::RasterisationFailed { .. }
            | Self::PdfiumBindingFailed(_) => ErrorKind::Document,

            Self::InvalidConfig(_)
            | Self::InvalidRotation(_)
            | Self::CropExceedsPage { .. }
            | Self::PageTooNarrowToSplit { .. } => ErrorKind::Config,

            Self::OutputDirFailed { .. }
            | Self::OutputWriteFailed { .. }
            | Self::EncodeFailed { .. } => ErrorKind::Io,

            Self::InvalidJobTransition { .. } | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The 1-based page the error occurred on, for page-scoped errors.
    pub fn page(&self) -> Option<usize> {
        match self {
            Self::RasterisationFailed { page, .. }
            | Self::CropExceedsPage { page, .. }
            | Self::PageTooNarrowToSplit { page, .. }
            | Self::OutputWriteFailed { page, .. }
            | Self::EncodeFailed { page, .. } => Some(*page),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_exceeds_page_display() {
        let e = Pdf2ImgError::CropExceedsPage {
            page: 3,
            margin: 600,
            width: 1000,
            height: 1400,
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 3"), "got: {msg}");
        assert!(msg.contains("600px"), "got: {msg}");
        assert!(msg.contains("1000x1400"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::Config);
        assert_eq!(e.page(), Some(3));
    }

    #[test]
    fn document_errors_are_not_page_scoped() {
        let e = Pdf2ImgError::FileNotFound {
            path: PathBuf::from("/nope.pdf"),
        };
        assert_eq!(e.kind(), ErrorKind::Document);
        assert_eq!(e.page(), None);
    }

    #[test]
    fn rasterisation_failure_is_document_kind_with_page() {
        let e = Pdf2ImgError::RasterisationFailed {
            page: 7,
            detail: "bad stream".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Document);
        assert_eq!(e.page(), Some(7));
    }

    #[test]
    fn write_failure_is_io_kind() {
        let e = Pdf2ImgError::OutputWriteFailed {
            path: PathBuf::from("/ro/doc_page0001.png"),
            page: 1,
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert_eq!(e.kind(), ErrorKind::Io);
        assert!(e.to_string().contains("doc_page0001.png"));
    }

    #[test]
    fn invalid_transition_display() {
        let e = Pdf2ImgError::InvalidJobTransition {
            job: "abc".into(),
            from: "completed",
            to: "processing",
        };
        assert!(e.to_string().contains("completed → processing"));
        assert_eq!(e.kind(), ErrorKind::Internal);
    }
}
