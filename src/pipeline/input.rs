//! Input validation: check the source path before pdfium ever sees it.
//!
//! pdfium reports a missing file and a truncated file with the same opaque
//! error code. Checking existence, read permission and the `%PDF` magic bytes
//! up front gives callers a precise [`Pdf2ImgError`] and means these failures
//! surface even when no pdfium library is installed.

use crate::error::Pdf2ImgError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` names a readable file starting with `%PDF`.
pub fn resolve_local(path: &Path) -> Result<PathBuf, Pdf2ImgError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(Pdf2ImgError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic == b"%PDF" => {}
                Ok(()) => return Err(Pdf2ImgError::NotAPdf { path, magic }),
                // Shorter than four bytes: cannot be a PDF either.
                Err(_) => return Err(Pdf2ImgError::NotAPdf { path, magic }),
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2ImgError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2ImgError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Base name for output artifacts: the file name without its extension.
///
/// `scans/Book One.pdf` → `Book One`. Falls back to `document` for paths
/// with no usable stem.
pub fn document_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_local(Path::new("/definitely/not/a/real/file.pdf")).unwrap_err();
        assert!(matches!(err, Pdf2ImgError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_local(dir.path()).unwrap_err();
        assert!(matches!(err, Pdf2ImgError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"\x89PNG\r\n\x1a\n").unwrap();
        let err = resolve_local(tmp.path()).unwrap_err();
        match err {
            Pdf2ImgError::NotAPdf { magic, .. } => assert_eq!(&magic, b"\x89PNG"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn tiny_file_is_not_a_pdf() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%P").unwrap();
        assert!(matches!(
            resolve_local(tmp.path()),
            Err(Pdf2ImgError::NotAPdf { .. })
        ));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n").unwrap();
        assert_eq!(resolve_local(tmp.path()).unwrap(), tmp.path());
    }

    #[test]
    fn base_name_is_file_stem() {
        assert_eq!(document_base_name(Path::new("/up/doc.pdf")), "doc");
        assert_eq!(document_base_name(Path::new("Book One.PDF")), "Book One");
        assert_eq!(document_base_name(Path::new("archive.tar.pdf")), "archive.tar");
        assert_eq!(document_base_name(Path::new("/")), "document");
    }
}
