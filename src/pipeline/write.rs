//! Output writer: PNG-encode each processed image under its deterministic name.
//!
//! Names are `{base}_page{index:04}.png`, or `{base}_page{index:04}_left.png`
//! and `..._right.png` for split pages. Index and side are unique per page, so
//! nothing is overwritten within one invocation.
//!
//! Each image is encoded in memory and written to a `.png.tmp` sibling that is
//! renamed into place, so a reader listing the directory never sees a
//! half-written PNG.

use crate::error::Pdf2ImgError;
use crate::output::{OutputArtifact, Side};
use image::DynamicImage;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extensions [`list_output_images`] treats as results.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// File name for page `page_index` (1-based) and optional side.
pub fn artifact_name(base: &str, page_index: usize, side: Option<Side>) -> String {
    match side {
        Some(side) => format!("{base}_page{page_index:04}_{side}.png"),
        None => format!("{base}_page{page_index:04}.png"),
    }
}

/// Create `dir` (and parents) if absent.
pub fn ensure_output_dir(dir: &Path) -> Result<(), Pdf2ImgError> {
    std::fs::create_dir_all(dir).map_err(|source| Pdf2ImgError::OutputDirFailed {
        path: dir.to_path_buf(),
        source,
    })
}

/// Encode `image` as PNG and write it into `dir`.
pub fn write_page(
    image: &DynamicImage,
    dir: &Path,
    base: &str,
    page_index: usize,
    side: Option<Side>,
) -> Result<OutputArtifact, Pdf2ImgError> {
    ensure_output_dir(dir)?;
    let path = artifact_path(dir, base, page_index, side);

    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|source| Pdf2ImgError::EncodeFailed {
            path: path.clone(),
            page: page_index,
            source,
        })?;

    let tmp = path.with_extension("png.tmp");
    let io_err = |source: std::io::Error| Pdf2ImgError::OutputWriteFailed {
        path: path.clone(),
        page: page_index,
        source,
    };
    std::fs::write(&tmp, &buf).map_err(io_err)?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(e));
    }

    info!(
        "Wrote {} ({}x{}, {} bytes)",
        path.display(),
        image.width(),
        image.height(),
        buf.len()
    );

    Ok(OutputArtifact {
        path,
        base: base.to_string(),
        page_index,
        side,
        width: image.width(),
        height: image.height(),
    })
}

/// Sorted file names of the images in `dir`.
///
/// This is how consumers discover results: list the directory and keep the
/// image extensions. Zero-padded indices make lexical order page order.
pub fn list_output_images(dir: &Path) -> Result<Vec<String>, Pdf2ImgError> {
    let entries = std::fs::read_dir(dir).map_err(|source| Pdf2ImgError::OutputDirFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && has_image_extension(p))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    debug!("Found {} images in {}", names.len(), dir.display());
    Ok(names)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Path an artifact would be written to, without writing it.
pub fn artifact_path(dir: &Path, base: &str, page_index: usize, side: Option<Side>) -> PathBuf {
    dir.join(artifact_name(base, page_index, side))
}
