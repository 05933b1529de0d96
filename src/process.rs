//! Top-level processing entry points.
//!
//! [`process`] is the primary API: validate the PDF, bind pdfium, then run
//! every page through orient → crop → split → write in page order.
//! [`process_pages`] is the same loop over any [`PageSource`], which is how
//! callers with pre-rendered pages (and the tests) drive the pipeline.
//!
//! Processing stops at the first failing page. Pages written before the
//! failure stay on disk; the returned error names the page.

use crate::config::ProcessingConfig;
use crate::error::Pdf2ImgError;
use crate::output::{DocumentMetadata, OutputArtifact, ProcessOutput, ProcessStats};
use crate::pipeline::render::{PageSource, Rasterizer};
use crate::pipeline::{crop, input, orient, split, write};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render a PDF into per-page images in `output_dir`.
///
/// Artifacts are named from the PDF's file stem: `scan.pdf` produces
/// `scan_page0001.png`, `scan_page0002.png`, … (or `_left`/`_right` pairs
/// when [`ProcessingConfig::split_pages`] is set).
///
/// # Errors
/// - Document errors (missing file, not a PDF, password, pdfium failure)
///   before or during rendering.
/// - Config errors when the crop margin or split does not fit a page.
/// - Io errors when the output directory or a file cannot be written.
pub fn process(
    document_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<ProcessOutput, Pdf2ImgError> {
    let pdf_path = input::resolve_local(document_path.as_ref())?;
    let base = input::document_base_name(&pdf_path);
    process_resolved(&pdf_path, &base, output_dir.as_ref(), config)
}

/// Async wrapper around [`process`].
///
/// pdfium and the pixel work are CPU-bound and blocking, so the whole
/// invocation runs on tokio's blocking pool.
pub async fn process_async(
    document_path: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
    config: &ProcessingConfig,
) -> Result<ProcessOutput, Pdf2ImgError> {
    let document_path = document_path.into();
    let output_dir = output_dir.into();
    let config = config.clone();
    tokio::task::spawn_blocking(move || process(&document_path, &output_dir, &config))
        .await
        .map_err(|e| Pdf2ImgError::Internal(format!("processing task panicked: {e}")))?
}

/// Process PDF bytes held in memory, e.g. an HTTP upload.
///
/// The bytes are spooled to a managed [`tempfile`] that is removed on return.
/// Artifacts are named from `base_name`; only its file stem is used, so
/// `"report.pdf"` and `"uploads/report.pdf"` both give `report_page0001.png`.
///
/// # Example
/// ```rust,no_run
/// use pdf2img::{process_bytes, ProcessingConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("scan.pdf")?;
/// let out = process_bytes(&bytes, "scan.pdf", "output", &ProcessingConfig::default())?;
/// println!("{:?}", out.file_names());
/// # Ok(())
/// # }
/// ```
pub fn process_bytes(
    bytes: &[u8],
    base_name: &str,
    output_dir: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<ProcessOutput, Pdf2ImgError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("pdf2img-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Pdf2ImgError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.flush())
        .map_err(|e| Pdf2ImgError::Internal(format!("tempfile write: {e}")))?;

    let pdf_path = input::resolve_local(tmp.path())?;
    let base = input::document_base_name(Path::new(base_name));
    // `tmp` is deleted when it drops at the end of this function.
    process_resolved(&pdf_path, &base, output_dir.as_ref(), config)
}

/// Extract PDF metadata without rendering any page.
///
/// `password` unlocks encrypted documents, as `ProcessingConfig::password`
/// does for [`process`].
pub fn inspect(
    document_path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2ImgError> {
    let pdf_path = input::resolve_local(document_path.as_ref())?;
    let rasterizer = Rasterizer::new()?;
    rasterizer.metadata(&pdf_path, password)
}

/// Run every page of `source` through the pipeline and write the results.
///
/// Pages are handled strictly in order and one at a time. The first error
/// stops the loop: `on_page_error` and `on_process_complete` fire, and the
/// error is returned. Artifacts already written are left in place.
pub fn process_pages<S>(
    source: &mut S,
    base: &str,
    output_dir: &Path,
    config: &ProcessingConfig,
) -> Result<ProcessOutput, Pdf2ImgError>
where
    S: PageSource + ?Sized,
{
    let start = Instant::now();
    let total_pages = source.page_count();
    write::ensure_output_dir(output_dir)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_process_start(total_pages);
    }

    let mut artifacts = Vec::with_capacity(total_pages * config.artifacts_per_page());
    let mut render_duration_ms = 0u64;
    let mut processed_pages = 0usize;

    for index in 0..total_pages {
        let page_num = index + 1;
        info!("Processing page {}/{}", page_num, total_pages);
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        match process_page(source, index, base, output_dir, config, &mut render_duration_ms) {
            Ok(page_artifacts) => {
                let written = page_artifacts.len();
                artifacts.extend(page_artifacts);
                processed_pages += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_complete(page_num, total_pages, written);
                }
            }
            Err(e) => {
                warn!("Page {}/{} failed: {}", page_num, total_pages, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, total_pages, &e.to_string());
                    cb.on_process_complete(total_pages, processed_pages);
                }
                return Err(e);
            }
        }
    }

    let stats = ProcessStats {
        total_pages,
        processed_pages,
        artifacts_written: artifacts.len(),
        render_duration_ms,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Processing complete: {} pages → {} images in {}ms",
        processed_pages, stats.artifacts_written, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_process_complete(total_pages, processed_pages);
    }

    Ok(ProcessOutput {
        artifacts,
        output_dir: output_dir.to_path_buf(),
        stats,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn process_resolved(
    pdf_path: &Path,
    base: &str,
    output_dir: &Path,
    config: &ProcessingConfig,
) -> Result<ProcessOutput, Pdf2ImgError> {
    let total_start = Instant::now();
    info!(
        "Starting processing: {} → {}",
        pdf_path.display(),
        output_dir.display()
    );
    debug!("Config: {:?}", config);

    let rasterizer = Rasterizer::new()?;
    let mut source = rasterizer.open(pdf_path, config.dpi, config.password.as_deref())?;
    let mut output = process_pages(&mut source, base, output_dir, config)?;

    // Include pdfium binding and document load in the total.
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Render, orient, crop, split and write one page (0-based `index`).
///
/// Every check that can reject the page runs before the first write.
fn process_page<S>(
    source: &mut S,
    index: usize,
    base: &str,
    output_dir: &Path,
    config: &ProcessingConfig,
    render_duration_ms: &mut u64,
) -> Result<Vec<OutputArtifact>, Pdf2ImgError>
where
    S: PageSource + ?Sized,
{
    let page_num = index + 1;

    let render_start = Instant::now();
    let rendered = source.render_page(index)?;
    *render_duration_ms += render_start.elapsed().as_millis() as u64;

    let oriented = orient::correct_orientation(rendered, config.rotation);
    debug!(
        "Page {} oriented ({}): {}x{}",
        page_num,
        config.rotation,
        oriented.width(),
        oriented.height()
    );

    let cropped = crop::crop_margin(oriented, config.crop_margin, page_num)?;
    let parts = split::split_page(cropped, config.split_pages, page_num)?;

    parts
        .into_parts()
        .into_iter()
        .map(|(side, image)| write::write_page(&image, output_dir, base, page_num, side))
        .collect()
}
