//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! Rendering is lazy. [`Rasterizer::open`] loads the document and reports its
//! page count, and each page is rasterised only when the pipeline asks for
//! it, so at most one page bitmap is alive at a time even for long books at
//! high DPI. The pipeline talks to the rasterizer through the [`PageSource`]
//! trait, which is also how tests feed it synthetic pages.
//!
//! ## Binding pdfium
//!
//! pdfium is a C++ shared library loaded at runtime. [`bind_pdfium`] tries,
//! in order: `PDFIUM_LIB_PATH` (a library file or the directory holding it),
//! the current working directory, then the system library search path.

use crate::error::Pdf2ImgError;
use crate::output::DocumentMetadata;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF user space unit: 72 points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Anything that can hand the pipeline rendered pages in document order.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Render page `index` (0-based).
    fn render_page(&mut self, index: usize) -> Result<DynamicImage, Pdf2ImgError>;
}

/// Load the pdfium library.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2ImgError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => {
            let path = PathBuf::from(p);
            let lib = if path.is_dir() {
                PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(&path))
            } else {
                path
            };
            debug!("Binding pdfium from PDFIUM_LIB_PATH: {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        _ => {
            let local = PathBuf::from(Pdfium::pdfium_platform_library_name_at_path("./"));
            Pdfium::bind_to_library(&local).or_else(|_| Pdfium::bind_to_system_library())
        }
    }
    .map_err(|e| Pdf2ImgError::PdfiumBindingFailed(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

/// Owns the pdfium binding; documents opened from it borrow it.
pub struct Rasterizer {
    pdfium: Pdfium,
}

impl Rasterizer {
    /// Bind pdfium (see [`bind_pdfium`]).
    pub fn new() -> Result<Self, Pdf2ImgError> {
        Ok(Self {
            pdfium: bind_pdfium()?,
        })
    }

    /// Wrap an already-bound pdfium instance.
    pub fn from_pdfium(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    /// Open a PDF for rendering at `dpi`.
    pub fn open<'a>(
        &'a self,
        pdf_path: &Path,
        dpi: u32,
        password: Option<&'a str>,
    ) -> Result<PdfPageSource<'a>, Pdf2ImgError> {
        let document = load_document(&self.pdfium, pdf_path, password)?;
        let page_count = document.pages().len() as usize;
        info!(
            "PDF loaded: {} pages, rendering at {} DPI",
            page_count, dpi
        );
        Ok(PdfPageSource {
            document,
            page_count,
            scale: dpi as f32 / POINTS_PER_INCH,
        })
    }

    /// Extract document metadata without rendering pages.
    pub fn metadata<'a>(
        &'a self,
        pdf_path: &Path,
        password: Option<&'a str>,
    ) -> Result<DocumentMetadata, Pdf2ImgError> {
        let document = load_document(&self.pdfium, pdf_path, password)?;
        let metadata = document.metadata();
        let pages = document.pages();

        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        let page_sizes_pt = pages
            .iter()
            .map(|page| (page.width().value, page.height().value))
            .collect();

        Ok(DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            page_count: pages.len() as usize,
            pdf_version: format!("{:?}", document.version()),
            page_sizes_pt,
        })
    }
}

/// An open PDF document, rendering pages on demand.
pub struct PdfPageSource<'a> {
    document: PdfDocument<'a>,
    page_count: usize,
    scale: f32,
}

impl PageSource for PdfPageSource<'_> {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&mut self, index: usize) -> Result<DynamicImage, Pdf2ImgError> {
        let page_num = index + 1;
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| Pdf2ImgError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(self.scale);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            Pdf2ImgError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2ImgError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2ImgError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2ImgError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2ImgError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}
