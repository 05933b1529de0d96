//! Pipeline stages for PDF-to-image processing.
//!
//! Each submodule implements exactly one transformation step and can be
//! tested on its own with synthetic images.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ orient ──▶ crop ──▶ split ──▶ write
//! (path)   (pdfium)   (deskew)   (margin) (halves)  (PNG files)
//! ```
//!
//! 1. [`input`]: validate the source path and `%PDF` magic before pdfium
//!    is bound
//! 2. [`render`]: rasterise one page at a time at the configured DPI
//! 3. [`orient`]: forced quarter-turn, or auto-detected skew correction
//! 4. [`crop`]: trim a uniform margin from all four edges
//! 5. [`split`]: optionally cut the page into left/right halves
//! 6. [`write`]: PNG-encode under `{base}_page{NNNN}[_{side}].png`
//!
//! Stages 3–6 run once per page, in page order, and a page's image is
//! dropped before the next page is rendered.

pub mod crop;
pub mod input;
pub mod orient;
pub mod render;
pub mod split;
pub mod write;
