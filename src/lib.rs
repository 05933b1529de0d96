//! # pdf2img
//!
//! Turn PDF documents into one raster image per page, cleaned up for
//! downstream OCR or archiving.
//!
//! Scanned books and photocopies come out of the scanner slightly rotated,
//! sometimes sideways, with dark borders, and often with two book pages on
//! one sheet. This crate renders each page through pdfium and then fixes
//! those defects, writing predictable file names so consumers can pick the
//! results up by listing a directory.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input   check the path and %PDF magic
//!  ├─ 2. Render  rasterise each page via pdfium at the configured DPI
//!  ├─ 3. Orient  forced quarter-turn, or auto-detected deskew
//!  ├─ 4. Crop    trim a uniform margin from every edge
//!  ├─ 5. Split   optionally cut double-page spreads into left/right
//!  └─ 6. Write   {base}_page0001.png, {base}_page0001_left.png, …
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{process, ProcessingConfig, Rotation};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessingConfig::builder()
//!         .dpi(150)
//!         .split_pages(true)
//!         .rotation(Rotation::Auto)
//!         .crop_margin(10)
//!         .build()?;
//!     let output = process("book.pdf", "output", &config)?;
//!     for name in output.file_names() {
//!         println!("{name}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2img = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Rendering needs the pdfium shared library at runtime. Set
//! `PDFIUM_LIB_PATH` to the library (or its directory), place it in the
//! working directory, or install it on the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ProcessingConfig, ProcessingConfigBuilder, QuarterTurn, Rotation};
pub use error::{ErrorKind, Pdf2ImgError};
pub use job::{run_job, spawn_job, submit_job, JobId, JobRecord, JobState, JobStore, MemoryJobStore};
pub use output::{DocumentMetadata, OutputArtifact, ProcessOutput, ProcessStats, Side};
pub use pipeline::render::{PageSource, Rasterizer};
pub use pipeline::write::list_output_images;
pub use process::{inspect, process, process_async, process_bytes, process_pages};
pub use progress::{NoopProgressCallback, ProcessingProgressCallback, ProgressCallback};
