//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ProcessingConfig` and prints the written file names.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img::{
    inspect, process_async, ProcessingConfig, ProcessingProgressCallback, ProgressCallback,
    Rotation,
};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar plus one log line per finished page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the page currently being processed.
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner until `on_process_start` reports the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }

    fn page_elapsed_secs(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ProcessingProgressCallback for CliProgressCallback {
    fn on_process_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, artifacts: usize) {
        let secs = self.page_elapsed_secs();
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{artifacts} image{}", if artifacts == 1 { "" } else { "s" })),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let secs = self.page_elapsed_secs();

        // Keep the line short; the full error is reported on exit.
        let msg = match error.lines().next() {
            Some(first) if first.chars().count() > 80 => {
                format!("{}\u{2026}", first.chars().take(79).collect::<String>())
            }
            Some(first) => first.to_string(),
            None => String::new(),
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
    }

    fn on_process_complete(&self, total_pages: usize, completed_pages: usize) {
        self.bar.finish_and_clear();
        if completed_pages == total_pages {
            eprintln!(
                "{} {} pages processed",
                green("✔"),
                bold(&completed_pages.to_string())
            );
        } else {
            eprintln!(
                "{} stopped after {}/{} pages",
                red("✘"),
                bold(&completed_pages.to_string()),
                total_pages,
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One PNG per page at 300 DPI into ./output
  pdf2img scan.pdf

  # Double-page book scan: split spreads, trim 10px, 150 DPI
  pdf2img --split --crop 10 --dpi 150 book.pdf -o pages/

  # Document scanned sideways: force a 90° counter-clockwise turn
  pdf2img --rotate 90 sideways.pdf

  # Inspect PDF metadata without rendering
  pdf2img --inspect-only scan.pdf

  # Machine-readable result
  pdf2img --json scan.pdf > result.json

OUTPUT NAMES:
  {stem}_page0001.png                      one image per page
  {stem}_page0001_left.png / _right.png    with --split

ROTATION:
  auto      detect and remove small scanner skew (default)
  0         leave pages as rendered
  90/180/270  exact counter-clockwise quarter turn; 90 and 270 swap width/height

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Override log filter (e.g. pdf2img=debug)
  PDF2IMG_*         Fallback for every flag (PDF2IMG_DPI, PDF2IMG_SPLIT, …)
"#;

/// Render PDF pages to images with deskew, crop and split.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Render PDF pages to PNG images with deskew, crop and page split",
    long_about = "Render every page of a PDF to a PNG image. Pages can be straightened \
automatically or turned by a fixed quarter-turn, trimmed by a uniform margin, and split \
into left/right halves for double-page book scans.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory the images are written to (created if absent).
    #[arg(short, long = "output-dir", env = "PDF2IMG_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Rendering DPI.
    #[arg(long, env = "PDF2IMG_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(1..=2400))]
    dpi: u32,

    /// Split each page into left/right halves.
    #[arg(long, env = "PDF2IMG_SPLIT")]
    split: bool,

    /// Rotation: auto, 0, 90, 180 or 270.
    #[arg(long, env = "PDF2IMG_ROTATE", default_value = "auto")]
    rotate: String,

    /// Pixels trimmed from each edge after rotation.
    #[arg(long, env = "PDF2IMG_CROP", default_value_t = 0)]
    crop: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2IMG_PASSWORD")]
    password: Option<String>,

    /// Output structured JSON instead of file names.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Print PDF metadata only, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would tear the progress bar, so it gets errors only.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let path = cli.input.clone();
        let password = cli.password.clone();
        let meta = tokio::task::spawn_blocking(move || inspect(path, password.as_deref()))
            .await
            .context("Inspect task panicked")?
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
            if let Some((w, h)) = meta.pixel_size(0, cli.dpi) {
                println!("Page 1 @ {} DPI: {}x{} px", cli.dpi, w, h);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ProcessingProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = process_async(&cli.input, &cli.output_dir, &config)
        .await
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        for artifact in &output.artifacts {
            println!("{}", artifact.path.display());
        }
        if !cli.quiet {
            eprintln!(
                "{}  {} pages → {} images  {}ms  →  {}",
                green("✔"),
                output.stats.processed_pages,
                output.stats.artifacts_written,
                output.stats.total_duration_ms,
                bold(&output.output_dir.display().to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ProcessingConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ProcessingConfig> {
    let rotation: Rotation = cli
        .rotate
        .parse()
        .with_context(|| format!("Invalid --rotate value '{}'", cli.rotate))?;

    let mut builder = ProcessingConfig::builder()
        .dpi(cli.dpi)
        .split_pages(cli.split)
        .rotation(rotation)
        .crop_margin(cli.crop);

    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
