//! Result types returned by the processing entry points.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which half of a split page an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image file written by the output writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    /// Full path of the written file.
    pub path: PathBuf,
    /// Base name derived from the source document (file stem).
    pub base: String,
    /// 1-indexed source page.
    pub page_index: usize,
    /// `Some` only when pages are split.
    pub side: Option<Side>,
    pub width: u32,
    pub height: u32,
}

impl OutputArtifact {
    /// File name without the directory, e.g. `doc_page0001_left.png`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Timing and count statistics for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages whose artifacts were all written.
    pub processed_pages: usize,
    /// Files written (`processed_pages`, or twice that when splitting).
    pub artifacts_written: usize,
    /// Wall-clock time spent inside pdfium rendering.
    pub render_duration_ms: u64,
    /// Wall-clock time for the whole invocation.
    pub total_duration_ms: u64,
}

/// Everything a successful invocation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// Artifacts in page order; left before right for split pages.
    pub artifacts: Vec<OutputArtifact>,
    pub output_dir: PathBuf,
    pub stats: ProcessStats,
}

impl ProcessOutput {
    /// File names of the artifacts, in page order.
    pub fn file_names(&self) -> Vec<String> {
        self.artifacts.iter().map(OutputArtifact::file_name).collect()
    }
}

/// PDF metadata, read without rendering any page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
    /// Width and height of every page, in PDF points (1/72 inch).
    pub page_sizes_pt: Vec<(f32, f32)>,
}

impl DocumentMetadata {
    /// Pixel size page `index` (0-based) renders to at `dpi`.
    pub fn pixel_size(&self, index: usize, dpi: u32) -> Option<(u32, u32)> {
        self.page_sizes_pt.get(index).map(|&(w, h)| {
            let scale = dpi as f32 / 72.0;
            ((w * scale).round() as u32, (h * scale).round() as u32)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_strips_directory() {
        let a = OutputArtifact {
            path: PathBuf::from("/out/job/doc_page0002_right.png"),
            base: "doc".into(),
            page_index: 2,
            side: Some(Side::Right),
            width: 10,
            height: 10,
        };
        assert_eq!(a.file_name(), "doc_page0002_right.png");
    }

    #[test]
    fn pixel_size_scales_points_by_dpi() {
        let meta = DocumentMetadata {
            page_count: 1,
            page_sizes_pt: vec![(612.0, 792.0)],
            ..Default::default()
        };
        assert_eq!(meta.pixel_size(0, 72), Some((612, 792)));
        assert_eq!(meta.pixel_size(0, 150), Some((1275, 1650)));
        assert_eq!(meta.pixel_size(1, 150), None);
    }

    #[test]
    fn side_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), r#""left""#);
        assert_eq!(Side::Right.to_string(), "right");
    }
}
