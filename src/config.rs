//! Configuration types for PDF-to-image processing.
//!
//! All processing behaviour is controlled through [`ProcessingConfig`], built
//! via its [`ProcessingConfigBuilder`]. The config is immutable once built and
//! cheap to clone, so one value can be shared by every page of a document and
//! by every job that runs with the same settings.

use crate::error::Pdf2ImgError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest accepted DPI. A4 at 2400 DPI is already ~20 000 × 28 000 px.
pub const MAX_DPI: u32 = 2400;

/// Configuration for one processing invocation.
///
/// # Example
/// ```rust
/// use pdf2img::{ProcessingConfig, QuarterTurn, Rotation};
///
/// let config = ProcessingConfig::builder()
///     .dpi(150)
///     .split_pages(true)
///     .rotation(Rotation::Fixed(QuarterTurn::Deg90))
///     .crop_margin(10)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ProcessingConfig {
    /// Rendering resolution in dots per inch. Default: 300.
    ///
    /// A PDF page is measured in points (1/72 inch), so each page is rendered
    /// at `points × dpi / 72` pixels per side.
    pub dpi: u32,

    /// Bisect every page into left/right halves (double-page book scans). Default: false.
    pub split_pages: bool,

    /// Forced quarter-turn or automatic deskew. Default: [`Rotation::Auto`].
    pub rotation: Rotation,

    /// Pixels trimmed from each of the four edges after orientation. Default: 0.
    pub crop_margin: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            split_pages: false,
            rotation: Rotation::Auto,
            crop_margin: 0,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingConfig")
            .field("dpi", &self.dpi)
            .field("split_pages", &self.split_pages)
            .field("rotation", &self.rotation)
            .field("crop_margin", &self.crop_margin)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ProcessingProgressCallback>"),
            )
            .finish()
    }
}

impl ProcessingConfig {
    /// Create a new builder for `ProcessingConfig`.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder {
            config: Self::default(),
        }
    }

    /// Number of artifacts each page produces.
    pub fn artifacts_per_page(&self) -> usize {
        if self.split_pages {
            2
        } else {
            1
        }
    }
}

/// Builder for [`ProcessingConfig`].
#[derive(Debug)]
pub struct ProcessingConfigBuilder {
    config: ProcessingConfig,
}

impl ProcessingConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn split_pages(mut self, v: bool) -> Self {
        self.config.split_pages = v;
        self
    }

    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    pub fn crop_margin(mut self, px: u32) -> Self {
        self.config.crop_margin = px;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Only page-independent checks happen here. Whether `crop_margin` fits
    /// depends on the rendered size of each page and is checked per page.
    pub fn build(self) -> Result<ProcessingConfig, Pdf2ImgError> {
        let c = &self.config;
        if c.dpi == 0 || c.dpi > MAX_DPI {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "DPI must be 1–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// An exact multiple of 90°, counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum QuarterTurn {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl QuarterTurn {
    pub fn degrees(self) -> u32 {
        match self {
            QuarterTurn::Deg0 => 0,
            QuarterTurn::Deg90 => 90,
            QuarterTurn::Deg180 => 180,
            QuarterTurn::Deg270 => 270,
        }
    }

    /// Whether the turn exchanges width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, QuarterTurn::Deg90 | QuarterTurn::Deg270)
    }
}

impl TryFrom<u32> for QuarterTurn {
    type Error = Pdf2ImgError;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(QuarterTurn::Deg0),
            90 => Ok(QuarterTurn::Deg90),
            180 => Ok(QuarterTurn::Deg180),
            270 => Ok(QuarterTurn::Deg270),
            other => Err(Pdf2ImgError::InvalidRotation(other.to_string())),
        }
    }
}

impl From<QuarterTurn> for u32 {
    fn from(turn: QuarterTurn) -> Self {
        turn.degrees()
    }
}

/// How the orientation stage treats each page.
///
/// Scanner skew is small (a few degrees) while orientation mistakes are
/// coarse (sideways, upside down). `Auto` only corrects the former; callers
/// who know a document is sideways pass `Fixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// Detect and remove small skew from the ink's bounding rectangle.
    #[default]
    Auto,
    /// Apply exactly this quarter-turn; no detection.
    Fixed(QuarterTurn),
}

impl FromStr for Rotation {
    type Err = Pdf2ImgError;

    /// Parses `auto`, `none`, `0`, `90`, `180` or `270` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "auto" | "none" | "null" | "" => Ok(Rotation::Auto),
            other => {
                let degrees: u32 = other
                    .parse()
                    .map_err(|_| Pdf2ImgError::InvalidRotation(other.to_string()))?;
                Ok(Rotation::Fixed(QuarterTurn::try_from(degrees)?))
            }
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Auto => f.write_str("auto"),
            Rotation::Fixed(turn) => write!(f, "{}", turn.degrees()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ProcessingConfig::default();
        assert_eq!(c.dpi, 300);
        assert!(!c.split_pages);
        assert_eq!(c.rotation, Rotation::Auto);
        assert_eq!(c.crop_margin, 0);
        assert_eq!(c.artifacts_per_page(), 1);
    }

    #[test]
    fn builder_rejects_zero_dpi() {
        let err = ProcessingConfig::builder().dpi(0).build().unwrap_err();
        assert!(matches!(err, Pdf2ImgError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_huge_dpi() {
        assert!(ProcessingConfig::builder().dpi(MAX_DPI + 1).build().is_err());
        assert!(ProcessingConfig::builder().dpi(MAX_DPI).build().is_ok());
    }

    #[test]
    fn split_doubles_artifacts() {
        let c = ProcessingConfig::builder().split_pages(true).build().unwrap();
        assert_eq!(c.artifacts_per_page(), 2);
    }

    #[test]
    fn rotation_parses() {
        assert_eq!("auto".parse::<Rotation>().unwrap(), Rotation::Auto);
        assert_eq!("AUTO".parse::<Rotation>().unwrap(), Rotation::Auto);
        assert_eq!(
            "90".parse::<Rotation>().unwrap(),
            Rotation::Fixed(QuarterTurn::Deg90)
        );
        assert_eq!(
            " 270 ".parse::<Rotation>().unwrap(),
            Rotation::Fixed(QuarterTurn::Deg270)
        );
        assert!("45".parse::<Rotation>().is_err());
        assert!("sideways".parse::<Rotation>().is_err());
    }

    #[test]
    fn rotation_display_round_trips_through_parse() {
        for r in [
            Rotation::Auto,
            Rotation::Fixed(QuarterTurn::Deg0),
            Rotation::Fixed(QuarterTurn::Deg180),
        ] {
            assert_eq!(r.to_string().parse::<Rotation>().unwrap(), r);
        }
    }

    #[test]
    fn quarter_turn_serde_uses_degrees() {
        let json = serde_json::to_string(&Rotation::Fixed(QuarterTurn::Deg90)).unwrap();
        assert_eq!(json, r#"{"fixed":90}"#);
        let back: Rotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rotation::Fixed(QuarterTurn::Deg90));
        assert!(serde_json::from_str::<QuarterTurn>("45").is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = ProcessingConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn only_quarter_turns_swap_dimensions() {
        assert!(QuarterTurn::Deg90.swaps_dimensions());
        assert!(QuarterTurn::Deg270.swaps_dimensions());
        assert!(!QuarterTurn::Deg0.swaps_dimensions());
        assert!(!QuarterTurn::Deg180.swaps_dimensions());
    }
}
