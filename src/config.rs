//! Process-wide video configuration.
//!
//! Every field has a default so an empty JSON object (`{}`) is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{NewsreelError, NewsreelResult};

/// Default download filename for the generated artifact.
pub const DEFAULT_FILE_NAME: &str = "ai-tool-video.webm";

/// Well-known font locations searched when no font is configured.
const SYSTEM_FONT_CANDIDATES: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
    (
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    ),
    ("C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\arialbd.ttf"),
];

/// Video output and session configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Capture frame rate.
    pub fps: u32,
    /// Interval between encoder data-available deliveries.
    pub chunk_interval_ms: u64,
    /// Upper bound for one thumbnail load.
    pub image_timeout_ms: u64,
    /// Target video bitrate.
    pub video_bits_per_second: u32,
    /// Target audio bitrate.
    pub audio_bits_per_second: u32,
    /// Ambient bed sample rate in Hz.
    pub sample_rate: u32,
    /// Ambient bed channel count.
    pub channels: u16,
    /// Regular-weight font file. Falls back to a system font search.
    pub font: Option<PathBuf>,
    /// Bold font file. Falls back to `font`.
    pub font_bold: Option<PathBuf>,
    /// Suggested filename for the artifact.
    pub file_name: String,
    /// Text of the corner badge drawn on every frame.
    pub badge_label: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            chunk_interval_ms: 500,
            image_timeout_ms: 2_000,
            video_bits_per_second: 4_000_000,
            audio_bits_per_second: 128_000,
            sample_rate: 48_000,
            channels: 2,
            font: None,
            font_bold: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            badge_label: "AI Tools".to_string(),
        }
    }
}

impl VideoConfig {
    /// Load a configuration from a JSON file.
    pub fn from_path(path: &Path) -> NewsreelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> NewsreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(NewsreelError::validation("width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(NewsreelError::validation(
                "width/height must be even (required for yuv420p output)",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(NewsreelError::validation("width/height must fit in u16"));
        }
        if self.fps == 0 {
            return Err(NewsreelError::validation("fps must be non-zero"));
        }
        if self.chunk_interval_ms == 0 {
            return Err(NewsreelError::validation(
                "chunk_interval_ms must be non-zero",
            ));
        }
        if self.image_timeout_ms == 0 {
            return Err(NewsreelError::validation("image_timeout_ms must be non-zero"));
        }
        if self.sample_rate == 0 || self.channels == 0 {
            return Err(NewsreelError::validation(
                "sample_rate and channels must be non-zero",
            ));
        }
        if self.file_name.trim().is_empty() {
            return Err(NewsreelError::validation("file_name must be non-empty"));
        }
        Ok(())
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Capture frame rate as a rational.
    pub fn fps(&self) -> NewsreelResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Encoder delivery interval.
    pub fn chunk_interval(&self) -> Duration {
        Duration::from_millis(self.chunk_interval_ms)
    }

    /// Per-image load bound.
    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }

    /// Resolve `(regular, bold)` font files, searching system locations when unset.
    pub fn resolve_fonts(&self) -> NewsreelResult<(PathBuf, PathBuf)> {
        if let Some(regular) = &self.font {
            let bold = self.font_bold.clone().unwrap_or_else(|| regular.clone());
            return Ok((regular.clone(), bold));
        }
        for (regular, bold) in SYSTEM_FONT_CANDIDATES {
            let regular = Path::new(regular);
            if !regular.is_file() {
                continue;
            }
            let bold = match &self.font_bold {
                Some(p) => p.clone(),
                None if Path::new(bold).is_file() => PathBuf::from(bold),
                None => regular.to_path_buf(),
            };
            return Ok((regular.to_path_buf(), bold));
        }
        Err(NewsreelError::capability(
            "no font configured and no known system font found (set `font` in the config or pass --font)",
        ))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
