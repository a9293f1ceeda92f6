//! Parameter types for image operations.
//!
//! These describe *what* to do, not *how*. They sit between the catalogue and
//! configuration (which decide what to produce) and the backend and pixel
//! operations (which do the work).
//!
//! - [`Quality`]: lossy re-encode quality (1–100, default 95). Clamped on construction.
//! - [`PngCompression`]: fixed compression level for the final PNG.
//! - [`FitParams`]: target canvas for the canvas-fit resizer.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy intermediate encodes (1-100).
///
/// Final output is always lossless PNG; this only travels with the format
/// catalogue for intermediate re-encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Compression effort for the final PNG encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    /// Smallest files; the optimize setting.
    #[default]
    Best,
}

impl PngCompression {
    pub fn as_str(self) -> &'static str {
        match self {
            PngCompression::Fast => "fast",
            PngCompression::Default => "default",
            PngCompression::Best => "best",
        }
    }
}

/// Target canvas for [`fit_to_canvas`](super::operations::fit_to_canvas).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub width: u32,
    pub height: u32,
    pub background: Rgba<u8>,
    /// Two-step downscale (box pre-shrink, then Lanczos) when shrinking below half size.
    pub progressive: bool,
}

impl FitParams {
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            width,
            height,
            background,
            progressive: true,
        }
    }
}
