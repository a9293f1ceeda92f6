//! Background removal.
//!
//! [`BackgroundRemover`] turns an RGBA buffer into one whose alpha channel
//! marks foreground (255) and background (0). Colors are never changed.
//!
//! | Method | Mask source |
//! |---|---|
//! | `combined` (default) | contour ∪ Otsu, closed, contour-refined, cleaned |
//! | `contour_detection` | Canny edges, dilated, outer contours filled |
//! | `threshold` | Otsu binary-inverse |
//! | `chroma_key` | outside a near-white HSV band, opened |
//! | `grab_cut` | rectangle-seeded colour-model segmentation |
//! | `neural_network` | an injected [`SegmentationModel`] |
//!
//! The flat-background methods sit behind a gate: when the image border is
//! not mostly white there is nothing to key out, and the image comes back
//! fully opaque. GrabCut and the neural model handle arbitrary backgrounds
//! and skip the gate.
//!
//! Removal is best-effort. [`BackgroundRemover::try_remove`] reports why a
//! strategy could not run as a [`RemovalDegradation`];
//! [`BackgroundRemover::remove_background`] turns any degradation into an
//! opaque passthrough.

pub mod chroma;
pub mod combined;
pub mod grabcut;
pub mod neural;

use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::imaging::mask::{self, apply_as_alpha, opaque, to_gray};
pub use neural::SegmentationModel;

pub const DEFAULT_WHITE_THRESHOLD: u8 = 240;
pub const DEFAULT_WHITE_COVERAGE: f64 = 0.9;
pub const DEFAULT_GRABCUT_ITERATIONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalMethod {
    ContourDetection,
    Threshold,
    ChromaKey,
    GrabCut,
    #[default]
    Combined,
    NeuralNetwork,
}

impl RemovalMethod {
    pub const ALL: [RemovalMethod; 6] = [
        RemovalMethod::Combined,
        RemovalMethod::ContourDetection,
        RemovalMethod::Threshold,
        RemovalMethod::ChromaKey,
        RemovalMethod::GrabCut,
        RemovalMethod::NeuralNetwork,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RemovalMethod::ContourDetection => "contour_detection",
            RemovalMethod::Threshold => "threshold",
            RemovalMethod::ChromaKey => "chroma_key",
            RemovalMethod::GrabCut => "grab_cut",
            RemovalMethod::Combined => "combined",
            RemovalMethod::NeuralNetwork => "neural_network",
        }
    }

    /// Whether the white-border gate applies to this method.
    pub fn is_gated(self) -> bool {
        !matches!(self, RemovalMethod::GrabCut | RemovalMethod::NeuralNetwork)
    }
}

impl fmt::Display for RemovalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown removal method: {0} (expected one of combined, contour_detection, threshold, chroma_key, grab_cut, neural_network)")]
pub struct UnknownMethod(pub String);

impl FromStr for RemovalMethod {
    type Err = UnknownMethod;

    /// Accepts snake_case or kebab-case names, case-insensitive, plus a few
    /// short aliases (`contour`, `chroma`, `grabcut`, `neural`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "combined" => Ok(RemovalMethod::Combined),
            "contour_detection" | "contour" => Ok(RemovalMethod::ContourDetection),
            "threshold" => Ok(RemovalMethod::Threshold),
            "chroma_key" | "chroma" => Ok(RemovalMethod::ChromaKey),
            "grab_cut" | "grabcut" => Ok(RemovalMethod::GrabCut),
            "neural_network" | "neural" => Ok(RemovalMethod::NeuralNetwork),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Why a removal strategy could not produce a mask.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemovalDegradation {
    #[error("image has no pixels")]
    EmptyImage,
    #[error("image {width}x{height} is too small for the GrabCut seed rectangle")]
    ImageTooSmall { width: u32, height: u32 },
    #[error("no segmentation model configured")]
    ModelUnavailable,
    #[error("segmentation model '{model}' failed: {reason}")]
    ModelFailed { model: String, reason: String },
}

/// True when at least `coverage` of the border pixels are at or above
/// `threshold` brightness.
///
/// The border is the top and bottom rows plus the left and right columns
/// with each corner counted once.
pub fn has_removable_background(gray: &GrayImage, threshold: u8, coverage: f64) -> bool {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return false;
    }
    let mut border: Vec<(u32, u32)> = (0..w).map(|x| (x, 0)).collect();
    if h > 1 {
        border.extend((0..w).map(|x| (x, h - 1)));
    }
    for y in 1..h.saturating_sub(1) {
        border.push((0, y));
        if w > 1 {
            border.push((w - 1, y));
        }
    }

    let white = border
        .iter()
        .filter(|&&(x, y)| gray.get_pixel(x, y)[0] >= threshold)
        .count();
    white as f64 / border.len() as f64 >= coverage
}

/// Original colors with every pixel fully opaque.
pub fn opaque_passthrough(image: &RgbaImage) -> RgbaImage {
    opaque(image)
}

/// One-shot removal with default settings. Never fails.
pub fn remove_background(image: &RgbaImage, method: RemovalMethod) -> RgbaImage {
    BackgroundRemover::new(method).remove_background(image)
}

/// Configured removal engine. Holds no per-call state, so one instance can be
/// shared across threads for a whole batch.
#[derive(Clone)]
pub struct BackgroundRemover {
    method: RemovalMethod,
    white_threshold: u8,
    white_coverage: f64,
    grabcut_iterations: u32,
    model: Option<Arc<dyn SegmentationModel>>,
}

impl fmt::Debug for BackgroundRemover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundRemover")
            .field("method", &self.method)
            .field("white_threshold", &self.white_threshold)
            .field("white_coverage", &self.white_coverage)
            .field("grabcut_iterations", &self.grabcut_iterations)
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}

impl Default for BackgroundRemover {
    fn default() -> Self {
        Self::new(RemovalMethod::default())
    }
}

impl BackgroundRemover {
    pub fn new(method: RemovalMethod) -> Self {
        Self {
            method,
            white_threshold: DEFAULT_WHITE_THRESHOLD,
            white_coverage: DEFAULT_WHITE_COVERAGE,
            grabcut_iterations: DEFAULT_GRABCUT_ITERATIONS,
            model: None,
        }
    }

    pub fn with_gate(mut self, white_threshold: u8, white_coverage: f64) -> Self {
        self.white_threshold = white_threshold;
        self.white_coverage = white_coverage;
        self
    }

    pub fn with_grabcut_iterations(mut self, iterations: u32) -> Self {
        self.grabcut_iterations = iterations.max(1);
        self
    }

    pub fn with_model(mut self, model: Arc<dyn SegmentationModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn method(&self) -> RemovalMethod {
        self.method
    }

    /// The white-border gate with this remover's thresholds.
    pub fn has_removable_background(&self, gray: &GrayImage) -> bool {
        has_removable_background(gray, self.white_threshold, self.white_coverage)
    }

    /// Run the configured strategy.
    ///
    /// Returns the image with its alpha replaced by the foreground mask, the
    /// image made fully opaque when the gate finds no removable background,
    /// or the reason the strategy could not run.
    pub fn try_remove(&self, image: &RgbaImage) -> Result<RgbaImage, RemovalDegradation> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RemovalDegradation::EmptyImage);
        }

        let mask = match self.method {
            RemovalMethod::GrabCut => grabcut::grabcut_mask(image, self.grabcut_iterations)?,
            RemovalMethod::NeuralNetwork => {
                let model = self
                    .model
                    .as_deref()
                    .ok_or(RemovalDegradation::ModelUnavailable)?;
                neural::neural_mask(model, image)?
            }
            gated => {
                let gray = to_gray(image);
                if !self.has_removable_background(&gray) {
                    debug!(method = %gated, "Border is not white; keeping image opaque");
                    return Ok(opaque(image));
                }
                match gated {
                    RemovalMethod::ContourDetection => combined::contour_mask(&gray),
                    RemovalMethod::Threshold => combined::threshold_mask(&gray),
                    RemovalMethod::ChromaKey => chroma::chroma_mask(image),
                    _ => combined::combined_mask(&gray),
                }
            }
        };

        debug!(
            method = %self.method,
            coverage = mask::coverage(&mask),
            "Foreground mask ready"
        );
        Ok(apply_as_alpha(image, &mask))
    }

    /// Best-effort removal: any degradation yields an opaque passthrough.
    pub fn remove_background(&self, image: &RgbaImage) -> RgbaImage {
        match self.try_remove(image) {
            Ok(result) => result,
            Err(reason) => {
                warn!(method = %self.method, %reason, "Background removal degraded to passthrough");
                opaque_passthrough(image)
            }
        }
    }
}
