//! Learned segmentation behind an injected model.
//!
//! logocraft ships no model weights. Callers that want the NeuralNetwork
//! method provide a [`SegmentationModel`]; without one the method degrades
//! to an opaque passthrough.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use super::RemovalDegradation;
use crate::imaging::mask::binarize;

/// Matte values at or above this are foreground.
const MATTE_CUTOFF: u8 = 128;

/// A foreground matte predictor.
///
/// `Send + Sync` so one loaded model can serve every format of a batch,
/// including under rayon.
pub trait SegmentationModel: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Predict a foreground matte (0 = background, 255 = foreground).
    /// The matte may have any size; it is resized to the input.
    fn predict(
        &self,
        image: &RgbImage,
    ) -> Result<GrayImage, Box<dyn std::error::Error + Send + Sync>>;
}

pub fn neural_mask(
    model: &dyn SegmentationModel,
    image: &RgbaImage,
) -> Result<GrayImage, RemovalDegradation> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let matte = model
        .predict(&rgb)
        .map_err(|e| RemovalDegradation::ModelFailed {
            model: model.name().to_string(),
            reason: e.to_string(),
        })?;
    if matte.width() == 0 || matte.height() == 0 {
        return Err(RemovalDegradation::ModelFailed {
            model: model.name().to_string(),
            reason: "empty matte".to_string(),
        });
    }

    let matte = if matte.dimensions() == image.dimensions() {
        matte
    } else {
        imageops::resize(&matte, image.width(), image.height(), FilterType::Triangle)
    };
    Ok(binarize(&matte, MATTE_CUTOFF - 1, false))
}
