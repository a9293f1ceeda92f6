//! Notification-icon stylizer.
//!
//! Turns a (usually background-removed) image into a bold monochrome glyph:
//! black strokes on opaque white, with the source alpha binarized at 128 and
//! kept as the glyph's transparency.
//!
//! Stroke weight adapts to the source: high-contrast artwork gets a light blur
//! and tight edge thresholds, low-contrast artwork a stronger blur and looser
//! thresholds. Before edge detection the grayscale is passed through an
//! edge-preserving bilateral filter so sensor noise and JPEG ringing do not
//! turn into stray strokes at 96 px.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::contrast::otsu_level;
use imageproc::edges::canny;
use imageproc::filter::{bilateral_filter, gaussian_blur_f32};
use imageproc::morphology::{Mask, grayscale_dilate};
use imageproc::stats::histogram;

use super::mask::{self, BACKGROUND, FOREGROUND};

/// Contrast metric above which an image counts as high contrast.
pub const HIGH_CONTRAST_THRESHOLD: f64 = 0.5;

/// Alpha at or above this survives as fully opaque.
const ALPHA_MIDPOINT: u8 = 128;

/// Bilateral denoise: 9 px window, colour and spatial sigma 75.
const DENOISE_WINDOW: u32 = 9;
const DENOISE_SIGMA_COLOR: f32 = 75.0;
const DENOISE_SIGMA_SPATIAL: f32 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StylizeParams {
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
}

impl StylizeParams {
    pub fn high_contrast() -> Self {
        Self {
            blur_sigma: 0.5,
            canny_low: 100.0,
            canny_high: 200.0,
        }
    }

    pub fn low_contrast() -> Self {
        Self {
            blur_sigma: 1.0,
            canny_low: 30.0,
            canny_high: 100.0,
        }
    }

    pub fn for_contrast(metric: f64) -> Self {
        if metric > HIGH_CONTRAST_THRESHOLD {
            Self::high_contrast()
        } else {
            Self::low_contrast()
        }
    }
}

/// Spread of grayscale intensities on a `[0, 1]` scale.
///
/// Twice the population standard deviation of the normalized intensities, so
/// a flat image scores 0 and a half-black, half-white image scores 1.
pub fn contrast_metric(gray: &GrayImage) -> f64 {
    let n = gray.width() as f64 * gray.height() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let counts = histogram(gray).channels[0];
    let mean = counts
        .iter()
        .enumerate()
        .map(|(v, &c)| v as f64 / 255.0 * c as f64)
        .sum::<f64>()
        / n;
    let variance = counts
        .iter()
        .enumerate()
        .map(|(v, &c)| (v as f64 / 255.0 - mean).powi(2) * c as f64)
        .sum::<f64>()
        / n;
    (2.0 * variance.sqrt()).min(1.0)
}

/// Stylize with parameters picked from the image's own contrast.
pub fn stylize(image: &RgbaImage) -> RgbaImage {
    let gray = mask::to_gray(image);
    let params = StylizeParams::for_contrast(contrast_metric(&gray));
    stylize_gray(image, &gray, &params)
}

/// Stylize with explicit parameters.
pub fn stylize_with(image: &RgbaImage, params: &StylizeParams) -> RgbaImage {
    stylize_gray(image, &mask::to_gray(image), params)
}

/// Edge-preserving smoothing of the stylizer's grayscale input.
pub fn denoise(gray: &GrayImage) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    bilateral_filter(gray, DENOISE_WINDOW, DENOISE_SIGMA_COLOR, DENOISE_SIGMA_SPATIAL)
}

/// 2×2 element anchored bottom-right, so strokes grow down and to the right.
fn bolden_element() -> Mask {
    Mask::from_image(&GrayImage::from_pixel(2, 2, Luma([FOREGROUND])), 1, 1)
}

fn stylize_gray(image: &RgbaImage, gray: &GrayImage, params: &StylizeParams) -> RgbaImage {
    let blurred = gaussian_blur_f32(&denoise(gray), params.blur_sigma);
    let binary = mask::binarize(&blurred, otsu_level(&blurred), false);
    let edges = canny(&blurred, params.canny_low, params.canny_high);
    let strokes = mask::invert(&mask::union(&binary, &edges));

    // Fine pass keeps thin strokes and text, second pass boldens.
    let strokes = grayscale_dilate(&strokes, &Mask::square(0));
    let strokes = grayscale_dilate(&strokes, &bolden_element());

    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let value = if strokes.get_pixel(x, y)[0] != BACKGROUND {
            0
        } else {
            255
        };
        let alpha = if image.get_pixel(x, y)[3] >= ALPHA_MIDPOINT {
            255
        } else {
            0
        };
        Rgba([value, value, value, alpha])
    })
}
