//! Flat-background strategies: contour detection, Otsu threshold, and the
//! combined pipeline that unions them and cleans up the result.
//!
//! Every stage is a pure function from a grayscale image or mask to a new mask.

use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{Mask, grayscale_close, grayscale_dilate};
use tracing::debug;

use crate::imaging::contours::fill_external;
use crate::imaging::mask::{self, BACKGROUND, FOREGROUND, binarize, union};

/// Sigma matching a 5×5 Gaussian kernel.
pub const BLUR_SIGMA: f32 = 1.1;
pub const CANNY_LOW: f32 = 30.0;
pub const CANNY_HIGH: f32 = 150.0;
pub const EDGE_DILATE_ITERATIONS: u32 = 2;
/// Regions at or below this area (px²) are noise in the contour stage.
pub const MIN_CONTOUR_AREA: f64 = 50.0;
/// Regions at or below this area (px²) are dropped during refinement.
pub const MIN_REFINED_AREA: f64 = 100.0;

/// 5×5 elliptical element: a full 5×3 core with single-pixel caps on the
/// top and bottom rows, anchored at its centre.
pub fn ellipse_5x5() -> Mask {
    let element = GrayImage::from_fn(5, 5, |x, y| {
        let cap = y == 0 || y == 4;
        Luma([if cap && x != 2 { BACKGROUND } else { FOREGROUND }])
    });
    Mask::from_image(&element, 2, 2)
}

/// Edge-based mask: blur, Canny, dilate to close gaps, fill outer contours.
pub fn contour_mask(gray: &GrayImage) -> GrayImage {
    let blurred = gaussian_blur_f32(gray, BLUR_SIGMA);
    let mut edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);
    let square = Mask::square(1);
    for _ in 0..EDGE_DILATE_ITERATIONS {
        edges = grayscale_dilate(&edges, &square);
    }
    fill_external(&edges, MIN_CONTOUR_AREA)
}

/// Intensity-based mask: blur then Otsu binary-inverse (dark content on a
/// light background becomes foreground).
pub fn threshold_mask(gray: &GrayImage) -> GrayImage {
    let blurred = gaussian_blur_f32(gray, BLUR_SIGMA);
    binarize(&blurred, otsu_level(&blurred), true)
}

/// The default pipeline.
pub fn combined_mask(gray: &GrayImage) -> GrayImage {
    let contour = contour_mask(gray);
    let threshold = threshold_mask(gray);
    debug!(
        contour = mask::coverage(&contour),
        threshold = mask::coverage(&threshold),
        "Primary masks"
    );

    let merged = union(&contour, &threshold);
    let closed = grayscale_close(&merged, &ellipse_5x5());
    let refined = fill_external(&closed, MIN_REFINED_AREA);
    let cleaned = grayscale_close(&refined, &Mask::square(1));
    let result = fill_external(&cleaned, MIN_REFINED_AREA);
    debug!(coverage = mask::coverage(&result), "Combined mask");
    result
}
