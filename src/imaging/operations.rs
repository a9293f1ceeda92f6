//! High-level pixel operations.
//!
//! These combine the pure placement math in
//! [`calculations`](super::calculations) with the actual resampling and
//! compositing. Every function returns a freshly allocated buffer.

use super::calculations::{calculate_fit, progressive_intermediate, scale_factor};
use super::params::FitParams;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};

/// Scale and center `source` onto a canvas of exactly `params.width × params.height`.
///
/// Aspect ratio is preserved and nothing is cropped. Sources with an alpha
/// channel are composited over the background; opaque sources are pasted as-is.
pub fn fit_to_canvas(source: &DynamicImage, params: &FitParams) -> RgbaImage {
    let dims = source.dimensions();
    let placement = calculate_fit(dims, (params.width, params.height));
    let has_alpha = source.color().has_alpha();

    let mut rgba = source.to_rgba8();
    if params.progressive {
        if let Some((w, h)) = progressive_intermediate(dims, scale_factor(dims, &placement)) {
            rgba = box_downscale(&rgba, w, h);
        }
    }
    let resized = resize_exact(&rgba, placement.width, placement.height);

    let mut canvas = RgbaImage::from_pixel(params.width, params.height, params.background);
    let (x, y) = (placement.left as i64, placement.top as i64);
    if has_alpha {
        imageops::overlay(&mut canvas, &resized, x, y);
    } else {
        imageops::replace(&mut canvas, &resized, x, y);
    }
    canvas
}

/// Plain resize to exact dimensions with Lanczos3. No aspect handling.
pub fn resize_exact(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Area-averaging (box filter) downscale, the cheap first step of a
/// progressive downscale.
pub fn box_downscale(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) || width == 0 || height == 0 {
        return image.clone();
    }
    imageops::thumbnail(image, width, height)
}

/// Convert a finished canvas to the channel layout its format promises.
pub fn with_channels(canvas: RgbaImage, channels: u8) -> DynamicImage {
    let image = DynamicImage::ImageRgba8(canvas);
    if channels == 3 {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image
    }
}
