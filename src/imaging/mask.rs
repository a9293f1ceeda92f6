//! Binary mask helpers.
//!
//! A mask is a [`GrayImage`] of the same size as its source where 255 marks
//! foreground and 0 marks background. Every helper returns a new buffer.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::map::map_colors2;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Grayscale view of an RGBA buffer (ITU-R BT.601 luma, alpha ignored).
pub fn to_gray(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Fixed-level threshold: pixels strictly above `level` become foreground,
/// or background when `inverse` is set.
pub fn binarize(gray: &GrayImage, level: u8, inverse: bool) -> GrayImage {
    let mut out = gray.clone();
    for p in out.pixels_mut() {
        let above = p[0] > level;
        p[0] = if above != inverse { FOREGROUND } else { BACKGROUND };
    }
    out
}

/// Pixelwise logical OR of two masks.
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |p, q| Luma([p[0] | q[0]]))
}

pub fn invert(mask: &GrayImage) -> GrayImage {
    let mut out = mask.clone();
    image::imageops::invert(&mut out);
    out
}

/// Number of foreground pixels.
pub fn count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] != BACKGROUND).count()
}

/// Fraction of foreground pixels in `[0, 1]`.
pub fn coverage(mask: &GrayImage) -> f64 {
    let total = mask.width() as usize * mask.height() as usize;
    if total == 0 {
        return 0.0;
    }
    count(mask) as f64 / total as f64
}

/// True when every foreground pixel of `other` is also foreground in `mask`.
pub fn is_superset_of(mask: &GrayImage, other: &GrayImage) -> bool {
    mask.dimensions() == other.dimensions()
        && mask
            .pixels()
            .zip(other.pixels())
            .all(|(m, o)| o[0] == BACKGROUND || m[0] != BACKGROUND)
}

/// Copy `mask` into the alpha channel of `image`, keeping its colors.
pub fn apply_as_alpha(image: &RgbaImage, mask: &GrayImage) -> RgbaImage {
    map_colors2(image, mask, |p, m| Rgba([p[0], p[1], p[2], m[0]]))
}

/// The alpha channel of an RGBA buffer as a mask-shaped image.
pub fn alpha_channel(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[3]])
    })
}

/// Force every pixel fully opaque.
pub fn opaque(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for p in out.pixels_mut() {
        p[3] = 255;
    }
    out
}
