//! Chroma-key strategy: pixels inside a near-white HSV band are background.

use image::{GrayImage, Luma, RgbaImage};
use imageproc::morphology::{Mask, grayscale_open};

use crate::imaging::mask::{BACKGROUND, FOREGROUND};

/// Inclusive HSV band treated as background, in 8-bit HSV scale
/// (hue 0–180, saturation and value 0–255).
pub const BAND_LOWER: [u8; 3] = [0, 0, 200];
pub const BAND_UPPER: [u8; 3] = [180, 30, 255];

/// 8-bit HSV with hue halved to fit in a byte.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f64, g as f64, b as f64);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = v - min;

    let s = if v == 0.0 { 0.0 } else { 255.0 * delta / v };
    let h = if delta == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / delta
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [
        (h / 2.0).round().min(180.0) as u8,
        s.round() as u8,
        v as u8,
    ]
}

fn in_band(hsv: [u8; 3]) -> bool {
    hsv.iter()
        .zip(BAND_LOWER.iter().zip(BAND_UPPER.iter()))
        .all(|(&c, (&lo, &hi))| (lo..=hi).contains(&c))
}

/// Foreground is everything outside the near-white band, lightly opened to
/// drop single-pixel noise.
pub fn chroma_mask(image: &RgbaImage) -> GrayImage {
    let raw = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        Luma([if in_band(rgb_to_hsv(r, g, b)) {
            BACKGROUND
        } else {
            FOREGROUND
        }])
    });
    grayscale_open(&raw, &Mask::square(1))
}
