//! Shared test utilities for the logocraft test suite.
//!
//! Synthetic source images and small lookup helpers used by the removal,
//! orchestration, and output tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let source = write_png(tmp.path(), "logo.png", &white_background_logo(400, 300));
//!
//! let results = processor.process_batch(&source, tmp.path(), &["LOGO"], true);
//! assert!(find_result(&results, "LOGO").is_success());
//! ```

use image::{DynamicImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::process::ProcessingResult;

pub const LOGO_INK: Rgba<u8> = Rgba([20, 40, 90, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const SKY: Rgba<u8> = Rgba([100, 150, 220, 255]);

// =========================================================================
// Synthetic sources
// =========================================================================

/// A centred dark square covering the middle half of each axis on `background`.
pub fn centered_square(width: u32, height: u32, background: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let inside = (width / 4..3 * width / 4).contains(&x)
            && (height / 4..3 * height / 4).contains(&y);
        if inside { LOGO_INK } else { background }
    })
}

/// Typical flat logo: dark mark on a pure white canvas.
pub fn white_background_logo(width: u32, height: u32) -> RgbaImage {
    centered_square(width, height, WHITE)
}

/// Same mark on a saturated sky-blue canvas (nothing for the gate to key out).
pub fn colored_border_logo(width: u32, height: u32) -> RgbaImage {
    centered_square(width, height, SKY)
}

/// Encode `image` as PNG into `dir/name` and return the path.
pub fn write_png(dir: &Path, name: &str, image: &RgbaImage) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgba8(image.clone())
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
    path
}

// =========================================================================
// Result lookups (panic with a clear message on miss)
// =========================================================================

/// Find the result for a format identifier. Panics if not found.
pub fn find_result<'a>(results: &'a [ProcessingResult], format_id: &str) -> &'a ProcessingResult {
    results
        .iter()
        .find(|r| r.format_id == format_id)
        .unwrap_or_else(|| {
            let ids: Vec<&str> = results.iter().map(|r| r.format_id.as_str()).collect();
            panic!("result '{format_id}' not found. Available: {ids:?}")
        })
}

/// Format identifiers of all results, in order.
pub fn result_ids(results: &[ProcessingResult]) -> Vec<&str> {
    results.iter().map(|r| r.format_id.as_str()).collect()
}
