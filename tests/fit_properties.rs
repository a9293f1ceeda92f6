//! Property-based tests for canvas-fit.
//!
//! For every source size and target canvas, the fit must produce exactly the
//! target size, never crop, never distort beyond pixel rounding, and center
//! the content with any odd pixel on the right/bottom.

use image::{DynamicImage, Rgb, RgbImage, Rgba};
use logocraft::formats::FormatCatalog;
use logocraft::imaging::calculations::calculate_fit;
use logocraft::imaging::{FitParams, fit_to_canvas};
use proptest::prelude::*;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Source sizes inside the accepted validation bounds.
fn valid_source() -> impl Strategy<Value = (u32, u32)> {
    (90u32..=5000, 90u32..=5000)
}

/// Catalogue canvases that go through canvas-fit (everything but PUSH).
fn catalog_target() -> impl Strategy<Value = (u32, u32)> {
    let targets: Vec<(u32, u32)> = FormatCatalog::standard()
        .iter()
        .filter(|spec| !spec.is_push())
        .map(|spec| (spec.width, spec.height))
        .collect();
    proptest::sample::select(targets)
}

/// Small sizes so real resampling stays cheap.
fn small_dimensions() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=120, 1u32..=120)
}

proptest! {
    #[test]
    fn placement_fits_inside_target(source in valid_source(), target in catalog_target()) {
        let p = calculate_fit(source, target);
        prop_assert!(p.width <= target.0 && p.height <= target.1);
        prop_assert!(p.left + p.width <= target.0);
        prop_assert!(p.top + p.height <= target.1);
        // One side always fills the canvas
        prop_assert!(p.width == target.0 || p.height == target.1);
    }

    #[test]
    fn placement_is_centered_with_residual_right_bottom(
        source in valid_source(),
        target in catalog_target(),
    ) {
        let p = calculate_fit(source, target);
        let right = target.0 - p.width - p.left;
        let bottom = target.1 - p.height - p.top;
        prop_assert!(right == p.left || right == p.left + 1);
        prop_assert!(bottom == p.top || bottom == p.top + 1);
    }

    #[test]
    fn placement_preserves_aspect_ratio(source in valid_source(), target in catalog_target()) {
        let p = calculate_fit(source, target);
        let source_ratio = source.0 as f64 / source.1 as f64;
        let placed_ratio = p.width as f64 / p.height as f64;
        let relative_error = (placed_ratio - source_ratio).abs() / source_ratio;
        let bound = 1.0 / p.width.min(p.height) as f64;
        prop_assert!(
            relative_error < bound,
            "source {:?} placed {}x{}: error {} >= {}",
            source, p.width, p.height, relative_error, bound
        );
    }

    #[test]
    fn fit_output_is_exact_target_size(
        source in small_dimensions(),
        target in small_dimensions(),
        progressive in any::<bool>(),
    ) {
        let fill = Rgb([30, 60, 90]);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(source.0, source.1, fill));
        let params = FitParams { progressive, ..FitParams::new(target.0, target.1, WHITE) };
        let canvas = fit_to_canvas(&image, &params);
        prop_assert_eq!(canvas.dimensions(), target);
    }

    #[test]
    fn fit_leaves_margins_as_background(
        source in small_dimensions(),
        target in small_dimensions(),
    ) {
        let black = Rgb([0, 0, 0]);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(source.0, source.1, black));
        let canvas = fit_to_canvas(&image, &FitParams::new(target.0, target.1, WHITE));
        let p = calculate_fit(source, target);
        for (x, y, pixel) in canvas.enumerate_pixels() {
            let inside = (p.left..p.left + p.width).contains(&x)
                && (p.top..p.top + p.height).contains(&y);
            if !inside {
                prop_assert_eq!(*pixel, WHITE, "margin pixel ({}, {})", x, y);
            }
        }
    }
}

#[test]
fn degenerate_strips_fill_their_axis() {
    // 5000x90 and 90x5000 are the extreme accepted shapes.
    let wide = calculate_fit((5000, 90), (1242, 2688));
    assert_eq!(wide.width, 1242);
    assert_eq!(wide.height, 22);

    let tall = calculate_fit((90, 5000), (1024, 500));
    assert_eq!(tall.height, 500);
    assert_eq!(tall.width, 9);
}
