//! Background-removal behaviour through the public API.

use image::{Rgba, RgbaImage};
use logocraft::imaging::mask::{alpha_channel, count, is_superset_of};
use logocraft::removal::{BackgroundRemover, RemovalMethod, remove_background};

const INK: Rgba<u8> = Rgba([30, 30, 120, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const ORANGE: Rgba<u8> = Rgba([230, 120, 20, 255]);

/// Filled disc plus a separate bar, on `background`.
fn two_shapes(size: u32, background: Rgba<u8>) -> RgbaImage {
    let c = size as f64 / 2.0;
    let r = size as f64 / 4.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let (dx, dy) = (x as f64 - c, y as f64 - c * 0.8);
        let in_disc = dx * dx + dy * dy <= r * r;
        let in_bar = (size / 5..4 * size / 5).contains(&x)
            && (8 * size / 10..17 * size / 20).contains(&y);
        if in_disc || in_bar { INK } else { background }
    })
}

const GATED: [RemovalMethod; 4] = [
    RemovalMethod::Combined,
    RemovalMethod::ContourDetection,
    RemovalMethod::Threshold,
    RemovalMethod::ChromaKey,
];

#[test]
fn coloured_background_is_returned_unchanged() {
    let img = two_shapes(200, ORANGE);
    for method in GATED {
        let out = remove_background(&img, method);
        assert_eq!(out, img, "{method}");
    }
}

#[test]
fn partly_white_border_below_coverage_is_unchanged() {
    // Left 15% of the image is orange: well under 90% white border.
    let img = RgbaImage::from_fn(200, 200, |x, _| if x < 30 { ORANGE } else { WHITE });
    let out = remove_background(&img, RemovalMethod::Combined);
    assert!(out.pixels().all(|p| p[3] == 255));
}

#[test]
fn white_background_is_keyed_out_by_every_gated_method() {
    let img = two_shapes(200, WHITE);
    for method in GATED {
        let out = remove_background(&img, method);
        assert_eq!(out.dimensions(), img.dimensions());
        assert_eq!(out.get_pixel(3, 3)[3], 0, "{method} corner");
        // Disc centre
        assert_eq!(out.get_pixel(100, 80)[3], 255, "{method} disc");
        // Colors are never altered
        for (a, b) in out.pixels().zip(img.pixels()) {
            assert_eq!(a.0[..3], b.0[..3]);
        }
    }
}

#[test]
fn combined_output_is_stable_when_reprocessed() {
    let img = two_shapes(240, WHITE);
    let first = remove_background(&img, RemovalMethod::Combined);
    let second = remove_background(&first, RemovalMethod::Combined);

    let (m1, m2) = (alpha_channel(&first), alpha_channel(&second));
    assert!(is_superset_of(&m2, &m1), "second pass eroded the mask");
    let (c1, c2) = (count(&m1) as f64, count(&m2) as f64);
    assert!((c2 - c1).abs() / c1 < 0.01, "{c1} vs {c2}");
}

#[test]
fn grabcut_handles_non_white_background() {
    let img = two_shapes(160, ORANGE);
    let out = BackgroundRemover::new(RemovalMethod::GrabCut)
        .with_grabcut_iterations(3)
        .remove_background(&img);
    // Outside the seed rectangle is always background
    assert_eq!(out.get_pixel(2, 2)[3], 0);
    assert_eq!(out.get_pixel(80, 64)[3], 255);
}

#[test]
fn stricter_gate_turns_removal_off() {
    // Light grey border: white enough for 240, not for 250.
    let img = two_shapes(160, Rgba([245, 245, 245, 255]));
    let lenient = BackgroundRemover::new(RemovalMethod::Combined).remove_background(&img);
    assert_eq!(lenient.get_pixel(2, 2)[3], 0);

    let strict = BackgroundRemover::new(RemovalMethod::Combined)
        .with_gate(250, 0.9)
        .remove_background(&img);
    assert!(strict.pixels().all(|p| p[3] == 255));
}

#[test]
fn neural_without_model_passes_through_opaque() {
    let mut img = two_shapes(120, WHITE);
    img.put_pixel(0, 0, Rgba([255, 255, 255, 0]));
    let out = remove_background(&img, RemovalMethod::NeuralNetwork);
    assert!(out.pixels().all(|p| p[3] == 255));
}
