//! End-to-end batch tests against real files.
//!
//! Sources are synthesized into a temp directory, processed with the
//! production backend, and the written PNGs are decoded and inspected.

use image::{ColorType, DynamicImage, GenericImageView, Rgb, RgbImage};
use logocraft::formats::FormatCatalog;
use logocraft::imaging::{PngCompression, RustBackend};
use logocraft::process::Processor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const INK: Rgb<u8> = Rgb([20, 20, 20]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const SKY: Rgb<u8> = Rgb([100, 150, 220]);

fn processor() -> Processor<'static, RustBackend> {
    Processor::new(RustBackend::new(), FormatCatalog::standard())
        .with_compression(PngCompression::Fast)
}

fn write_source(dir: &Path, name: &str, image: RgbImage) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgb8(image).save(&path).unwrap();
    path
}

/// Dark square mark on white, the typical flat logo.
fn flat_logo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let inside = (width / 4..3 * width / 4).contains(&x)
            && (height / 4..3 * height / 4).contains(&y);
        if inside { INK } else { WHITE }
    })
}

/// White canvas with a thick dark square frame and a white interior.
fn framed_square(size: u32) -> RgbImage {
    let outer = size / 10..size - size / 10;
    let inner = 3 * size / 10..size - 3 * size / 10;
    RgbImage::from_fn(size, size, |x, y| {
        let in_outer = outer.contains(&x) && outer.contains(&y);
        let in_inner = inner.contains(&x) && inner.contains(&y);
        if in_outer && !in_inner { INK } else { WHITE }
    })
}

#[test]
fn one_bad_format_does_not_stop_the_rest() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "logo.png", flat_logo(600, 400));
    let out = tmp.path().join("assets");

    let requested = ["LOGO", "FEATURE_GRAPHIC", "WATERMARK", "DEFAULT", "PUSH"];
    let results = processor().process_batch(&source, &out, &requested, false);

    assert_eq!(results.len(), 5);
    let failed: Vec<_> = results.iter().filter(|r| !r.is_success()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].format_id, "WATERMARK");

    let catalog = FormatCatalog::standard();
    for result in results.iter().filter(|r| r.is_success()) {
        let spec = catalog.lookup(&result.format_id).unwrap();
        let path = result.output_path().unwrap();
        assert_eq!(path, out.join(format!("{}.PNG", spec.id)));
        let written = image::open(path).unwrap();
        assert_eq!(written.dimensions(), (spec.width, spec.height), "{}", spec.id);
    }
}

#[test]
fn undersized_source_fails_every_format_and_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "tiny.png", flat_logo(10, 10));
    let out = tmp.path().join("assets");

    let results = processor().process_batch(&source, &out, &["APPICON", "LOGO", "PUSH"], true);
    assert_eq!(results.len(), 3);
    for result in &results {
        let message = result.error_message().unwrap();
        assert!(message.contains("Image too small: 10x10"), "{message}");
    }
    assert!(!out.join("APPICON.PNG").exists());
}

#[test]
fn unsupported_extension_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("logo.webp");
    std::fs::write(&source, b"RIFF").unwrap();

    let result = processor().process_one(&source, tmp.path(), "LOGO", false);
    assert!(
        result
            .error_message()
            .unwrap()
            .contains("Unsupported file type 'webp'")
    );
}

#[test]
fn wide_source_on_splash_is_full_width_and_vertically_centered() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "banner.png", RgbImage::from_pixel(2000, 800, SKY));

    let result = processor().process_one(&source, tmp.path(), "DEFAULT", false);
    let written = image::open(result.output_path().unwrap()).unwrap();
    assert_eq!(written.dimensions(), (1242, 1902));
    assert_eq!(written.color(), ColorType::Rgb8);
    let rgb = written.to_rgb8();

    let is_white = |y: u32| *rgb.get_pixel(621, y) == WHITE;
    let first = (0..1902).find(|&y| !is_white(y)).unwrap();
    let last = (0..1902).rev().find(|&y| !is_white(y)).unwrap();
    let top_margin = first;
    let bottom_margin = 1901 - last;
    assert!(
        top_margin.abs_diff(bottom_margin) <= 1,
        "top {top_margin} bottom {bottom_margin}"
    );

    // Content spans the whole width
    let mid = (first + last) / 2;
    assert_ne!(*rgb.get_pixel(0, mid), WHITE);
    assert_ne!(*rgb.get_pixel(1241, mid), WHITE);
}

#[test]
fn push_from_framed_square_is_monochrome_glyph() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "mark.png", framed_square(500));

    let result = processor().process_one(&source, tmp.path(), "PUSH", true);
    let written = image::open(result.output_path().unwrap()).unwrap();
    assert_eq!(written.dimensions(), (96, 96));
    assert_eq!(written.color(), ColorType::Rgba8);
    let rgba = written.to_rgba8();

    assert!(rgba.pixels().any(|p| p[3] == 0), "no transparent pixel");
    assert!(rgba.pixels().any(|p| p[3] == 255), "no opaque pixel");
    assert!(rgba.pixels().any(|p| p.0[..3] == [0, 0, 0]), "no black stroke");
    assert!(
        rgba.pixels().any(|p| p.0[..3] == [255, 255, 255]),
        "no white fill"
    );

    // Outside the frame was keyed out; the frame itself is an opaque stroke
    assert_eq!(rgba.get_pixel(2, 2)[3], 0);
    let frame = rgba.get_pixel(19, 48);
    assert_eq!(frame.0, [0, 0, 0, 255]);
}

#[test]
fn push_keys_out_white_background_without_the_flag() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "mark.png", framed_square(500));

    let result = processor().process_one(&source, tmp.path(), "PUSH", false);
    let rgba = image::open(result.output_path().unwrap()).unwrap().to_rgba8();
    assert_eq!(rgba.dimensions(), (96, 96));
    assert_eq!(rgba.get_pixel(2, 2)[3], 0);
    assert!(rgba.pixels().any(|p| p[3] == 255));
}

#[test]
fn push_from_coloured_background_stays_opaque() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "banner.png", RgbImage::from_pixel(300, 300, SKY));

    let result = processor().process_one(&source, tmp.path(), "PUSH", false);
    let rgba = image::open(result.output_path().unwrap()).unwrap().to_rgba8();
    assert!(rgba.pixels().all(|p| p[3] == 255));
}

#[test]
fn transparent_logo_keeps_mark_and_drops_background() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "logo.png", flat_logo(400, 400));

    let result = processor().process_one(&source, tmp.path(), "LOGO", true);
    let written = image::open(result.output_path().unwrap()).unwrap();
    assert_eq!(written.color(), ColorType::Rgba8);
    let rgba = written.to_rgba8();

    assert_eq!(rgba.get_pixel(5, 5)[3], 0);
    let centre = rgba.get_pixel(512, 512);
    assert_eq!(centre[3], 255);
    assert_eq!(centre.0[..3], INK.0);
}

#[test]
fn opaque_formats_ignore_background_removal() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "logo.png", flat_logo(400, 400));

    let result = processor().process_one(&source, tmp.path(), "FEATURE_GRAPHIC", true);
    let written = image::open(result.output_path().unwrap()).unwrap();
    assert_eq!(written.color(), ColorType::Rgb8);
    assert_eq!(*written.to_rgb8().get_pixel(2, 2), WHITE);
}

#[test]
fn jfif_source_is_accepted() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.jfif");
    DynamicImage::ImageRgb8(flat_logo(300, 200))
        .save_with_format(&path, image::ImageFormat::Jpeg)
        .unwrap();

    let result = processor().process_one(&path, tmp.path(), "APPICON", false);
    assert!(result.is_success(), "{:?}", result);
}

#[test]
fn rerun_overwrites_previous_output() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "logo.png", flat_logo(300, 300));
    let p = processor();

    let first = p.process_one(&source, tmp.path(), "APPICON", false);
    let second = p.process_one(&source, tmp.path(), "APPICON", true);
    assert_eq!(first.output_path(), second.output_path());
    let written = image::open(second.output_path().unwrap()).unwrap().to_rgba8();
    // Second run removed the background
    assert_eq!(written.get_pixel(1, 1)[3], 0);
    assert!(!tmp.path().join("APPICON.PNG.partial").exists());
}

#[test]
fn report_serializes_every_result() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "logo.png", flat_logo(300, 300));
    let results = processor().process_batch(&source, tmp.path(), &["LOGO", "NOPE"], false);

    let json: serde_json::Value = serde_json::to_value(&results).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["format_id"], "LOGO");
    assert_eq!(entries[0]["status"], "success");
    assert_eq!(entries[1]["status"], "failed");
    assert_eq!(
        entries[1]["error_message"],
        "Unknown format identifier: NOPE"
    );
}
