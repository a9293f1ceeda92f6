//! External contour extraction and filled redraw.
//!
//! Wraps `imageproc::contours` and `imageproc::drawing` so the removal
//! pipeline can say "keep every outer blob larger than N px² and fill it".

use image::{GrayImage, Luma};
use imageproc::contours::{Contour, find_contours};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use super::mask::FOREGROUND;

/// Outer boundaries of every top-level foreground region (holes and regions
/// nested inside holes are skipped).
pub fn external_contours(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c: &Contour<i32>| c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Enclosed area of a closed polygon (shoelace formula).
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}

/// Fill one contour (interior and boundary) into `mask`.
pub fn fill_contour(mask: &mut GrayImage, points: &[Point<i32>]) {
    let mut poly: Vec<Point<i32>> = points.to_vec();
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() >= 3 {
        draw_polygon_mut(mask, &poly, Luma([FOREGROUND]));
    }
    for p in points {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < mask.width() && (p.y as u32) < mask.height() {
            mask.put_pixel(p.x as u32, p.y as u32, Luma([FOREGROUND]));
        }
    }
}

/// New mask with every external contour of `mask` whose area exceeds
/// `min_area` redrawn filled. Interior holes of kept regions are filled too.
pub fn fill_external(mask: &GrayImage, min_area: f64) -> GrayImage {
    let mut out = GrayImage::new(mask.width(), mask.height());
    for contour in external_contours(mask) {
        if polygon_area(&contour) > min_area {
            fill_contour(&mut out, &contour);
        }
    }
    out
}
