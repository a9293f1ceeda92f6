//! Pure calculation functions for canvas placement.
//!
//! All functions here are pure and testable without any I/O or images.

/// Factor applied to each side for the box pre-shrink of a progressive downscale (√0.5).
pub const PROGRESSIVE_FACTOR: f64 = 0.707;

/// Scale factors below this trigger the progressive downscale.
pub const PROGRESSIVE_THRESHOLD: f64 = 0.5;

/// Where a scaled source lands on a target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Scaled content width.
    pub width: u32,
    /// Scaled content height.
    pub height: u32,
    /// Offset of the content from the canvas's left edge.
    pub left: u32,
    /// Offset of the content from the canvas's top edge.
    pub top: u32,
}

/// Calculate the largest size that fits inside `target` without cropping,
/// preserving the source aspect ratio, and center it.
///
/// The side that is relatively longer matches the target exactly; the other
/// is rounded to the nearest pixel (never below 1). Odd residual pixels go to
/// the right/bottom margin.
///
/// # Examples
/// ```
/// # use logocraft::imaging::calculations::calculate_fit;
/// // 2000x800 onto a 1242x1902 splash: full width, vertically centered
/// let p = calculate_fit((2000, 800), (1242, 1902));
/// assert_eq!((p.width, p.height, p.left, p.top), (1242, 497, 0, 702));
/// ```
pub fn calculate_fit(source: (u32, u32), target: (u32, u32)) -> Placement {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let img_ratio = src_w as f64 / src_h.max(1) as f64;
    let target_ratio = tgt_w as f64 / tgt_h.max(1) as f64;

    let (width, height) = if img_ratio > target_ratio {
        // Source is relatively wider: width matches
        let h = (tgt_w as f64 / img_ratio).round() as u32;
        (tgt_w, h.clamp(1, tgt_h.max(1)))
    } else {
        // Source is relatively taller (or equal): height matches
        let w = (tgt_h as f64 * img_ratio).round() as u32;
        (w.clamp(1, tgt_w.max(1)), tgt_h)
    };

    Placement {
        width,
        height,
        left: (tgt_w - width) / 2,
        top: (tgt_h - height) / 2,
    }
}

/// Uniform scale factor from source to placed content.
pub fn scale_factor(source: (u32, u32), placement: &Placement) -> f64 {
    let sx = placement.width as f64 / source.0.max(1) as f64;
    let sy = placement.height as f64 / source.1.max(1) as f64;
    sx.min(sy)
}

/// Intermediate size for the box pre-shrink, or `None` when the scale factor
/// does not call for a progressive downscale.
pub fn progressive_intermediate(source: (u32, u32), scale: f64) -> Option<(u32, u32)> {
    if scale >= PROGRESSIVE_THRESHOLD {
        return None;
    }
    let w = ((source.0 as f64 * PROGRESSIVE_FACTOR) as u32).max(1);
    let h = ((source.1 as f64 * PROGRESSIVE_FACTOR) as u32).max(1);
    Some((w, h))
}
