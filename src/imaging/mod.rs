//! Image processing: pure Rust, built on `image` and `imageproc`.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify / decode** | `image::ImageReader` (content-sniffed) |
//! | **Canvas fit** | `thumbnail` pre-shrink + `resize` (Lanczos3) + `overlay` |
//! | **Blur / edges / Otsu** | `imageproc::filter`, `imageproc::edges`, `imageproc::contrast` |
//! | **Morphology** | `imageproc::morphology` (`Mask` + `grayscale_*`) |
//! | **Contours** | `imageproc::contours` + `imageproc::drawing` |
//! | **Encode → PNG** | `image::codecs::png::PngEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for placement math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Canvas fit and resampling on in-memory buffers
//! - **Mask / contours**: binary-mask primitives for background removal
//! - **Stylize**: the notification-icon glyph treatment

pub mod backend;
pub mod calculations;
pub mod contours;
pub mod mask;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod stylize;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{fit_to_canvas, resize_exact, with_channels};
pub use params::{FitParams, PngCompression, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
pub use stylize::stylize;
