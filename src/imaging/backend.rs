//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three operations the orchestrator
//! needs from the outside world: identify (header-only dimensions), load
//! (full decode) and save (final PNG encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so orchestration logic runs without codecs.

use super::params::PngCompression;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image I/O backends.
///
/// `Sync` so one backend can serve rayon's parallel per-format loop.
pub trait ImageBackend: Sync {
    /// Get image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode the full image.
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode `image` as PNG at `path`.
    ///
    /// Implementations must not leave a partially written file at `path` when
    /// encoding fails.
    fn save_png(
        &self,
        image: &DynamicImage,
        path: &Path,
        compression: PngCompression,
    ) -> Result<(), BackendError>;
}
