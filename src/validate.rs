//! Source image validation.
//!
//! Every check here runs before any pixel data is decoded: the file itself
//! (existence, extension, byte size) first, then the image header for
//! dimensions.

use std::path::Path;
use thiserror::Error;

use crate::imaging::{Dimensions, ImageBackend, supported_input_extensions};

pub const DEFAULT_MIN_DIMENSION: u32 = 90;
pub const DEFAULT_MAX_DIMENSION: u32 = 5000;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Input file not found: {0}")]
    NotFound(String),
    #[error("Input path is not a file: {0}")]
    NotAFile(String),
    #[error("Unsupported file type '{extension}' (allowed: {allowed})")]
    UnsupportedExtension { extension: String, allowed: String },
    #[error("File too large: {size} bytes (max {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },
    #[error("Cannot read image header: {0}")]
    Unreadable(String),
    #[error("Image too small: {width}x{height} (minimum {min}px per side)")]
    TooSmall { width: u32, height: u32, min: u32 },
    #[error("Image too large: {width}x{height} (maximum {max}px per side)")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// Bounds a source image must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub min_dimension: u32,
    pub max_dimension: u32,
    pub max_file_size: u64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_dimension: DEFAULT_MIN_DIMENSION,
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Lowercase extension check against the accepted input set.
pub fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| supported_input_extensions().contains(&e.as_str()))
}

/// Validate `path` as a source image and return its dimensions.
pub fn validate_source(
    backend: &impl ImageBackend,
    path: &Path,
    limits: &ValidationLimits,
) -> Result<Dimensions, ValidationError> {
    let display = path.display().to_string();
    let meta = std::fs::metadata(path).map_err(|_| ValidationError::NotFound(display.clone()))?;
    if !meta.is_file() {
        return Err(ValidationError::NotAFile(display));
    }

    if !has_allowed_extension(path) {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        let allowed = supported_input_extensions()
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(" ");
        return Err(ValidationError::UnsupportedExtension { extension, allowed });
    }

    if meta.len() > limits.max_file_size {
        return Err(ValidationError::FileTooLarge {
            size: meta.len(),
            max: limits.max_file_size,
        });
    }

    let dims = backend
        .identify(path)
        .map_err(|e| ValidationError::Unreadable(e.to_string()))?;
    check_dimensions(dims, limits)?;
    Ok(dims)
}

/// Both sides must fall within `[min_dimension, max_dimension]`.
pub fn check_dimensions(
    dims: Dimensions,
    limits: &ValidationLimits,
) -> Result<(), ValidationError> {
    let Dimensions { width, height } = dims;
    if width < limits.min_dimension || height < limits.min_dimension {
        return Err(ValidationError::TooSmall {
            width,
            height,
            min: limits.min_dimension,
        });
    }
    if width > limits.max_dimension || height > limits.max_dimension {
        return Err(ValidationError::TooLarge {
            width,
            height,
            max: limits.max_dimension,
        });
    }
    Ok(())
}
