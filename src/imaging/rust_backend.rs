//! Pure Rust image I/O backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (PNG, JPEG/JFIF, GIF, BMP, TIFF) | `image::ImageReader` with content sniffing |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (adaptive filter) |
//!
//! Format detection sniffs file content rather than trusting the extension,
//! so `.jfif` and mislabelled files decode correctly.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::PngCompression;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Input extensions accepted by validation (lowercase, no dot).
const INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "jfif"];

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    INPUT_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<File>>, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)
}

fn compression_type(compression: PngCompression) -> CompressionType {
    match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    }
}

/// Sibling path the encoder writes to before the final rename.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

fn encode_png(
    img: &DynamicImage,
    path: &Path,
    compression: PngCompression,
) -> Result<(), BackendError> {
    let file = File::create(path).map_err(BackendError::Io)?;
    let mut writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(
        &mut writer,
        compression_type(compression),
        FilterType::Adaptive,
    );
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))?;
    writer.flush().map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        open_reader(path)?.decode().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
    }

    fn save_png(
        &self,
        image: &DynamicImage,
        path: &Path,
        compression: PngCompression,
    ) -> Result<(), BackendError> {
        let partial = partial_path(path);
        let written = encode_png(image, &partial, compression)
            .and_then(|()| std::fs::rename(&partial, path).map_err(BackendError::Io));
        if written.is_err() {
            let _ = std::fs::remove_file(&partial);
        }
        written
    }
}
