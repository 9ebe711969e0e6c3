//! Pure Rust codec backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode | `image::codecs::jpeg::JpegDecoder` |
//! | Encode | `image::codecs::jpeg::JpegEncoder` at the configured quality |

use super::backend::{BackendError, ImageBackend};
use super::dimension::Dimension;
use super::params::Quality;
use image::codecs::jpeg::{JpegDecoder, JpegEncoder};
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// File extensions treated as JPEG input.
const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Returns the image file extensions the backend can decode.
pub fn supported_input_extensions() -> &'static [&'static str] {
    JPEG_EXTENSIONS
}

/// Whether `path` has one of the [`supported_input_extensions`], ignoring case.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            JPEG_EXTENSIONS
                .iter()
                .any(|supported| e.eq_ignore_ascii_case(supported))
        })
}

/// JPEG backend using the `image` crate.
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

fn decode_error(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimension, BackendError> {
        let mut reader = ImageReader::open(path)?;
        reader.set_format(ImageFormat::Jpeg);
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| decode_error(path, e))?;
        Ok(Dimension::new(width, height))
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        let reader = BufReader::new(File::open(path)?);
        let decoder = JpegDecoder::new(reader).map_err(|e| decode_error(path, e))?;
        DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))
    }

    fn encode(&self, image: &GrayImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
        let result = write_jpeg(image, path, quality);
        if result.is_err() {
            // Failed images leave no output behind.
            let _ = std::fs::remove_file(path);
        }
        result
    }
}

fn write_jpeg(image: &GrayImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let mut writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut writer, quality.value())
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::L8,
        )
        .map_err(|e| BackendError::Encode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    writer.flush()?;
    Ok(())
}
