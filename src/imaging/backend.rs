//! Codec backend trait and shared error type.
//!
//! The [`ImageBackend`] trait covers everything that touches encoded bytes on
//! disk: identify (header-only size read), decode, and encode. The pixel work
//! in [`pipeline`](super::pipeline) never sees a file.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust JPEG codec.

use super::dimension::Dimension;
use super::params::Quality;
use image::{DynamicImage, GrayImage};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },
}

/// Trait for codec backends.
///
/// `Sync` so a single backend can be shared by reference wherever the driver
/// needs it.
pub trait ImageBackend: Sync {
    /// Read image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimension, BackendError>;

    /// Decode a JPEG file into a pixel grid.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode a grayscale grid as JPEG and write it to `path`.
    fn encode(&self, image: &GrayImage, path: &Path, quality: Quality) -> Result<(), BackendError>;
}
