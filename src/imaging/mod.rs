//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Decode / encode** | `image` JPEG codec |
//! | **Crop** | `DynamicImage::crop_imm` at a computed window |
//! | **Resize** | `resize_exact` with `Lanczos3` |
//! | **Grayscale** | fixed-point BT.601 luma |
//!
//! The module is split into:
//! - **Dimension**: [`Dimension`] value type
//! - **Calculations**: Pure functions for aspect and crop math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Pipeline**: [`transform`]: validate, crop, resize, grayscale
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod dimension;
mod params;
pub mod pipeline;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{aspect_ratio_pct, calculate_crop_window, needs_resize};
pub use dimension::Dimension;
pub use params::{
    CropWindow, DEFAULT_DESIRED_DIMENSION, DEFAULT_MAX_PIXEL_DIFF_RATIO, MAX_DESIRED_DIMENSION,
    PipelineConfig, Quality,
};
pub use pipeline::{Outcome, Rejection, RejectionReason, transform, validate};
pub use rust_backend::{RustBackend, is_supported_image, supported_input_extensions};
