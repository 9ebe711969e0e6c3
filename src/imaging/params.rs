//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the [`calculations`](super::calculations) (which decide the geometry) and
//! the [`pipeline`](super::pipeline) / [`backend`](super::backend) (which do
//! the pixel and codec work).
//!
//! ## Types
//!
//! - [`PipelineConfig`]: Rejection threshold and target side length for one transform.
//! - [`CropWindow`]: Top-left anchored square region to keep.
//! - [`Quality`]: JPEG encoding quality (1–100, default 75). Clamped on construction.

use serde::Serialize;

/// Default maximum aspect difference, in percent, before an image is rejected.
pub const DEFAULT_MAX_PIXEL_DIFF_RATIO: u32 = 40;

/// Default output side length in pixels.
pub const DEFAULT_DESIRED_DIMENSION: u32 = 32;

/// Largest accepted output side length. The resize allocates the whole target
/// grid at once.
pub const MAX_DESIRED_DIMENSION: u32 = 4096;

/// Settings consumed by [`transform`](super::pipeline::transform).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Largest accepted `(max / min - 1) * 100`, inclusive.
    pub max_pixel_diff_ratio: u32,
    /// Side length of the square output.
    pub desired_dimension: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_pixel_diff_ratio: DEFAULT_MAX_PIXEL_DIFF_RATIO,
            desired_dimension: DEFAULT_DESIRED_DIMENSION,
        }
    }
}

/// A `side × side` crop region whose top-left corner is `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}
