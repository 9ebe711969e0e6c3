//! Width/height value type shared by every imaging stage.

use image::GenericImageView;
use serde::Serialize;
use std::fmt;

/// Size of an image or of a region inside one.
///
/// Built once per image from its decoded bounds and never mutated; the
/// derived queries always agree with the stored pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Build from the maximum bound corner of an image whose origin is `(0, 0)`.
    pub fn from_bounds(max_point: (u32, u32)) -> Self {
        let (x, y) = max_point;
        Self::new(x, y)
    }

    /// Dimension of any pixel grid.
    pub fn of(image: &impl GenericImageView) -> Self {
        Self::from_bounds(image.dimensions())
    }

    pub fn min(self) -> u32 {
        self.width.min(self.height)
    }

    pub fn max(self) -> u32 {
        self.width.max(self.height)
    }

    pub fn is_square(self) -> bool {
        self.width == self.height
    }

    pub fn is_portrait(self) -> bool {
        self.width < self.height
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
