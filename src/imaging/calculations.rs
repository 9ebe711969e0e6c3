//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::dimension::Dimension;
use super::params::CropWindow;

/// Percentage by which the longer side exceeds the shorter one.
///
/// Computed as `(max - min) * 100 / min` in integers, which is
/// `(max / min - 1) * 100` truncated toward zero without float rounding.
/// Returns `None` when the shorter side is zero.
///
/// # Examples
/// ```
/// # use squaregray::imaging::{Dimension, aspect_ratio_pct};
/// assert_eq!(aspect_ratio_pct(Dimension::new(140, 100)), Some(40));
/// assert_eq!(aspect_ratio_pct(Dimension::new(141, 100)), Some(41));
/// assert_eq!(aspect_ratio_pct(Dimension::new(0, 100)), None);
/// ```
pub fn aspect_ratio_pct(dim: Dimension) -> Option<u64> {
    let min = u64::from(dim.min());
    if min == 0 {
        return None;
    }
    let max = u64::from(dim.max());
    Some((max - min) * 100 / min)
}

/// Calculate the center-crop window that turns `dim` into a square.
///
/// Returns `None` for images that are already square. The anchor is the
/// top-left corner of the window; when the excess is odd the leftover pixel
/// stays on the bottom (portrait) or right (landscape) edge.
pub fn calculate_crop_window(dim: Dimension) -> Option<CropWindow> {
    if dim.is_square() {
        return None;
    }
    let side = dim.min();
    let excess = (dim.max() - side) / 2;
    let (x, y) = if dim.is_portrait() {
        (0, excess)
    } else {
        (excess, 0)
    };
    Some(CropWindow { x, y, side })
}

/// Whether a grid of `dim` must be resampled to reach `target × target`.
pub fn needs_resize(dim: Dimension, target: u32) -> bool {
    dim.width != target || dim.height != target
}
