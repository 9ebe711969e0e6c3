//! The per-image normalization pipeline.
//!
//! ```text
//! validate ──reject──▶ Rejected
//!    │
//!    ▼
//! center crop (unless square) → resize (unless at target) → luma → Normalized
//! ```
//!
//! Every step takes its grid by value and hands a new one to the next step,
//! so a rejected image is never partially transformed and no state survives
//! between calls. Decoding and encoding live behind
//! [`ImageBackend`](super::backend::ImageBackend); this module only touches
//! pixels already in memory.

use super::calculations::{aspect_ratio_pct, calculate_crop_window, needs_resize};
use super::dimension::Dimension;
use super::params::{CropWindow, PipelineConfig};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use serde::Serialize;
use std::fmt;

/// Why an image was turned away before any pixel work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    /// Longer side exceeds the shorter one by more than the tolerance.
    AspectRatio { ratio_pct: u64, limit: u32 },
    /// Zero width or height.
    Degenerate { dimension: Dimension },
}

/// Sentinel result for an image the pipeline refuses to transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub reason: RejectionReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            RejectionReason::AspectRatio { ratio_pct, limit } => {
                write!(f, "Invalid dimensions (ratio {ratio_pct}% > {limit}%)")
            }
            RejectionReason::Degenerate { dimension } => {
                write!(f, "Invalid dimensions (empty {dimension} image)")
            }
        }
    }
}

/// Result of [`transform`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Normalized(GrayImage),
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// Check whether an image of size `dim` would be accepted.
///
/// Needs only the dimensions, so callers can vet a file from its header
/// before decoding it.
pub fn validate(dim: Dimension, config: &PipelineConfig) -> Result<(), Rejection> {
    let Some(ratio_pct) = aspect_ratio_pct(dim) else {
        return Err(Rejection {
            reason: RejectionReason::Degenerate { dimension: dim },
        });
    };
    if ratio_pct > u64::from(config.max_pixel_diff_ratio) {
        return Err(Rejection {
            reason: RejectionReason::AspectRatio {
                ratio_pct,
                limit: config.max_pixel_diff_ratio,
            },
        });
    }
    Ok(())
}

/// Run the full pipeline on one decoded image.
pub fn transform(image: DynamicImage, config: &PipelineConfig) -> Outcome {
    let dim = Dimension::of(&image);
    if let Err(rejection) = validate(dim, config) {
        return Outcome::Rejected(rejection);
    }

    let cropped = match calculate_crop_window(dim) {
        Some(window) => center_crop(image, window),
        None => image,
    };
    let resized = resize_to_target(cropped, config.desired_dimension);
    Outcome::Normalized(to_luma(&resized))
}

/// Cut `window` out of `image`.
pub fn center_crop(image: DynamicImage, window: CropWindow) -> DynamicImage {
    image.crop_imm(window.x, window.y, window.side, window.side)
}

/// Resample to `target × target` with Lanczos3, or return the grid untouched
/// if it is already that size.
pub fn resize_to_target(image: DynamicImage, target: u32) -> DynamicImage {
    if needs_resize(Dimension::of(&image), target) {
        image.resize_exact(target, target, FilterType::Lanczos3)
    } else {
        image
    }
}

/// Convert to 8-bit luma with BT.601 weights in 16-bit fixed point.
///
/// The weights sum to `1 << 16`, so a pixel whose channels are equal maps to
/// that same value. Alpha is ignored.
pub fn to_luma(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([luma_bt601(r, g, b)])
    })
}

fn luma_bt601(r: u8, g: u8, b: u8) -> u8 {
    let y = 19595 * u32::from(r) + 38470 * u32::from(g) + 7471 * u32::from(b) + (1 << 15);
    (y >> 16) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    fn normalized(outcome: Outcome) -> GrayImage {
        match outcome {
            Outcome::Normalized(img) => img,
            Outcome::Rejected(r) => panic!("expected normalized image, got rejection: {r}"),
        }
    }

    // =========================================================================
    // validate
    // =========================================================================

    #[test]
    fn validate_accepts_boundary() {
        let config = PipelineConfig::default();
        assert!(validate(Dimension::new(140, 100), &config).is_ok());
        assert!(validate(Dimension::new(100, 140), &config).is_ok());
    }

    #[test]
    fn validate_rejects_over_boundary() {
        let config = PipelineConfig::default();
        let rejection = validate(Dimension::new(141, 100), &config).unwrap_err();
        assert_eq!(
            rejection.reason,
            RejectionReason::AspectRatio {
                ratio_pct: 41,
                limit: 40
            }
        );
    }

    #[test]
    fn validate_rejects_degenerate() {
        let config = PipelineConfig::default();
        let rejection = validate(Dimension::new(0, 32), &config).unwrap_err();
        assert!(matches!(rejection.reason, RejectionReason::Degenerate { .. }));
    }

    #[test]
    fn validate_respects_custom_threshold() {
        let strict = PipelineConfig {
            max_pixel_diff_ratio: 0,
            ..PipelineConfig::default()
        };
        assert!(validate(Dimension::new(10, 10), &strict).is_ok());
        assert!(validate(Dimension::new(11, 10), &strict).is_err());

        let lenient = PipelineConfig {
            max_pixel_diff_ratio: 200,
            ..PipelineConfig::default()
        };
        assert!(validate(Dimension::new(300, 100), &lenient).is_ok());
    }

    #[test]
    fn rejection_display_mentions_invalid_dimensions() {
        let rejection =
            validate(Dimension::new(155, 100), &PipelineConfig::default()).unwrap_err();
        assert_eq!(rejection.to_string(), "Invalid dimensions (ratio 55% > 40%)");
    }

    // =========================================================================
    // transform
    // =========================================================================

    #[test]
    fn transform_rejects_wide_image() {
        let outcome = transform(solid(141, 100, [10, 20, 30]), &PipelineConfig::default());
        assert!(outcome.is_rejected());
    }

    #[test]
    fn transform_rejects_empty_image() {
        let outcome = transform(solid(0, 0, [0, 0, 0]), &PipelineConfig::default());
        assert!(outcome.is_rejected());
    }

    #[test]
    fn transform_output_is_target_square_for_any_orientation() {
        let config = PipelineConfig::default();
        for (w, h) in [(120, 100), (140, 100), (100, 140), (17, 20), (8, 8), (32, 32)] {
            let img = normalized(transform(solid(w, h, [200, 100, 50]), &config));
            assert_eq!(img.dimensions(), (32, 32), "input {w}x{h}");
        }
    }

    #[test]
    fn transform_honours_desired_dimension() {
        let config = PipelineConfig {
            desired_dimension: 7,
            ..PipelineConfig::default()
        };
        let img = normalized(transform(solid(120, 100, [1, 2, 3]), &config));
        assert_eq!(img.dimensions(), (7, 7));
    }

    #[test]
    fn transform_is_identity_on_normalized_input() {
        let source = GrayImage::from_fn(32, 32, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
        let img = normalized(transform(
            DynamicImage::ImageLuma8(source.clone()),
            &PipelineConfig::default(),
        ));
        assert_eq!(img, source);
    }

    #[test]
    fn transform_crops_landscape_from_center() {
        // 100x60: left 20 columns black, middle 60 white, right 20 black.
        let img = RgbImage::from_fn(100, 60, |x, _| {
            if (20..80).contains(&x) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let config = PipelineConfig {
            max_pixel_diff_ratio: 100,
            desired_dimension: 60,
        };
        let out = normalized(transform(DynamicImage::ImageRgb8(img), &config));
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn transform_crops_portrait_from_center() {
        let img = RgbImage::from_fn(60, 100, |_, y| {
            if (20..80).contains(&y) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let config = PipelineConfig {
            max_pixel_diff_ratio: 100,
            desired_dimension: 60,
        };
        let out = normalized(transform(DynamicImage::ImageRgb8(img), &config));
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    // =========================================================================
    // steps
    // =========================================================================

    #[test]
    fn center_crop_takes_window() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(5, 3, |x, y| {
            Rgb([x as u8, y as u8, 0])
        }));
        let cropped = center_crop(img, CropWindow { x: 1, y: 0, side: 3 });
        assert_eq!(Dimension::of(&cropped), Dimension::new(3, 3));
        assert_eq!(cropped.to_rgb8().get_pixel(0, 0).0, [1, 0, 0]);
        assert_eq!(cropped.to_rgb8().get_pixel(2, 2).0, [3, 2, 0]);
    }

    #[test]
    fn resize_skipped_at_target_size() {
        let img = solid(32, 32, [9, 9, 9]);
        let resized = resize_to_target(img.clone(), 32);
        assert_eq!(resized, img);
    }

    #[test]
    fn resize_upsamples_small_images() {
        let resized = resize_to_target(solid(4, 4, [9, 9, 9]), 32);
        assert_eq!(Dimension::of(&resized), Dimension::new(32, 32));
    }

    #[test]
    fn luma_primary_weights() {
        assert_eq!(luma_bt601(255, 0, 0), 76);
        assert_eq!(luma_bt601(0, 255, 0), 150);
        assert_eq!(luma_bt601(0, 0, 255), 29);
        assert_eq!(luma_bt601(255, 255, 255), 255);
        assert_eq!(luma_bt601(0, 0, 0), 0);
    }

    #[test]
    fn luma_preserves_neutral_gray() {
        for v in 0..=255u8 {
            assert_eq!(luma_bt601(v, v, v), v);
        }
    }

    #[test]
    fn to_luma_ignores_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0])));
        let gray = to_luma(&img);
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }
}
