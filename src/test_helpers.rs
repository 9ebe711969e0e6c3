//! Shared test utilities for the squaregray test suite.
//!
//! Builds real JPEG fixtures on disk so scan and process tests exercise the
//! same codec path as production.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let source = tmp.path().join("images");
//! create_test_jpeg(&source.join("a.jpg"), 100, 100);
//! create_test_jpeg(&source.join("faces/b.jpg"), 60, 80);
//! ```

use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::path::Path;

/// Create a small valid JPEG file with the given dimensions, creating parent
/// directories as needed.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a file that has a JPEG name but is not decodable.
pub fn create_corrupt_jpeg(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"\xFF\xD8 truncated").unwrap();
}

/// Sorted list of every file below `root`, relative to it, with `/` separators.
pub fn relative_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
