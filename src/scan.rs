//! Filesystem scanning.
//!
//! Walks the source directory and produces a [`Manifest`] listing the images
//! to normalize, grouped by the directory that holds them.
//!
//! ## Directory Structure
//!
//! Exactly two levels are recognised:
//!
//! ```text
//! images/                  # Source root
//! ├── config.toml          # Optional run configuration, ignored by the scan
//! ├── 0001.jpg             # Root-level images
//! ├── 0002.jpeg
//! ├── faces/               # Subdirectory, mirrored as output/faces/
//! │   ├── a.jpg
//! │   └── b.JPG
//! │   └── deeper/          # Nested directory: skipped, never descended into
//! └── notes.txt            # Not a JPEG: recorded as unsupported
//! ```
//!
//! ## Ordering
//!
//! The root directory always comes first, followed by subdirectories sorted by
//! name; images inside each directory are sorted by file name. Hidden entries
//! (leading `.`) are ignored entirely.

use crate::config::CONFIG_FILE_NAME;
use crate::imaging::is_supported_image;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Cannot read source directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Result of scanning a source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Directories holding images, root first. The root is always present,
    /// even when it has no images of its own.
    pub directories: Vec<ImageDir>,
    /// Entries that were seen but will not be processed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

impl Manifest {
    /// Total number of images across all directories.
    pub fn image_count(&self) -> usize {
        self.directories.iter().map(|d| d.images.len()).sum()
    }
}

/// One directory's worth of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDir {
    /// Path relative to the source root; empty for the root itself.
    pub relative: PathBuf,
    /// Image file names inside this directory.
    pub images: Vec<String>,
}

impl ImageDir {
    fn new(relative: PathBuf) -> Self {
        Self {
            relative,
            images: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }
}

/// An entry the scanner saw and left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum SkippedEntry {
    /// Directory below a subdirectory; only one level is supported.
    NestedDirectory(PathBuf),
    /// File without a JPEG extension.
    Unsupported(PathBuf),
    /// Subdirectory that could not be listed.
    Unreadable(PathBuf),
}

impl SkippedEntry {
    pub fn path(&self) -> &Path {
        match self {
            SkippedEntry::NestedDirectory(p)
            | SkippedEntry::Unsupported(p)
            | SkippedEntry::Unreadable(p) => p,
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Scan `root` for images in the root directory and its direct subdirectories.
pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::SourceNotFound(root.to_path_buf()));
    }

    let mut directories = vec![ImageDir::new(PathBuf::new())];
    let mut skipped = Vec::new();
    // Index of the subdirectory being walked; depth-2 entries belong to it.
    let mut current = 0;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                let relative = relative_to(root, &path);
                // The directory entry itself was already yielded; drop it so
                // nothing gets mirrored for it.
                if current > 0 && directories[current].relative == relative {
                    directories.pop();
                    current = 0;
                }
                skipped.push(SkippedEntry::Unreadable(relative));
                continue;
            }
        };

        let relative = relative_to(root, entry.path());
        let is_dir = entry.file_type().is_dir();

        match (entry.depth(), is_dir) {
            (1, true) => {
                directories.push(ImageDir::new(relative));
                current = directories.len() - 1;
            }
            (_, true) => {
                tracing::debug!(path = %relative.display(), "skipping nested directory");
                skipped.push(SkippedEntry::NestedDirectory(relative));
            }
            (1, false) if entry.file_name() == CONFIG_FILE_NAME => {}
            (depth, false) if is_supported_image(entry.path()) => {
                let name = entry.file_name().to_string_lossy().into_owned();
                let index = if depth == 1 { 0 } else { current };
                directories[index].images.push(name);
            }
            (_, false) => skipped.push(SkippedEntry::Unsupported(relative)),
        }
    }

    Ok(Manifest {
        directories,
        skipped,
    })
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
