//! Batch driver.
//!
//! Scans the source tree, then feeds every image through
//! [`transform`](crate::imaging::transform) and writes the result to the
//! mirrored location under the output root.
//!
//! ## Output Structure
//!
//! ```text
//! images/                 output/
//! ├── 0001.jpg      →     ├── 0001.jpg        # 32x32 grayscale
//! ├── wide.jpg            │                   # rejected: not written
//! └── faces/              └── faces/
//!     └── a.jpg     →         └── a.jpg
//! ```
//!
//! ## Failure Policy
//!
//! Only problems that make the whole run meaningless are returned as
//! [`ProcessError`]: a missing source directory, or an output directory that
//! cannot be created. Every output directory is created before the first image
//! is touched. Per-image problems become an [`ImageOutcome`]: a rejection or a
//! decode/encode failure is recorded, logged, and the batch moves on.
//!
//! ## Sequential Processing
//!
//! Images are processed one at a time, root directory first, in scan order.
//! Progress is reported through an optional [`ProcessEvent`] channel so the
//! caller can print while the batch runs.

use crate::config::Config;
use crate::imaging::{
    Dimension, ImageBackend, Outcome, PipelineConfig, Quality, Rejection, RustBackend, transform,
    validate,
};
use crate::scan::{self, ImageDir, ScanError, SkippedEntry};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Cannot create output directory {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to a single image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    /// Transformed and written.
    Normalized,
    /// Turned away by validation; nothing written.
    Rejected(Rejection),
    /// Decode or encode failed; nothing written.
    Failed(String),
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    DirectoryStarted {
        input: PathBuf,
        image_count: usize,
    },
    ImageNormalized {
        file: String,
    },
    /// Dry-run counterpart of `ImageNormalized`.
    ImageAccepted {
        file: String,
        dimension: Dimension,
    },
    ImageRejected {
        file: String,
        rejection: Rejection,
    },
    ImageFailed {
        file: String,
        error: String,
    },
    EntrySkipped {
        entry: SkippedEntry,
    },
    DirectoryCompleted {
        input: PathBuf,
        is_root: bool,
        processed: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedFile {
    pub file: String,
    pub rejection: Rejection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub file: String,
    pub error: String,
}

/// Per-directory tally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorySummary {
    /// Path relative to the source root; empty for the root.
    pub relative: PathBuf,
    /// Images written (or, for a dry run, images that would be written).
    pub processed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedFile>,
}

impl DirectorySummary {
    fn new(relative: PathBuf) -> Self {
        Self {
            relative,
            processed: 0,
            rejected: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResult {
    pub directories: Vec<DirectorySummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl ProcessResult {
    pub fn total_processed(&self) -> usize {
        self.directories.iter().map(|d| d.processed).sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.directories.iter().map(|d| d.rejected.len()).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.directories.iter().map(|d| d.failed.len()).sum()
    }

    /// Summary for the directory at `relative`, if it was scanned.
    pub fn directory(&self, relative: impl AsRef<Path>) -> Option<&DirectorySummary> {
        self.directories
            .iter()
            .find(|d| d.relative == relative.as_ref())
    }
}

fn emit(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is watching progress.
        let _ = tx.send(event);
    }
}

/// Normalize every image under `source` into `output` with the JPEG backend.
pub fn process(
    source: &Path,
    output: &Path,
    config: &Config,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    process_with_backend(&RustBackend::new(), source, output, config, events)
}

/// Process images using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &Config,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let start = Instant::now();
    let manifest = scan::scan(source)?;
    tracing::info!(
        source = %source.display(),
        output = %output.display(),
        images = manifest.image_count(),
        "starting batch"
    );

    for dir in &manifest.directories {
        let path = output.join(&dir.relative);
        std::fs::create_dir_all(&path)
            .map_err(|source| ProcessError::CreateOutput { path, source })?;
    }

    for entry in &manifest.skipped {
        emit(&events, ProcessEvent::EntrySkipped { entry: entry.clone() });
    }

    let pipeline = config.pipeline_config();
    let quality = config.quality();
    let directories = manifest
        .directories
        .iter()
        .map(|dir| {
            process_directory(backend, source, output, dir, &pipeline, quality, &events)
        })
        .collect();

    let result = ProcessResult {
        directories,
        skipped: manifest.skipped,
        elapsed: start.elapsed(),
    };
    tracing::info!(
        processed = result.total_processed(),
        rejected = result.total_rejected(),
        failed = result.total_failed(),
        elapsed = ?result.elapsed,
        "batch finished"
    );
    Ok(result)
}

fn process_directory(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    dir: &ImageDir,
    pipeline: &PipelineConfig,
    quality: Quality,
    events: &Option<Sender<ProcessEvent>>,
) -> DirectorySummary {
    let input_dir = source.join(&dir.relative);
    let output_dir = output.join(&dir.relative);
    let mut summary = DirectorySummary::new(dir.relative.clone());

    emit(
        events,
        ProcessEvent::DirectoryStarted {
            input: input_dir.clone(),
            image_count: dir.images.len(),
        },
    );

    for file in &dir.images {
        let outcome = process_image(
            backend,
            &input_dir.join(file),
            &output_dir.join(file),
            pipeline,
            quality,
        );
        record(&mut summary, file, outcome, events);
    }

    emit(
        events,
        ProcessEvent::DirectoryCompleted {
            input: input_dir,
            is_root: dir.is_root(),
            processed: summary.processed,
        },
    );
    summary
}

/// Decode, transform, and encode one image.
pub fn process_image(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    pipeline: &PipelineConfig,
    quality: Quality,
) -> ImageOutcome {
    let image = match backend.decode(input) {
        Ok(image) => image,
        Err(e) => return ImageOutcome::Failed(e.to_string()),
    };
    match transform(image, pipeline) {
        Outcome::Rejected(rejection) => ImageOutcome::Rejected(rejection),
        Outcome::Normalized(gray) => match backend.encode(&gray, output, quality) {
            Ok(()) => ImageOutcome::Normalized,
            Err(e) => ImageOutcome::Failed(e.to_string()),
        },
    }
}

fn record(
    summary: &mut DirectorySummary,
    file: &str,
    outcome: ImageOutcome,
    events: &Option<Sender<ProcessEvent>>,
) {
    let file = file.to_string();
    match outcome {
        ImageOutcome::Normalized => {
            tracing::debug!(file = %file, "normalized");
            summary.processed += 1;
            emit(events, ProcessEvent::ImageNormalized { file });
        }
        ImageOutcome::Rejected(rejection) => {
            tracing::debug!(file = %file, %rejection, "rejected");
            summary.rejected.push(RejectedFile {
                file: file.clone(),
                rejection,
            });
            emit(events, ProcessEvent::ImageRejected { file, rejection });
        }
        ImageOutcome::Failed(error) => {
            tracing::warn!(file = %file, error = %error, "image failed, continuing");
            summary.failed.push(FailedFile {
                file: file.clone(),
                error: error.clone(),
            });
            emit(events, ProcessEvent::ImageFailed { file, error });
        }
    }
}

/// Dry run: validate every image from its header dimensions, writing nothing.
pub fn check(
    source: &Path,
    config: &Config,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    check_with_backend(&RustBackend::new(), source, config, events)
}

pub fn check_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    config: &Config,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let start = Instant::now();
    let manifest = scan::scan(source)?;
    let pipeline = config.pipeline_config();

    for entry in &manifest.skipped {
        emit(&events, ProcessEvent::EntrySkipped { entry: entry.clone() });
    }

    let mut directories = Vec::with_capacity(manifest.directories.len());
    for dir in &manifest.directories {
        let input_dir = source.join(&dir.relative);
        let mut summary = DirectorySummary::new(dir.relative.clone());
        emit(
            &events,
            ProcessEvent::DirectoryStarted {
                input: input_dir.clone(),
                image_count: dir.images.len(),
            },
        );

        for file in &dir.images {
            let dimension = match backend.identify(&input_dir.join(file)) {
                Ok(dimension) => dimension,
                Err(e) => {
                    record(&mut summary, file, ImageOutcome::Failed(e.to_string()), &events);
                    continue;
                }
            };
            match validate(dimension, &pipeline) {
                Ok(()) => {
                    summary.processed += 1;
                    emit(
                        &events,
                        ProcessEvent::ImageAccepted {
                            file: file.clone(),
                            dimension,
                        },
                    );
                }
                Err(rejection) => {
                    record(&mut summary, file, ImageOutcome::Rejected(rejection), &events)
                }
            }
        }

        emit(
            &events,
            ProcessEvent::DirectoryCompleted {
                input: input_dir,
                is_root: dir.is_root(),
                processed: summary.processed,
            },
        );
        directories.push(summary);
    }

    Ok(ProcessResult {
        directories,
        skipped: manifest.skipped,
        elapsed: start.elapsed(),
    })
}
