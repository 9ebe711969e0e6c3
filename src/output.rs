//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! images (3 images)
//!     Rejected wide.jpg: Invalid dimensions (ratio 200% > 40%)
//! images/faces (2 images)
//!     Failed broken.jpg: Failed to decode images/faces/broken.jpg: ...
//! Completed 'images/faces' with 1 images
//! Processed 3 images in 41.2ms (1 rejected, 1 failed)
//! ```
//!
//! Normalized images are quiet by default; `verbose` adds one line per image.
//! Subdirectories end with a `Completed` line; the root directory does not,
//! its images only count toward the final total.
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::process::{ProcessEvent, ProcessResult};
use crate::scan::SkippedEntry;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "image" } else { "images" }
}

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent, verbose: bool) -> Vec<String> {
    match event {
        ProcessEvent::DirectoryStarted { input, image_count } => {
            vec![format!(
                "{} ({} {})",
                input.display(),
                image_count,
                plural(*image_count)
            )]
        }
        ProcessEvent::ImageNormalized { file } if verbose => {
            vec![format!("{}Normalized {}", indent(1), file)]
        }
        ProcessEvent::ImageAccepted { file, dimension } => {
            vec![format!("{}Accepted {} ({})", indent(1), file, dimension)]
        }
        ProcessEvent::ImageRejected { file, rejection } => {
            vec![format!("{}Rejected {}: {}", indent(1), file, rejection)]
        }
        ProcessEvent::ImageFailed { file, error } => {
            vec![format!("{}Failed {}: {}", indent(1), file, error)]
        }
        ProcessEvent::EntrySkipped { entry } if verbose => {
            let what = match entry {
                SkippedEntry::NestedDirectory(_) => "nested directory",
                SkippedEntry::Unsupported(_) => "not a JPEG",
                SkippedEntry::Unreadable(_) => "unreadable",
            };
            vec![format!("Skipped {} ({})", entry.path().display(), what)]
        }
        ProcessEvent::DirectoryCompleted {
            input,
            is_root: false,
            processed,
        } => {
            vec![format!(
                "Completed '{}' with {} images",
                input.display(),
                processed
            )]
        }
        _ => Vec::new(),
    }
}

/// Format the final summary line of a run.
pub fn format_summary(result: &ProcessResult) -> Vec<String> {
    let mut line = format!(
        "Processed {} images in {:.1?}",
        result.total_processed(),
        result.elapsed
    );
    let extras: Vec<String> = [
        (result.total_rejected(), "rejected"),
        (result.total_failed(), "failed"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{n} {label}"))
    .collect();
    if !extras.is_empty() {
        line.push_str(&format!(" ({})", extras.join(", ")));
    }
    vec![line]
}

/// Format the final summary of a dry run.
pub fn format_check_summary(result: &ProcessResult) -> Vec<String> {
    vec![format!(
        "{} {} would be processed, {} rejected, {} unreadable",
        result.total_processed(),
        plural(result.total_processed()),
        result.total_rejected(),
        result.total_failed()
    )]
}

/// Print a progress event to stdout.
pub fn print_process_event(event: &ProcessEvent, verbose: bool) {
    for line in format_process_event(event, verbose) {
        println!("{}", line);
    }
}

/// Print the run summary to stdout.
pub fn print_summary(result: &ProcessResult) {
    for line in format_summary(result) {
        println!("{}", line);
    }
}

/// Print the dry-run summary to stdout.
pub fn print_check_summary(result: &ProcessResult) {
    for line in format_check_summary(result) {
        println!("{}", line);
    }
}
