//! # squaregray
//!
//! Batch image normalization: turn a directory of roughly square JPEGs into
//! small, square, grayscale JPEGs of one fixed size, in a mirrored tree.
//!
//! # Architecture: Scan, then Transform
//!
//! ```text
//! 1. Scan       images/  →  Manifest        (two-level walk, JPEGs only)
//! 2. Process    Manifest →  output/         (decode → transform → encode)
//! ```
//!
//! The heart of the crate is [`imaging::transform`], a pure function from a
//! decoded image to either a normalized grayscale grid or a typed
//! [`imaging::Rejection`]:
//!
//! ```text
//! validate aspect → center crop → Lanczos3 resize → BT.601 luma
//! ```
//!
//! Everything around it is plumbing that can fail per file without stopping
//! the batch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the source root and one level of subdirectories, produces the [`scan::Manifest`] |
//! | [`process`] | Drives the batch: output tree creation, per-image outcomes, progress events, totals |
//! | [`imaging`] | Dimension model, crop geometry, the transform pipeline, and the JPEG backend |
//! | [`config`] | Layered `config.toml` loading and validation |
//! | [`output`] | CLI output formatting for progress and summaries |
//!
//! # Design Decisions
//!
//! ## Rejection Is Not an Error
//!
//! An image that is too far from square is an expected result, not a fault,
//! so [`imaging::transform`] returns [`imaging::Outcome`] rather than a
//! `Result`. Codec failures are errors, but they are contained to the file
//! that caused them: [`process`] records them and keeps going.
//!
//! ## Integer Aspect Math
//!
//! The aspect percentage is `(max - min) * 100 / min` in integers. Float
//! division would put `141x100` at 40.99…% and accept it; the integer form
//! gives exactly 41.
//!
//! ## Pinned Luma Weights
//!
//! Grayscale uses BT.601 weights in 16-bit fixed point instead of whatever
//! the image library defaults to, so output is reproducible byte for byte
//! across library versions.

pub mod config;
pub mod imaging;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
