//! Error types for the `gifslice` crate.
//!
//! This module defines [`GifsliceError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry rich context to aid
//! debugging, including file paths, exit codes, and the offending range or
//! input text.
//!
//! Per-segment pipeline failures are deliberately *not* part of this
//! taxonomy at the batch level: [`run_segmentation`](crate::run_segmentation)
//! recovers from them locally and surfaces them as warnings, so a multi-part
//! operation never aborts because one segment failed.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `gifslice` operations.
///
/// Every public method that can fail returns `Result<T, GifsliceError>`.
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GifsliceError {
    /// No usable ImageMagick installation was found on the system.
    #[error(
        "ImageMagick not found — install it and make sure `magick` (v7+) or `convert` (v6) is on your PATH"
    )]
    ToolNotFound,

    /// Metadata could not be extracted from the source file.
    #[error("Failed to probe {path}: {reason}")]
    ProbeFailed {
        /// Path that was probed.
        path: PathBuf,
        /// Underlying reason the probe failed.
        reason: String,
    },

    /// An external tool exited with a non-zero status.
    #[error("{tool} exited with status {exit_code}: {message}")]
    CommandFailed {
        /// The tool that was invoked (e.g. `magick`).
        tool: String,
        /// Process exit code, or `-1` if terminated by a signal.
        exit_code: i32,
        /// Captured standard error output.
        message: String,
    },

    /// An external tool reported success but its output file is missing.
    #[error("Expected output file was not produced: {path}")]
    MissingOutput {
        /// The path the tool was asked to write.
        path: PathBuf,
    },

    /// Raw split/trim input text could not be parsed into any usable
    /// boundary or range.
    #[error("Invalid segment input {input:?}: {reason}")]
    InvalidInput {
        /// The raw text as supplied by the caller.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A time range's start is not strictly before its end, or the range
    /// falls outside the timeline.
    #[error("Invalid time range: {start}s-{end}s")]
    InvalidTimeRange {
        /// Requested start time in seconds.
        start: f64,
        /// Requested end time in seconds.
        end: f64,
    },

    /// A frame index exceeds the timeline's frame count.
    #[error("Frame {frame} is out of range (timeline has {frame_count} frames)")]
    FrameOutOfRange {
        /// The frame index that was requested.
        frame: usize,
        /// Total number of frames in the timeline.
        frame_count: usize,
    },

    /// An optimize request carried no width, fps, or colors parameter.
    #[error("Nothing to optimize: provide at least one of width, fps, or colors")]
    NoOptimizeParameters,

    /// The operation was cancelled via a
    /// [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}
