//! Progress reporting and cancellation support.
//!
//! [`ProgressCallback`] receives one notification per segment as the
//! orchestrator works through a plan; [`CancellationToken`] requests a stop
//! at the next job boundary. Cancellation is coarse by design: the in-flight
//! job's temporary files are still cleaned up, and segments committed before
//! the cancellation are kept.

use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A snapshot of segmentation progress, delivered after each job.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many segments have been attempted so far (1-based).
    pub current: u64,
    /// Total segments in the plan.
    pub total: u64,
    /// The committed output path, or `None` if this segment failed or was
    /// skipped.
    pub output: Option<PathBuf>,
}

/// Trait for receiving progress updates during segmentation.
///
/// Callbacks are **infallible** — they observe but cannot halt the
/// operation. Use [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called once per segment, after the segment commits or fails.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it across threads (e.g. hand one to a Ctrl-C
/// handler); call [`cancel`](CancellationToken::cancel) from anywhere to
/// stop the orchestrator before its next job.
///
/// # Example
///
/// ```
/// use gifslice::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](CancellationToken::cancel) has been
    /// called on this token or any clone of it.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
