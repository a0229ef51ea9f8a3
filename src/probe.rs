//! One-shot GIF probing.
//!
//! [`GifProbe`] detects the installed ImageMagick, probes a file, and
//! returns owned metadata — useful for quickly inspecting files without
//! holding onto a [`Magick`](crate::Magick) handle. For repeated work
//! (probing then segmenting), detect once and reuse the handle instead.

use std::path::Path;

use crate::error::GifsliceError;
use crate::magick::Magick;
use crate::metadata::GifMetadata;
use crate::pipeline::GifTool;

/// Lightweight GIF probe.
///
/// # Example
///
/// ```no_run
/// use gifslice::GifProbe;
///
/// let metadata = GifProbe::probe("input.gif")?;
/// let timeline = metadata.timeline();
/// println!("{} frames, {:.2}s", timeline.frame_count(), timeline.total_duration());
/// # Ok::<(), gifslice::GifsliceError>(())
/// ```
pub struct GifProbe;

impl GifProbe {
    /// Detect ImageMagick and probe a single file.
    ///
    /// # Errors
    ///
    /// Returns [`GifsliceError::ToolNotFound`] when no ImageMagick is
    /// installed, or [`GifsliceError::ProbeFailed`] when the file cannot
    /// be read as a GIF.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<GifMetadata, GifsliceError> {
        let magick = Magick::detect()?;
        magick.probe(path.as_ref())
    }

    /// Probe multiple files.
    ///
    /// Files that cannot be probed produce an `Err` entry in the result
    /// vector rather than aborting the entire batch.
    pub fn probe_many<P: AsRef<Path>>(paths: &[P]) -> Vec<Result<GifMetadata, GifsliceError>> {
        paths.iter().map(Self::probe).collect()
    }
}
