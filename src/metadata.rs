//! Probed GIF metadata.
//!
//! [`GifMetadata`] is the fixed-shape record produced by probing a GIF (see
//! [`GifProbe`](crate::GifProbe) and [`GifTool::probe`](crate::GifTool)).
//! It holds exactly what the external tool reports; the derived timeline,
//! with its delay-list repair, is built on demand via
//! [`GifMetadata::timeline`].

use crate::timeline::FrameTimeline;

/// Metadata for a single GIF file, as reported by the probing tool.
///
/// # Example
///
/// ```no_run
/// use gifslice::GifProbe;
///
/// let metadata = GifProbe::probe("input.gif")?;
/// println!("{}x{}, {} frames", metadata.width, metadata.height, metadata.frame_count);
/// println!("~{:.2} fps over {:.2}s", metadata.timeline().fps(), metadata.timeline().total_duration());
/// # Ok::<(), gifslice::GifsliceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct GifMetadata {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Approximate color count (maximum across frames).
    pub colors: u32,
    /// Number of frames in the file.
    pub frame_count: usize,
    /// Raw per-frame delays in centiseconds, exactly as probed. May
    /// disagree in length with `frame_count` for malformed files; the
    /// repair happens in [`GifMetadata::timeline`].
    pub delays: Vec<u32>,
}

impl GifMetadata {
    /// Build the repaired [`FrameTimeline`] for this asset.
    ///
    /// Pads or truncates the probed delay list to `frame_count` entries and
    /// floors zero delays to 1cs.
    pub fn timeline(&self) -> FrameTimeline {
        FrameTimeline::from_probe(self.delays.clone(), self.frame_count)
    }
}
