//! The frame timeline model.
//!
//! A GIF is a sequence of frames with independent display durations
//! ("delays", in centiseconds). [`FrameTimeline`] owns the repaired delay
//! list for one asset and performs every conversion between frame-index
//! space and continuous time space: resolving a time window to the frames it
//! covers, computing the time window a frame range occupies, and mapping
//! frame numbers to their start times.
//!
//! # Example
//!
//! ```
//! use gifslice::FrameTimeline;
//!
//! // Five frames of 10cs each: boundaries at 0.1, 0.2, 0.3, 0.4, 0.5s.
//! let timeline = FrameTimeline::new(vec![10, 10, 10, 10, 10]);
//! assert_eq!(timeline.total_duration(), 0.5);
//! assert_eq!(timeline.frame_range_from_time(0.15, Some(0.35)), Some((1, 3)));
//! ```

/// Fallback delay, in centiseconds, used when a probe reports frames but no
/// delay values at all. Matches the common 10cs (10 fps) GIF default.
const DEFAULT_DELAY_CS: u32 = 10;

/// The timeline of a single animated GIF.
///
/// Constructed once per inspected asset from probed metadata and immutable
/// afterwards. Construction *repairs* the probed data: the delay list is
/// padded (with the last known delay) or truncated to match the probed frame
/// count, and zero delays are floored to 1cs so they never reach the
/// conversion arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct FrameTimeline {
    delays: Vec<u32>,
}

impl FrameTimeline {
    /// Build a timeline directly from a delay list.
    ///
    /// Zero delays are floored to 1cs. An empty list produces an empty
    /// timeline, on which every conversion reports "invalid".
    pub fn new(delays: Vec<u32>) -> Self {
        let count = delays.len();
        Self::from_probe(delays, count)
    }

    /// Build a timeline from probed metadata, repairing any disagreement
    /// between the delay list and the probed frame count.
    ///
    /// Probes occasionally report fewer delay values than frames (or, more
    /// rarely, extras). Missing entries are padded with the last known delay
    /// (or 10cs if none was reported); extras are truncated.
    pub fn from_probe(mut delays: Vec<u32>, frame_count: usize) -> Self {
        if delays.len() < frame_count {
            let pad = delays.last().copied().unwrap_or(DEFAULT_DELAY_CS);
            delays.resize(frame_count, pad);
        } else {
            delays.truncate(frame_count);
        }
        for delay in &mut delays {
            *delay = (*delay).max(1);
        }
        Self { delays }
    }

    /// The repaired per-frame delays, in centiseconds.
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Number of frames on the timeline.
    pub fn frame_count(&self) -> usize {
        self.delays.len()
    }

    /// Returns `true` if the timeline has no frames.
    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Total duration in seconds.
    pub fn total_duration(&self) -> f64 {
        self.delays.iter().map(|&d| u64::from(d)).sum::<u64>() as f64 / 100.0
    }

    /// Mean frame delay in centiseconds, or `0.0` for an empty timeline.
    pub fn average_delay(&self) -> f64 {
        if self.delays.is_empty() {
            return 0.0;
        }
        self.delays.iter().map(|&d| u64::from(d)).sum::<u64>() as f64 / self.delays.len() as f64
    }

    /// Average frame rate derived from the mean delay, or `0.0` for an
    /// empty timeline.
    pub fn fps(&self) -> f64 {
        let average = self.average_delay();
        if average > 0.0 { 100.0 / average } else { 0.0 }
    }

    /// Cumulative end time of each frame, in seconds.
    ///
    /// `cumulative[i]` is the instant at which frame `i` stops being
    /// displayed; frame `i + 1` starts there.
    fn cumulative_seconds(&self) -> Vec<f64> {
        let mut boundaries = Vec::with_capacity(self.delays.len());
        let mut elapsed = 0.0_f64;
        for &delay in &self.delays {
            elapsed += f64::from(delay) / 100.0;
            boundaries.push(elapsed);
        }
        boundaries
    }

    /// Resolve a time window (seconds) to the inclusive frame range it
    /// covers.
    ///
    /// `start_time` is clamped to zero; a missing `end_time`, or one past
    /// the end of the timeline, is clamped to the total duration. Returns
    /// `None` when the clamped window is empty (`start >= end`) or the
    /// timeline has no frames.
    ///
    /// The two boundary scans are intentionally asymmetric: the start frame
    /// is the first frame whose cumulative end time lies strictly *after*
    /// `start_time`, while the end frame is the frame just before the first
    /// one that begins strictly after `end_time`. A split point that lands
    /// exactly on a frame boundary therefore assigns that frame to exactly
    /// one of the two adjacent segments, never both.
    pub fn frame_range_from_time(
        &self,
        start_time: f64,
        end_time: Option<f64>,
    ) -> Option<(usize, usize)> {
        if self.delays.is_empty() {
            return None;
        }

        let total_duration = self.total_duration();
        let start_time = start_time.max(0.0);
        let end_time = match end_time {
            Some(end) if end <= total_duration => end,
            _ => total_duration,
        };
        if start_time >= end_time {
            return None;
        }

        let cumulative = self.cumulative_seconds();

        let mut start_frame = 0;
        for (frame, &end_of_frame) in cumulative.iter().enumerate() {
            if end_of_frame > start_time {
                start_frame = frame;
                break;
            }
        }

        let mut end_frame = self.delays.len() - 1;
        let mut previous = 0.0_f64;
        for (frame, &end_of_frame) in cumulative.iter().enumerate() {
            if previous > end_time {
                end_frame = frame.saturating_sub(1);
                break;
            }
            previous = end_of_frame;
        }

        if start_frame > end_frame {
            return None;
        }
        Some((start_frame, end_frame))
    }

    /// Compute the time window (seconds) occupied by an inclusive frame
    /// range.
    ///
    /// The start time is the sum of delays strictly before `start_frame`;
    /// the end time includes `end_frame`'s own delay, so the window's
    /// length is exactly the trimmed duration. Returns `None` when
    /// `end_frame` is out of range or the range is reversed.
    pub fn time_range_from_frames(
        &self,
        start_frame: usize,
        end_frame: usize,
    ) -> Option<(f64, f64)> {
        if end_frame >= self.delays.len() || start_frame > end_frame {
            return None;
        }
        let seconds_before = |frame: usize| {
            self.delays[..frame].iter().map(|&d| u64::from(d)).sum::<u64>() as f64 / 100.0
        };
        Some((seconds_before(start_frame), seconds_before(end_frame + 1)))
    }

    /// Map frame numbers to the instant each frame starts being displayed.
    ///
    /// Frame 0 starts at time 0; frame `i` starts when frame `i - 1` ends.
    /// Indices outside the timeline are silently dropped.
    pub fn frame_start_times(&self, frames: &[usize]) -> Vec<f64> {
        frames
            .iter()
            .filter(|&&frame| frame < self.delays.len())
            .map(|&frame| {
                self.delays[..frame].iter().map(|&d| u64::from(d)).sum::<u64>() as f64 / 100.0
            })
            .collect()
    }

    /// The delays of an inclusive frame range, clamped to the timeline.
    ///
    /// Used to feed a segment's own pacing into
    /// [`rescale_delays`](crate::rescale_delays). Returns an empty slice for
    /// a range that starts past the end of the timeline.
    pub fn segment_delays(&self, start_frame: usize, end_frame: usize) -> &[u32] {
        if start_frame >= self.delays.len() || start_frame > end_frame {
            return &[];
        }
        let end = end_frame.min(self.delays.len() - 1);
        &self.delays[start_frame..=end]
    }
}
