//! The segmentation planner.
//!
//! Turns raw user text plus a [`FrameTimeline`] into a validated
//! [`SegmentPlan`]: either an ordered list of split boundaries or one or
//! more trim ranges.
//!
//! Two entry families exist. The explicit parsers
//! ([`parse_time_range`], [`parse_frame_range`], [`parse_time_points`],
//! [`parse_frame_points`]) each handle exactly one input shape and validate
//! it against the timeline. [`plan_segments`] additionally understands the
//! unified shorthand grammar:
//!
//! - an optional leading `f:` or `frame:` marker selects frame space for
//!   everything that follows;
//! - if the remainder contains a hyphen it is one or more comma-separated
//!   ranges (**trim** mode), e.g. `"0-2.5,3.5-4.5"` or `"f:10-50"`;
//! - otherwise it is one or more comma-separated points (**split** mode),
//!   e.g. `"2.5,3.5"` — a single bare number is one split point.
//!
//! Frame-space split points are converted to time via the timeline;
//! frame-space trim ranges stay in frame coordinates all the way to the
//! extractor, so exact frame trims never round through time space.
//!
//! # Example
//!
//! ```
//! use gifslice::{FrameTimeline, PlanMode, SegmentPlan, plan_segments};
//!
//! let timeline = FrameTimeline::new(vec![10; 60]); // 6 seconds
//! let plan = plan_segments(&timeline, "2.5,3.5", PlanMode::Auto).unwrap().unwrap();
//! match plan {
//!     SegmentPlan::Split { boundaries } => {
//!         assert_eq!(boundaries, vec![0.0, 2.5, 3.5, 6.0]);
//!     }
//!     SegmentPlan::Trim { .. } => unreachable!(),
//! }
//! ```

use crate::error::GifsliceError;
use crate::timeline::FrameTimeline;

/// Which interpretation [`plan_segments`] applies to the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanMode {
    /// Force split-point interpretation.
    Split,
    /// Force trim-range interpretation.
    Trim,
    /// Detect from the input: a hyphen anywhere means trim, else split.
    #[default]
    Auto,
}

/// One validated trim range.
///
/// Frame ranges are kept in frame coordinates so an exact frame trim
/// bypasses time conversion entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrimRange {
    /// A time window in seconds, end-exclusive of the following frame.
    Time {
        /// Start time in seconds.
        start: f64,
        /// End time in seconds.
        end: f64,
    },
    /// An inclusive frame-index range.
    Frames {
        /// First frame (inclusive).
        start: usize,
        /// Last frame (inclusive).
        end: usize,
    },
}

/// A resolved segmentation plan, consumed by
/// [`run_segmentation`](crate::run_segmentation).
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum SegmentPlan {
    /// Split the asset at the given boundaries.
    Split {
        /// Strictly increasing boundary times in seconds, always including
        /// `0` and the total duration. Each consecutive pair is one output
        /// segment.
        boundaries: Vec<f64>,
    },
    /// Extract the given sub-ranges, discarding the rest.
    Trim {
        /// Validated ranges, in input order after dropping invalid entries.
        ranges: Vec<TrimRange>,
    },
}

impl SegmentPlan {
    /// How many output segments this plan requests.
    pub fn segment_count(&self) -> usize {
        match self {
            Self::Split { boundaries } => boundaries.len().saturating_sub(1),
            Self::Trim { ranges } => ranges.len(),
        }
    }
}

/// Parse a `"start-end"` time range (seconds) and validate it against the
/// timeline.
///
/// Valid only when `0 <= start`, `end <= total_duration`, and
/// `start < end`. Malformed or out-of-bounds input yields `None`.
pub fn parse_time_range(text: &str, timeline: &FrameTimeline) -> Option<(f64, f64)> {
    let (start, end) = split_range(text)?;
    let start: f64 = start.parse().ok()?;
    let end: f64 = end.parse().ok()?;
    if start >= 0.0 && end <= timeline.total_duration() && start < end {
        Some((start, end))
    } else {
        None
    }
}

/// Parse a `"start-end"` frame range and validate it against the timeline.
///
/// Valid only when `end < frame_count` and `start <= end` (a single-frame
/// range is allowed). Malformed or out-of-bounds input yields `None`.
pub fn parse_frame_range(text: &str, timeline: &FrameTimeline) -> Option<(usize, usize)> {
    let (start, end) = split_range(text)?;
    let start: usize = start.parse().ok()?;
    let end: usize = end.parse().ok()?;
    if end < timeline.frame_count() && start <= end {
        Some((start, end))
    } else {
        None
    }
}

/// Parse a comma-separated list of time points (seconds).
///
/// Any unparseable token invalidates the whole list (`None`). Points
/// outside `[0, total_duration)` are dropped; the remaining points are
/// returned in input order, possibly empty.
pub fn parse_time_points(text: &str, timeline: &FrameTimeline) -> Option<Vec<f64>> {
    let total_duration = timeline.total_duration();
    let mut points = Vec::new();
    for token in text.split(',') {
        let point: f64 = token.trim().parse().ok()?;
        if point >= 0.0 && point < total_duration {
            points.push(point);
        }
    }
    Some(points)
}

/// Parse a comma-separated list of frame indices.
///
/// Any unparseable token invalidates the whole list (`None`). Indices
/// outside `[0, frame_count)` are dropped.
pub fn parse_frame_points(text: &str, timeline: &FrameTimeline) -> Option<Vec<usize>> {
    let mut frames = Vec::new();
    for token in text.split(',') {
        let frame: usize = token.trim().parse().ok()?;
        if frame < timeline.frame_count() {
            frames.push(frame);
        }
    }
    Some(frames)
}

/// Resolve raw split points into the full boundary set.
///
/// Builds `{0} ∪ {points strictly inside (0, total)} ∪ {total}`, sorted and
/// deduplicated. Returns `None` when fewer than two distinct boundaries
/// remain (an empty timeline) — "nothing to do", not an error.
pub fn resolve_split_boundaries(timeline: &FrameTimeline, points: &[f64]) -> Option<Vec<f64>> {
    let total_duration = timeline.total_duration();
    let mut boundaries = vec![0.0];
    for &point in points {
        if point > 0.0 && point < total_duration {
            boundaries.push(point);
        }
    }
    boundaries.push(total_duration);
    boundaries.sort_by(f64::total_cmp);
    boundaries.dedup();

    if boundaries.len() < 2 {
        log::warn!("no usable split boundaries — timeline has no duration");
        return None;
    }
    Some(boundaries)
}

/// Resolve free-form user input into a [`SegmentPlan`].
///
/// Empty or whitespace-only input (including a bare frame marker) is "no
/// operation" and yields `Ok(None)`. Input that parses to nothing usable is
/// an input error. A split request on a zero-duration timeline yields
/// `Ok(None)` with a warning.
///
/// # Errors
///
/// Returns [`GifsliceError::InvalidInput`] when no boundary or range can be
/// extracted from non-empty input.
pub fn plan_segments(
    timeline: &FrameTimeline,
    raw_input: &str,
    mode: PlanMode,
) -> Result<Option<SegmentPlan>, GifsliceError> {
    let text = raw_input.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let (body, frame_space) = strip_frame_marker(text);
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }

    let trim_mode = match mode {
        PlanMode::Trim => true,
        PlanMode::Split => false,
        PlanMode::Auto => body.contains('-'),
    };

    if trim_mode {
        plan_trim(timeline, raw_input, body, frame_space)
    } else {
        plan_split(timeline, raw_input, body, frame_space)
    }
}

fn plan_trim(
    timeline: &FrameTimeline,
    raw_input: &str,
    body: &str,
    frame_space: bool,
) -> Result<Option<SegmentPlan>, GifsliceError> {
    let mut ranges = Vec::new();
    for segment in body.split(',') {
        let segment = segment.trim();
        if !segment.contains('-') {
            log::warn!("dropping non-range trim segment {segment:?}");
            continue;
        }
        if frame_space {
            if let Some((start, end)) = parse_frame_range(segment, timeline) {
                ranges.push(TrimRange::Frames { start, end });
            } else {
                log::warn!("dropping invalid frame range {segment:?}");
            }
        } else if let Some((start, end)) = parse_time_range(segment, timeline) {
            ranges.push(TrimRange::Time { start, end });
        } else {
            log::warn!("dropping invalid time range {segment:?}");
        }
    }

    if ranges.is_empty() {
        return Err(invalid_input(raw_input, "no valid trim ranges"));
    }

    // Dispatch order is the sorted range order, with duplicates removed.
    ranges.sort_by(|a, b| range_start(a).total_cmp(&range_start(b)));
    ranges.dedup();
    Ok(Some(SegmentPlan::Trim { ranges }))
}

fn plan_split(
    timeline: &FrameTimeline,
    raw_input: &str,
    body: &str,
    frame_space: bool,
) -> Result<Option<SegmentPlan>, GifsliceError> {
    let points = if frame_space {
        let frames = parse_frame_points(body, timeline)
            .ok_or_else(|| invalid_input(raw_input, "malformed frame point list"))?;
        timeline.frame_start_times(&frames)
    } else {
        parse_time_points(body, timeline)
            .ok_or_else(|| invalid_input(raw_input, "malformed time point list"))?
    };

    if points.is_empty() {
        return Err(invalid_input(raw_input, "no valid split points"));
    }

    match resolve_split_boundaries(timeline, &points) {
        Some(boundaries) => Ok(Some(SegmentPlan::Split { boundaries })),
        None => Ok(None),
    }
}

/// Sort key for trim ranges — one invocation's ranges are always all in
/// the same coordinate space.
fn range_start(range: &TrimRange) -> f64 {
    match *range {
        TrimRange::Time { start, .. } => start,
        TrimRange::Frames { start, .. } => start as f64,
    }
}

/// Strip a leading `f:` / `frame:` marker (ASCII case-insensitive).
fn strip_frame_marker(text: &str) -> (&str, bool) {
    for marker in ["frame:", "f:"] {
        if let Some(prefix) = text.get(..marker.len())
            && prefix.eq_ignore_ascii_case(marker)
        {
            return (&text[marker.len()..], true);
        }
    }
    (text, false)
}

/// Split `"start-end"` on the first hyphen, rejecting empty halves.
fn split_range(text: &str) -> Option<(&str, &str)> {
    let (start, end) = text.trim().split_once('-')?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        return None;
    }
    Some((start, end))
}

fn invalid_input(raw_input: &str, reason: &str) -> GifsliceError {
    GifsliceError::InvalidInput {
        input: raw_input.to_string(),
        reason: reason.to_string(),
    }
}
