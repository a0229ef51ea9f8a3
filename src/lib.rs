//! # gifslice
//!
//! Frame-accurate GIF splitting, trimming, and optimization driven through
//! ImageMagick.
//!
//! `gifslice` models an animated GIF as a navigable timeline of
//! variable-duration frames and translates every user-facing coordinate —
//! split points, trim ranges, frame numbers — losslessly between
//! frame-index space and continuous time space. The pixel work itself is
//! delegated to an external ImageMagick installation, invoked as a sequence
//! of file-to-file transforms per segment.
//!
//! ## Quick Start
//!
//! ### Inspect a GIF's timeline
//!
//! ```no_run
//! use gifslice::GifProbe;
//!
//! let metadata = GifProbe::probe("input.gif")?;
//! let timeline = metadata.timeline();
//! println!(
//!     "{} frames over {:.2}s (~{:.2} fps)",
//!     timeline.frame_count(),
//!     timeline.total_duration(),
//!     timeline.fps(),
//! );
//! # Ok::<(), gifslice::GifsliceError>(())
//! ```
//!
//! ### Split at time points
//!
//! ```no_run
//! use gifslice::{GifTool, Magick, Orchestrator, PlanMode, SegmentOptions, plan_segments};
//! use std::path::Path;
//!
//! let magick = Magick::detect()?;
//! let timeline = magick.probe(Path::new("input.gif"))?.timeline();
//!
//! // "2.5,3.5" on a 6s asset: three segments with the implicit 0s/6s ends.
//! let plan = plan_segments(&timeline, "2.5,3.5", PlanMode::Auto)?
//!     .expect("non-empty input");
//! let outputs = Orchestrator::new(&magick).run_segmentation(
//!     Path::new("input.gif"),
//!     &timeline,
//!     &plan,
//!     &SegmentOptions::new(),
//!     Path::new("."),
//! )?;
//! println!("committed {} of {}", outputs.len(), plan.segment_count());
//! # Ok::<(), gifslice::GifsliceError>(())
//! ```
//!
//! ### Trim an exact frame range
//!
//! ```no_run
//! use gifslice::{FrameTimeline, PlanMode, plan_segments};
//!
//! let timeline = FrameTimeline::new(vec![10; 100]);
//! // Frame-space trims bypass time conversion entirely.
//! let plan = plan_segments(&timeline, "f:10-50", PlanMode::Auto)?;
//! assert!(plan.is_some());
//! # Ok::<(), gifslice::GifsliceError>(())
//! ```
//!
//! ## Features
//!
//! - **Timeline model** — repaired per-frame delays, frame↔time conversion
//!   with boundary semantics that never duplicate a frame across adjacent
//!   segments
//! - **FPS retiming** — `normalize` (uniform delay) and `preserve`
//!   (proportional rescaling that keeps relative pacing)
//! - **Segmentation planner** — explicit time/frame points and ranges, plus
//!   a unified shorthand grammar (`"2.5,3.5"`, `"0-2.5,3.5-4.5"`,
//!   `"f:10-50"`)
//! - **Pipeline orchestration** — coalesce → extract → transform → atomic
//!   commit per segment, continue-on-error across a batch, scoped temp
//!   files removed on every exit path
//! - **Injected tooling** — the image-processing capability is a trait, so
//!   tests run against a fake with no ImageMagick installed
//! - **Progress & cancellation** — per-segment callbacks and a coarse
//!   cancellation token
//!
//! ## Requirements
//!
//! ImageMagick must be installed: the v7 `magick` binary or the v6
//! `convert`/`identify` pair on the PATH. `gifslice` never decodes pixel
//! data itself.

pub mod error;
pub mod magick;
pub mod metadata;
pub mod pipeline;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod retime;
pub mod timeline;

pub use error::GifsliceError;
pub use magick::Magick;
pub use metadata::GifMetadata;
pub use pipeline::{
    GifTool, Orchestrator, PipelineJob, SegmentOptions, TransformOp, optimize, run_segmentation,
};
pub use planner::{
    PlanMode, SegmentPlan, TrimRange, parse_frame_points, parse_frame_range, parse_time_points,
    parse_time_range, plan_segments, resolve_split_boundaries,
};
pub use probe::GifProbe;
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use retime::{FpsMode, rescale_delays, uniform_delay};
pub use timeline::FrameTimeline;
