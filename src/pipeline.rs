//! The pipeline orchestrator.
//!
//! Executes a resolved [`SegmentPlan`] against a source GIF by sequencing
//! external-tool invocations per segment: normalize frame disposal
//! (coalesce), extract the frame sub-range, apply the optional finishing
//! transforms (resize, retime, recolor, layer optimization), and atomically
//! commit the result to its output path.
//!
//! All pixel work happens in an injected [`GifTool`] implementation — the
//! orchestrator never touches image data itself. Intermediate files are
//! scoped temporaries removed on every exit path, and a failing segment is
//! recovered locally: the batch continues and only the committed output
//! paths are returned.
//!
//! # Example
//!
//! ```no_run
//! use gifslice::{GifTool, Magick, Orchestrator, PlanMode, SegmentOptions, plan_segments};
//! use std::path::Path;
//!
//! let magick = Magick::detect()?;
//! let timeline = magick.probe(Path::new("input.gif"))?.timeline();
//!
//! let plan = plan_segments(&timeline, "2.5,3.5", PlanMode::Auto)?
//!     .expect("input was not empty");
//! let outputs = Orchestrator::new(&magick).run_segmentation(
//!     Path::new("input.gif"),
//!     &timeline,
//!     &plan,
//!     &SegmentOptions::new(),
//!     Path::new("."),
//! )?;
//! println!("committed {} of {} segments", outputs.len(), plan.segment_count());
//! # Ok::<(), gifslice::GifsliceError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{Builder as TempBuilder, NamedTempFile};

use crate::error::GifsliceError;
use crate::metadata::GifMetadata;
use crate::planner::{SegmentPlan, TrimRange};
use crate::progress::{CancellationToken, ProgressCallback, ProgressInfo};
use crate::retime::{FpsMode, rescale_delays, uniform_delay};
use crate::timeline::FrameTimeline;

/// One step in an external file-to-file transform.
///
/// An ops list is handed to [`GifTool::transform`] in order; the concrete
/// tool translates each op into its own command syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOp {
    /// Flatten frame disposal so every frame is a standalone image.
    /// Required before sub-range extraction, and again before a delay
    /// rewrite.
    Coalesce,
    /// Keep only the inclusive frame range `[start, end]`.
    ExtractRange {
        /// First frame to keep.
        start: usize,
        /// Last frame to keep.
        end: usize,
    },
    /// Resize to a fixed width, preserving aspect ratio.
    ResizeWidth(u32),
    /// Set the same delay (centiseconds) on every frame.
    SetUniformDelay(u32),
    /// Reduce the palette to at most this many colors.
    SetColors(u32),
    /// Re-optimize frame layers for size after the other transforms.
    OptimizeLayers,
}

/// The external image-processing capability the orchestrator drives.
///
/// Implemented by [`Magick`](crate::Magick) for real use; tests inject a
/// fake so the orchestrator can be exercised without any tool installed.
pub trait GifTool {
    /// Extract metadata from a GIF file.
    fn probe(&self, path: &Path) -> Result<GifMetadata, GifsliceError>;

    /// Apply `ops` to `source`, writing the result to `dest`.
    ///
    /// Implementations must fail (rather than succeed silently) when the
    /// tool exits non-zero or `dest` is missing afterwards.
    fn transform(
        &self,
        source: &Path,
        ops: &[TransformOp],
        dest: &Path,
    ) -> Result<(), GifsliceError>;
}

/// Optional finishing transforms applied to every output segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[must_use]
pub struct SegmentOptions {
    /// Target width in pixels; height follows the aspect ratio.
    pub width: Option<u32>,
    /// Target frame rate.
    pub fps: Option<f64>,
    /// How the target frame rate is applied (ignored without `fps`).
    pub fps_mode: FpsMode,
    /// Target palette size.
    pub colors: Option<u32>,
}

impl SegmentOptions {
    /// Create options with no finishing transforms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the target frame rate and retiming policy.
    pub fn with_fps(mut self, fps: f64, mode: FpsMode) -> Self {
        self.fps = Some(fps);
        self.fps_mode = mode;
        self
    }

    /// Set the target palette size.
    pub fn with_colors(mut self, colors: u32) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Returns `true` when no transform is requested at all.
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.fps.is_none() && self.colors.is_none()
    }
}

/// One resolved segment, ready for the external pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineJob {
    /// Source GIF path.
    pub source: PathBuf,
    /// First frame of the segment (inclusive).
    pub start_frame: usize,
    /// Last frame of the segment (inclusive).
    pub end_frame: usize,
    /// Final output path for the committed artifact.
    pub output: PathBuf,
}

/// Sequences per-segment pipeline jobs against an injected [`GifTool`].
///
/// Jobs run strictly one at a time, in sorted boundary/range order. A
/// failing job is logged and skipped; the batch always continues.
pub struct Orchestrator<'a> {
    tool: &'a dyn GifTool,
    progress: Option<&'a dyn ProgressCallback>,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator over the given tool.
    pub fn new(tool: &'a dyn GifTool) -> Self {
        Self {
            tool,
            progress: None,
            cancel: None,
        }
    }

    /// Attach a per-segment progress callback.
    pub fn with_progress(mut self, progress: &'a dyn ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Attach a cancellation token, polled before each job.
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Execute a segmentation plan.
    ///
    /// Returns the output paths that were actually committed, in dispatch
    /// order. Per-segment failures are logged as warnings and skipped —
    /// the caller is responsible for comparing the returned count against
    /// [`SegmentPlan::segment_count`]. Cancellation stops before the next
    /// job; already-committed outputs are kept.
    ///
    /// # Errors
    ///
    /// Only precondition failures are terminal: the output directory could
    /// not be created.
    pub fn run_segmentation(
        &self,
        source: &Path,
        timeline: &FrameTimeline,
        plan: &SegmentPlan,
        options: &SegmentOptions,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, GifsliceError> {
        fs::create_dir_all(output_dir)?;

        let jobs = self.resolve_jobs(source, timeline, plan, output_dir);
        let total = jobs.len() as u64;
        let mut committed = Vec::new();

        for (index, job) in jobs.iter().enumerate() {
            if self.is_cancelled() {
                log::warn!(
                    "segmentation cancelled after {} of {} segments",
                    committed.len(),
                    total,
                );
                break;
            }

            match self.run_job(job, timeline, options) {
                Ok(()) => {
                    log::debug!(
                        "committed segment {} -> {}",
                        index + 1,
                        job.output.display(),
                    );
                    committed.push(job.output.clone());
                    self.report(index as u64 + 1, total, Some(job.output.clone()));
                }
                Err(error) => {
                    log::warn!(
                        "segment {} (frames {}-{}) failed: {error}",
                        index + 1,
                        job.start_frame,
                        job.end_frame,
                    );
                    self.report(index as u64 + 1, total, None);
                }
            }
        }

        Ok(committed)
    }

    /// Optimize a whole file without segmentation.
    ///
    /// Unlike batch segmentation this is a single-target operation, so a
    /// pipeline failure propagates to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`GifsliceError::NoOptimizeParameters`] when `options` is
    /// empty — an optimize request must change something, it is never a
    /// silent copy. Tool failures surface as
    /// [`GifsliceError::CommandFailed`] or
    /// [`GifsliceError::MissingOutput`].
    pub fn optimize(
        &self,
        source: &Path,
        timeline: &FrameTimeline,
        options: &SegmentOptions,
        output: &Path,
    ) -> Result<PathBuf, GifsliceError> {
        if options.is_empty() {
            return Err(GifsliceError::NoOptimizeParameters);
        }
        if timeline.is_empty() {
            return Err(GifsliceError::FrameOutOfRange {
                frame: 0,
                frame_count: 0,
            });
        }
        if self.is_cancelled() {
            return Err(GifsliceError::Cancelled);
        }

        let job = PipelineJob {
            source: source.to_path_buf(),
            start_frame: 0,
            end_frame: timeline.frame_count() - 1,
            output: output.to_path_buf(),
        };
        self.run_job(&job, timeline, options)?;
        Ok(job.output)
    }

    /// Resolve a plan into concrete jobs with deterministic output names.
    ///
    /// Split segments become `{stem}_part{n}`; trim ranges become
    /// `{stem}_trim` (single range) or `{stem}_trim{n}` (several ranges in
    /// one invocation). A window that resolves to no frames is skipped with
    /// a warning.
    fn resolve_jobs(
        &self,
        source: &Path,
        timeline: &FrameTimeline,
        plan: &SegmentPlan,
        output_dir: &Path,
    ) -> Vec<PipelineJob> {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let extension = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| ".gif".to_string());

        let mut jobs = Vec::new();
        match plan {
            SegmentPlan::Split { boundaries } => {
                for (index, window) in boundaries.windows(2).enumerate() {
                    let (start_time, end_time) = (window[0], window[1]);
                    let Some((start_frame, end_frame)) =
                        timeline.frame_range_from_time(start_time, Some(end_time))
                    else {
                        log::warn!(
                            "skipping segment {} ({start_time:.2}-{end_time:.2}s): no frames in window",
                            index + 1,
                        );
                        continue;
                    };
                    jobs.push(PipelineJob {
                        source: source.to_path_buf(),
                        start_frame,
                        end_frame,
                        output: output_dir.join(format!("{stem}_part{}{extension}", index + 1)),
                    });
                }
            }
            SegmentPlan::Trim { ranges } => {
                let single = ranges.len() == 1;
                for (index, range) in ranges.iter().enumerate() {
                    let resolved = match *range {
                        // Frame ranges bypass time conversion entirely.
                        TrimRange::Frames { start, end } if end < timeline.frame_count() => {
                            Some((start, end))
                        }
                        TrimRange::Frames { .. } => None,
                        TrimRange::Time { start, end } => {
                            timeline.frame_range_from_time(start, Some(end))
                        }
                    };
                    let Some((start_frame, end_frame)) = resolved else {
                        log::warn!("skipping trim range {}: outside the timeline", index + 1);
                        continue;
                    };
                    let name = if single {
                        format!("{stem}_trim{extension}")
                    } else {
                        format!("{stem}_trim{}{extension}", index + 1)
                    };
                    jobs.push(PipelineJob {
                        source: source.to_path_buf(),
                        start_frame,
                        end_frame,
                        output: output_dir.join(name),
                    });
                }
            }
        }
        jobs
    }

    /// Run one job through coalesce → extract → finish → commit.
    ///
    /// The intermediates are drop-guarded temporaries, so they are removed
    /// on success, on error, and on unwind alike. The finished artifact is
    /// staged next to the output path and committed with an atomic rename.
    fn run_job(
        &self,
        job: &PipelineJob,
        timeline: &FrameTimeline,
        options: &SegmentOptions,
    ) -> Result<(), GifsliceError> {
        let coalesced = intermediate("coalesce")?;
        let extracted = intermediate("extract")?;

        self.tool
            .transform(&job.source, &[TransformOp::Coalesce], coalesced.path())?;
        self.tool.transform(
            coalesced.path(),
            &[TransformOp::ExtractRange {
                start: job.start_frame,
                end: job.end_frame,
            }],
            extracted.path(),
        )?;

        let ops = finishing_ops(job, timeline, options);
        let staged = staged_output(&job.output)?;
        self.tool.transform(extracted.path(), &ops, staged.path())?;

        staged
            .persist(&job.output)
            .map_err(|persist| GifsliceError::Io(persist.error))?;
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancellationToken::is_cancelled)
    }

    fn report(&self, current: u64, total: u64, output: Option<PathBuf>) {
        if let Some(progress) = self.progress {
            progress.on_progress(&ProgressInfo {
                current,
                total,
                output,
            });
        }
    }
}

/// Execute a segmentation plan with no progress reporting or cancellation.
///
/// Convenience wrapper over [`Orchestrator::run_segmentation`].
pub fn run_segmentation(
    tool: &dyn GifTool,
    source: &Path,
    timeline: &FrameTimeline,
    plan: &SegmentPlan,
    options: &SegmentOptions,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, GifsliceError> {
    Orchestrator::new(tool).run_segmentation(source, timeline, plan, options, output_dir)
}

/// Optimize a whole file without segmentation.
///
/// Convenience wrapper over [`Orchestrator::optimize`].
pub fn optimize(
    tool: &dyn GifTool,
    source: &Path,
    timeline: &FrameTimeline,
    options: &SegmentOptions,
    output: &Path,
) -> Result<PathBuf, GifsliceError> {
    Orchestrator::new(tool).optimize(source, timeline, options, output)
}

/// Build the finishing ops list for one segment.
///
/// A delay rewrite needs the frames coalesced again after extraction, so
/// `Coalesce` leads the list whenever an fps target is set. Layer
/// optimization always closes the list.
fn finishing_ops(
    job: &PipelineJob,
    timeline: &FrameTimeline,
    options: &SegmentOptions,
) -> Vec<TransformOp> {
    let mut ops = Vec::new();

    if options.fps.is_some() {
        ops.push(TransformOp::Coalesce);
    }
    if let Some(width) = options.width {
        ops.push(TransformOp::ResizeWidth(width));
    }
    if let Some(fps) = options.fps {
        ops.push(TransformOp::SetUniformDelay(segment_delay(
            job, timeline, fps, options.fps_mode,
        )));
    }
    if let Some(colors) = options.colors {
        ops.push(TransformOp::SetColors(colors));
    }
    ops.push(TransformOp::OptimizeLayers);
    ops
}

/// The uniform delay applied to a retimed segment.
///
/// Normalize mode ignores the source pacing. Preserve mode rescales the
/// segment's own delays and applies their truncated mean — the external
/// tool sets a single delay for all frames, so the mean is the closest
/// uniform approximation that keeps the target average rate.
fn segment_delay(job: &PipelineJob, timeline: &FrameTimeline, fps: f64, mode: FpsMode) -> u32 {
    match mode {
        FpsMode::Normalize => uniform_delay(fps),
        FpsMode::Preserve => {
            let segment = timeline.segment_delays(job.start_frame, job.end_frame);
            if segment.is_empty() {
                return uniform_delay(fps);
            }
            let scaled = rescale_delays(segment, fps);
            let mean = scaled.iter().map(|&d| u64::from(d)).sum::<u64>() / scaled.len() as u64;
            (mean as u32).max(1)
        }
    }
}

/// A unique drop-guarded intermediate `.gif` in the system temp directory.
fn intermediate(stage: &str) -> Result<NamedTempFile, GifsliceError> {
    Ok(TempBuilder::new()
        .prefix(&format!("gifslice_{stage}_"))
        .suffix(".gif")
        .tempfile()?)
}

/// A staging file in the output's directory, so the final commit is a
/// same-filesystem atomic rename.
fn staged_output(output: &Path) -> Result<NamedTempFile, GifsliceError> {
    let directory = output.parent().filter(|p| !p.as_os_str().is_empty());
    Ok(TempBuilder::new()
        .prefix(".gifslice_stage_")
        .suffix(".gif")
        .tempfile_in(directory.unwrap_or_else(|| Path::new(".")))?)
}
