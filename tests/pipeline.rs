//! Orchestrator integration tests.
//!
//! These run against a fake recording [`GifTool`], so no ImageMagick is
//! needed: the tests assert the sequencing of external invocations, the
//! continue-on-error batch behavior, output naming, and the atomic commit.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use gifslice::{
    CancellationToken, FpsMode, FrameTimeline, GifMetadata, GifTool, GifsliceError, Orchestrator,
    PlanMode, SegmentOptions, SegmentPlan, TransformOp, TrimRange, plan_segments,
};

/// Records every transform invocation; optionally fails the job whose
/// extract range matches `fail_extract`.
#[derive(Default)]
struct FakeTool {
    calls: Mutex<Vec<(PathBuf, Vec<TransformOp>, PathBuf)>>,
    fail_extract: Option<(usize, usize)>,
}

impl FakeTool {
    fn failing_on(start: usize, end: usize) -> Self {
        Self {
            fail_extract: Some((start, end)),
            ..Self::default()
        }
    }

    fn extract_ranges(&self) -> Vec<(usize, usize)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, ops, _)| ops.clone())
            .filter_map(|op| match op {
                TransformOp::ExtractRange { start, end } => Some((start, end)),
                _ => None,
            })
            .collect()
    }

    /// The finishing ops list of the last completed job.
    fn last_finishing_ops(&self) -> Vec<TransformOp> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, ops, _)| ops.clone())
            .filter(|ops| ops.contains(&TransformOp::OptimizeLayers))
            .next_back()
            .expect("at least one finishing invocation")
    }
}

impl GifTool for FakeTool {
    fn probe(&self, path: &Path) -> Result<GifMetadata, GifsliceError> {
        Err(GifsliceError::ProbeFailed {
            path: path.to_path_buf(),
            reason: "fake tool does not probe".to_string(),
        })
    }

    fn transform(
        &self,
        source: &Path,
        ops: &[TransformOp],
        dest: &Path,
    ) -> Result<(), GifsliceError> {
        self.calls
            .lock()
            .unwrap()
            .push((source.to_path_buf(), ops.to_vec(), dest.to_path_buf()));

        if let Some((start, end)) = self.fail_extract
            && ops.contains(&TransformOp::ExtractRange { start, end })
        {
            return Err(GifsliceError::CommandFailed {
                tool: "fake".to_string(),
                exit_code: 1,
                message: "injected failure".to_string(),
            });
        }

        std::fs::write(dest, b"GIF89a")?;
        Ok(())
    }
}

fn five_frame_timeline() -> FrameTimeline {
    FrameTimeline::new(vec![10, 10, 10, 10, 10])
}

#[test]
fn split_commits_one_output_per_boundary_pair() {
    let tool = FakeTool::default();
    let timeline = five_frame_timeline();
    let out_dir = tempfile::tempdir().expect("temp dir");

    let plan = plan_segments(&timeline, "0.2", PlanMode::Auto)
        .expect("valid input")
        .expect("plan produced");
    let outputs = Orchestrator::new(&tool)
        .run_segmentation(
            Path::new("clip.gif"),
            &timeline,
            &plan,
            &SegmentOptions::new(),
            out_dir.path(),
        )
        .expect("segmentation runs");

    assert_eq!(
        outputs,
        vec![
            out_dir.path().join("clip_part1.gif"),
            out_dir.path().join("clip_part2.gif"),
        ],
    );
    for output in &outputs {
        assert!(output.exists(), "{} was not committed", output.display());
    }
    assert_eq!(tool.extract_ranges(), vec![(0, 2), (2, 4)]);
}

#[test]
fn failing_segment_is_skipped_and_the_batch_continues() {
    let timeline = five_frame_timeline();
    let tool = FakeTool::failing_on(0, 2);
    let out_dir = tempfile::tempdir().expect("temp dir");

    let plan = plan_segments(&timeline, "0.2", PlanMode::Auto)
        .expect("valid input")
        .expect("plan produced");
    let outputs = Orchestrator::new(&tool)
        .run_segmentation(
            Path::new("clip.gif"),
            &timeline,
            &plan,
            &SegmentOptions::new(),
            out_dir.path(),
        )
        .expect("batch survives a failing segment");

    // Only the second segment commits; the first leaves nothing behind.
    assert_eq!(outputs, vec![out_dir.path().join("clip_part2.gif")]);
    assert!(!out_dir.path().join("clip_part1.gif").exists());
}

#[test]
fn no_staging_leftovers_after_success_or_failure() {
    let timeline = five_frame_timeline();
    let tool = FakeTool::failing_on(0, 2);
    let out_dir = tempfile::tempdir().expect("temp dir");

    let plan = plan_segments(&timeline, "0.2", PlanMode::Auto)
        .expect("valid input")
        .expect("plan produced");
    Orchestrator::new(&tool)
        .run_segmentation(
            Path::new("clip.gif"),
            &timeline,
            &plan,
            &SegmentOptions::new(),
            out_dir.path(),
        )
        .expect("segmentation runs");

    let names: Vec<String> = std::fs::read_dir(out_dir.path())
        .expect("read out dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["clip_part2.gif"], "unexpected leftovers: {names:?}");
}

#[test]
fn single_trim_range_uses_the_plain_trim_name() {
    let tool = FakeTool::default();
    let timeline = five_frame_timeline();
    let out_dir = tempfile::tempdir().expect("temp dir");

    let plan = SegmentPlan::Trim {
        ranges: vec![TrimRange::Frames { start: 1, end: 3 }],
    };
    let outputs = Orchestrator::new(&tool)
        .run_segmentation(
            Path::new("clip.gif"),
            &timeline,
            &plan,
            &SegmentOptions::new(),
            out_dir.path(),
        )
        .expect("segmentation runs");

    assert_eq!(outputs, vec![out_dir.path().join("clip_trim.gif")]);
    // Frame-space trims pass indices straight through.
    assert_eq!(tool.extract_ranges(), vec![(1, 3)]);
}

#[test]
fn multiple_trim_ranges_are_numbered() {
    let tool = FakeTool::default();
    let timeline = five_frame_timeline();
    let out_dir = tempfile::tempdir().expect("temp dir");

    let plan = SegmentPlan::Trim {
        ranges: vec![
            TrimRange::Frames { start: 0, end: 1 },
            TrimRange::Frames { start: 3, end: 4 },
        ],
    };
    let outputs = Orchestrator::new(&tool)
        .run_segmentation(
            Path::new("clip.gif"),
            &timeline,
            &plan,
            &SegmentOptions::new(),
            out_dir.path(),
        )
        .expect("segmentation runs");

    assert_eq!(
        outputs,
        vec![
            out_dir.path().join("clip_trim1.gif"),
            out_dir.path().join("clip_trim2.gif"),
        ],
    );
}

#[test]
fn finishing_ops_follow_the_requested_transforms() {
    let tool = FakeTool::default();
    let timeline = FrameTimeline::new(vec![10, 20, 10]);
    let out_dir = tempfile::tempdir().expect("temp dir");
    let output = out_dir.path().join("small.gif");

    let options = SegmentOptions::new()
        .with_width(320)
        .with_fps(10.0, FpsMode::Preserve)
        .with_colors(64);
    Orchestrator::new(&tool)
        .optimize(Path::new("clip.gif"), &timeline, &options, &output)
        .expect("optimize runs");

    // Preserve mode: [10,20,10] rescaled to [8,15,8], truncated mean 10.
    assert_eq!(
        tool.last_finishing_ops(),
        vec![
            TransformOp::Coalesce,
            TransformOp::ResizeWidth(320),
            TransformOp::SetUniformDelay(10),
            TransformOp::SetColors(64),
            TransformOp::OptimizeLayers,
        ],
    );
    assert!(output.exists());
}

#[test]
fn normalize_mode_ignores_source_pacing() {
    let tool = FakeTool::default();
    let timeline = FrameTimeline::new(vec![10, 20, 10]);
    let out_dir = tempfile::tempdir().expect("temp dir");
    let output = out_dir.path().join("small.gif");

    let options = SegmentOptions::new().with_fps(12.0, FpsMode::Normalize);
    Orchestrator::new(&tool)
        .optimize(Path::new("clip.gif"), &timeline, &options, &output)
        .expect("optimize runs");

    assert_eq!(
        tool.last_finishing_ops(),
        vec![
            TransformOp::Coalesce,
            TransformOp::SetUniformDelay(8),
            TransformOp::OptimizeLayers,
        ],
    );
}

#[test]
fn optimize_requires_at_least_one_parameter() {
    let tool = FakeTool::default();
    let timeline = five_frame_timeline();

    let result = Orchestrator::new(&tool).optimize(
        Path::new("clip.gif"),
        &timeline,
        &SegmentOptions::new(),
        Path::new("out.gif"),
    );
    assert!(matches!(result, Err(GifsliceError::NoOptimizeParameters)));
    assert!(tool.calls.lock().unwrap().is_empty(), "no tool invocation expected");
}

#[test]
fn optimize_covers_the_full_frame_range() {
    let tool = FakeTool::default();
    let timeline = five_frame_timeline();
    let out_dir = tempfile::tempdir().expect("temp dir");
    let output = out_dir.path().join("out.gif");

    Orchestrator::new(&tool)
        .optimize(
            Path::new("clip.gif"),
            &timeline,
            &SegmentOptions::new().with_width(200),
            &output,
        )
        .expect("optimize runs");

    assert_eq!(tool.extract_ranges(), vec![(0, 4)]);
}

#[test]
fn cancellation_stops_before_the_first_job() {
    let tool = FakeTool::default();
    let timeline = five_frame_timeline();
    let out_dir = tempfile::tempdir().expect("temp dir");

    let token = CancellationToken::new();
    token.cancel();

    let plan = plan_segments(&timeline, "0.2", PlanMode::Auto)
        .expect("valid input")
        .expect("plan produced");
    let outputs = Orchestrator::new(&tool)
        .with_cancellation(&token)
        .run_segmentation(
            Path::new("clip.gif"),
            &timeline,
            &plan,
            &SegmentOptions::new(),
            out_dir.path(),
        )
        .expect("cancelled run still returns");

    assert!(outputs.is_empty());
    assert!(tool.calls.lock().unwrap().is_empty());
}

#[test]
fn out_of_range_trim_plan_entries_are_skipped() {
    let tool = FakeTool::default();
    let timeline = five_frame_timeline();
    let out_dir = tempfile::tempdir().expect("temp dir");

    // Hand-built plan with a range past the timeline.
    let plan = SegmentPlan::Trim {
        ranges: vec![
            TrimRange::Frames { start: 0, end: 1 },
            TrimRange::Frames { start: 10, end: 20 },
        ],
    };
    let outputs = Orchestrator::new(&tool)
        .run_segmentation(
            Path::new("clip.gif"),
            &timeline,
            &plan,
            &SegmentOptions::new(),
            out_dir.path(),
        )
        .expect("segmentation runs");

    assert_eq!(outputs, vec![out_dir.path().join("clip_trim1.gif")]);
}
