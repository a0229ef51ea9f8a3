//! Benchmarks for timeline arithmetic and delay rescaling.
//!
//! Run with: cargo bench
//!
//! These operate on synthetic timelines only, so no fixture files or
//! external tools are required.

use criterion::Criterion;
use std::hint::black_box;

use gifslice::{FrameTimeline, PlanMode, plan_segments, rescale_delays};

/// A pseudo-random but deterministic timeline of `frames` delays.
fn synthetic_timeline(frames: usize) -> FrameTimeline {
    let delays = (0..frames)
        .map(|i| ((i * 31 + 7) % 40) as u32 + 2)
        .collect();
    FrameTimeline::new(delays)
}

fn benchmark_frame_range_lookup(criterion: &mut Criterion) {
    let timeline = synthetic_timeline(10_000);
    let total = timeline.total_duration();

    criterion.bench_function("frame range near the start", |bencher| {
        bencher.iter(|| {
            timeline.frame_range_from_time(black_box(0.5), black_box(Some(2.5)))
        });
    });

    criterion.bench_function("frame range near the end", |bencher| {
        bencher.iter(|| {
            timeline.frame_range_from_time(black_box(total - 3.0), black_box(None))
        });
    });
}

fn benchmark_frame_start_times(criterion: &mut Criterion) {
    let timeline = synthetic_timeline(10_000);
    let frames: Vec<usize> = (0..10_000).step_by(100).collect();

    criterion.bench_function("start times for 100 frames", |bencher| {
        bencher.iter(|| timeline.frame_start_times(black_box(&frames)));
    });
}

fn benchmark_rescale(criterion: &mut Criterion) {
    let timeline = synthetic_timeline(10_000);

    criterion.bench_function("rescale 10k delays", |bencher| {
        bencher.iter(|| rescale_delays(black_box(timeline.delays()), black_box(12.0)));
    });
}

fn benchmark_planning(criterion: &mut Criterion) {
    let timeline = synthetic_timeline(10_000);
    let points: Vec<String> = (1..100).map(|i| format!("{}.5", i * 20)).collect();
    let shorthand = points.join(",");

    criterion.bench_function("plan a 100-point split", |bencher| {
        bencher.iter(|| {
            plan_segments(&timeline, black_box(&shorthand), PlanMode::Auto).unwrap()
        });
    });
}

criterion::criterion_group!(
    benches,
    benchmark_frame_range_lookup,
    benchmark_frame_start_times,
    benchmark_rescale,
    benchmark_planning,
);
criterion::criterion_main!(benches);
