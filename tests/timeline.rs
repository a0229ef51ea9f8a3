//! Timeline model integration tests.
//!
//! The frame↔time conversion rules are pinned exactly, including the
//! asymmetric boundary scans — downstream split/trim behavior depends on
//! them.

use gifslice::FrameTimeline;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn time_window_resolves_to_covering_frames() {
    // Five frames of 10cs: boundaries at 0.1, 0.2, 0.3, 0.4, 0.5s.
    let timeline = FrameTimeline::new(vec![10, 10, 10, 10, 10]);

    // 0.15 falls in frame 1's window, 0.35 ends inside frame 3.
    assert_eq!(timeline.frame_range_from_time(0.15, Some(0.35)), Some((1, 3)));
}

#[test]
fn start_time_clamps_to_zero() {
    let timeline = FrameTimeline::new(vec![10, 10, 10, 10, 10]);
    assert_eq!(timeline.frame_range_from_time(-2.0, Some(0.15)), Some((0, 1)));
}

#[test]
fn missing_or_excessive_end_clamps_to_total_duration() {
    let timeline = FrameTimeline::new(vec![10, 10, 10, 10, 10]);
    assert_eq!(timeline.frame_range_from_time(0.25, None), Some((2, 4)));
    assert_eq!(timeline.frame_range_from_time(0.25, Some(99.0)), Some((2, 4)));
}

#[test]
fn empty_window_is_invalid() {
    let timeline = FrameTimeline::new(vec![10, 10, 10]);
    assert_eq!(timeline.frame_range_from_time(0.2, Some(0.2)), None);
    assert_eq!(timeline.frame_range_from_time(0.3, Some(0.1)), None);
    // Start past the end clamps the window shut.
    assert_eq!(timeline.frame_range_from_time(5.0, None), None);
}

#[test]
fn empty_timeline_has_no_frame_ranges() {
    let timeline = FrameTimeline::new(Vec::new());
    assert_eq!(timeline.frame_range_from_time(0.0, Some(1.0)), None);
    assert_eq!(timeline.time_range_from_frames(0, 0), None);
    assert_eq!(timeline.total_duration(), 0.0);
    assert_eq!(timeline.fps(), 0.0);
}

#[test]
fn end_scan_keeps_the_frame_ending_past_the_window() {
    let timeline = FrameTimeline::new(vec![10, 10, 10, 10, 10]);

    // A window ending exactly on frame 1's boundary still takes frame 2
    // (the first frame ending past 0.2); the start scan is strict, so a
    // window starting there begins at frame 2 as well.
    assert_eq!(timeline.frame_range_from_time(0.0, Some(0.2)), Some((0, 2)));
    assert_eq!(timeline.frame_range_from_time(0.2, Some(0.5)), Some((2, 4)));
}

#[test]
fn frame_range_converts_to_inclusive_time_window() {
    let timeline = FrameTimeline::new(vec![10, 10, 10, 10, 10]);
    let (start, end) = timeline.time_range_from_frames(1, 3).expect("valid range");
    assert!(approx(start, 0.1), "start was {start}");
    assert!(approx(end, 0.4), "end was {end}");

    // Trimmed duration equals end - start.
    assert!(approx(end - start, 0.3));
}

#[test]
fn reversed_or_overflowing_frame_ranges_are_invalid() {
    let timeline = FrameTimeline::new(vec![10, 10, 10]);
    assert_eq!(timeline.time_range_from_frames(2, 1), None);
    assert_eq!(timeline.time_range_from_frames(0, 3), None);
}

#[test]
fn frame_to_time_round_trip_never_shrinks() {
    let timeline = FrameTimeline::new(vec![5, 25, 10, 40, 20]);

    for &(first, last) in &[(0, 0), (0, 4), (1, 3), (2, 2), (3, 4)] {
        let (start, end) = timeline
            .time_range_from_frames(first, last)
            .expect("valid frame range");
        let (round_first, round_last) = timeline
            .frame_range_from_time(start, Some(end))
            .expect("round-tripped window resolves");
        assert!(
            round_first <= first && round_last >= last,
            "({first},{last}) round-tripped to ({round_first},{round_last})",
        );
    }
}

#[test]
fn frame_start_times_drop_out_of_range_indices() {
    let timeline = FrameTimeline::new(vec![10, 10, 10, 10, 10]);
    let starts = timeline.frame_start_times(&[0, 2, 99]);
    assert_eq!(starts.len(), 2);
    assert!(approx(starts[0], 0.0));
    assert!(approx(starts[1], 0.2));
}

#[test]
fn probe_repair_pads_with_last_known_delay() {
    let timeline = FrameTimeline::from_probe(vec![10, 20], 4);
    assert_eq!(timeline.delays(), &[10, 20, 20, 20]);
}

#[test]
fn probe_repair_defaults_when_no_delays_reported() {
    let timeline = FrameTimeline::from_probe(Vec::new(), 3);
    assert_eq!(timeline.delays(), &[10, 10, 10]);
}

#[test]
fn probe_repair_truncates_extra_delays() {
    let timeline = FrameTimeline::from_probe(vec![10, 20, 30], 2);
    assert_eq!(timeline.delays(), &[10, 20]);
}

#[test]
fn zero_delays_are_floored_to_one_centisecond() {
    let timeline = FrameTimeline::new(vec![0, 10, 0]);
    assert_eq!(timeline.delays(), &[1, 10, 1]);
    assert!(timeline.total_duration() > 0.0);
}

#[test]
fn derived_rates_follow_the_mean_delay() {
    let timeline = FrameTimeline::new(vec![10, 20, 30]);
    assert!(approx(timeline.average_delay(), 20.0));
    assert!(approx(timeline.fps(), 5.0));
    assert!(approx(timeline.total_duration(), 0.6));
}

#[test]
fn segment_delays_clamp_to_the_timeline() {
    let timeline = FrameTimeline::new(vec![10, 20, 30, 40]);
    assert_eq!(timeline.segment_delays(1, 2), &[20, 30]);
    assert_eq!(timeline.segment_delays(2, 99), &[30, 40]);
    assert!(timeline.segment_delays(9, 10).is_empty());
}
