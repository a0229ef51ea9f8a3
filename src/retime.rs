//! Frame-rate retiming policies.
//!
//! Two policies are supported when a target frame rate is requested:
//!
//! - [`FpsMode::Normalize`] assigns every frame the same delay,
//!   `round(100 / fps)` centiseconds, discarding the source's pacing.
//! - [`FpsMode::Preserve`] rescales each delay proportionally so the
//!   *average* rate hits the target while the frame-to-frame pacing ratio is
//!   kept — a frame twice as long as its neighbour stays twice as long.
//!
//! Both policies floor every output delay at 1cs so no frame becomes
//! undisplayable.

/// How a target frame rate is applied to a delay sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FpsMode {
    /// Equal delays for all frames (`round(100 / fps)` centiseconds).
    #[default]
    Normalize,
    /// Proportional rescaling that keeps relative frame-to-frame pacing.
    Preserve,
}

/// Rescale a delay sequence so its average rate matches `target_fps` while
/// preserving relative pacing.
///
/// Returns the input unchanged when there is nothing meaningful to do: an
/// empty sequence, a non-positive target, or a degenerate zero average
/// delay. Every output delay is at least 1cs.
///
/// # Example
///
/// ```
/// use gifslice::rescale_delays;
///
/// // Average 13.33cs scaled down to a 10cs average; the middle frame stays
/// // twice as long as its neighbours.
/// assert_eq!(rescale_delays(&[10, 20, 10], 10.0), vec![8, 15, 8]);
/// ```
pub fn rescale_delays(delays: &[u32], target_fps: f64) -> Vec<u32> {
    if delays.is_empty() || target_fps <= 0.0 {
        return delays.to_vec();
    }

    let target_delay = 100.0 / target_fps;
    let original_average =
        delays.iter().map(|&d| u64::from(d)).sum::<u64>() as f64 / delays.len() as f64;
    if original_average == 0.0 {
        return delays.to_vec();
    }

    let scale_factor = original_average / target_delay;
    delays
        .iter()
        .map(|&delay| ((f64::from(delay) / scale_factor).round() as u32).max(1))
        .collect()
}

/// The uniform per-frame delay, in centiseconds, for a normalized target
/// frame rate.
///
/// Rounded to the nearest centisecond and floored at 1. A non-positive
/// `target_fps` yields the 1cs floor.
pub fn uniform_delay(target_fps: f64) -> u32 {
    if target_fps <= 0.0 {
        return 1;
    }
    ((100.0 / target_fps).round() as u32).max(1)
}
