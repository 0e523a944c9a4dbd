// crates/caselens-media/src/sample.rs
//
// Evidence frame sampling: n evenly spaced stills from the middle 80% of a
// source, decoded at half resolution and JPEG-compressed for transport.
//
// The first and last 10% are skipped on purpose — that's where slates,
// lens-cap fumbling, and camera handling live, and n-1 equal intervals over
// the remaining window give the collaborator a uniform picture of the
// footage.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use ffmpeg_the_third::format::Pixel;

use caselens_core::media_types::FrameSample;

use crate::decode::FrameDecoder;
use crate::error::MediaError;
use crate::helpers::jpeg;

/// Sampling window as fractions of the source duration.
pub const WINDOW_START: f64 = 0.1;
pub const WINDOW_END: f64 = 0.9;

/// The timestamps an n-frame run will request: n points dividing
/// `[0.1·d, 0.9·d]` into n−1 equal intervals. Strictly increasing.
///
/// Callers own the n ≥ 2 contract; anything smaller is clamped.
///
/// ```
/// use caselens_media::sample::sample_plan;
/// assert_eq!(sample_plan(10.0, 5), vec![1.0, 3.0, 5.0, 7.0, 9.0]);
/// ```
pub fn sample_plan(duration_secs: f64, n: usize) -> Vec<f64> {
    debug_assert!(n >= 2, "sample_plan needs at least two frames");
    let n = n.max(2);
    let start = duration_secs * WINDOW_START;
    let step = duration_secs * (WINDOW_END - WINDOW_START) / (n - 1) as f64;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Decode the planned stills for one source, sequentially through a single
/// pipeline. Each sample records the timestamp that was requested, not where
/// the decoder actually landed.
///
/// Any open/decode failure is fatal for the whole run; `on_progress` is
/// called after each finished frame.
pub fn sample_frames(
    path: &Path,
    duration_secs: f64,
    n: usize,
    cancel: &AtomicBool,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<Vec<FrameSample>, MediaError> {
    let plan = sample_plan(duration_secs, n);
    let total = plan.len();

    let mut decoder = FrameDecoder::open(path).map_err(MediaError::unreadable)?;
    let (half_w, half_h) = decoder.half_dims();

    let mut samples = Vec::with_capacity(total);
    for (i, &ts) in plan.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            return Err(MediaError::Cancelled);
        }
        let frame = decoder
            .frame_at(ts, half_w, half_h, Pixel::RGB24)
            .map_err(|e| MediaError::unreadable(format!("decode at {ts:.2}s: {e}")))?;
        let jpeg = jpeg::encode_rgb(&frame.data, frame.width, frame.height)
            .map_err(|e| MediaError::unreadable(format!("encode at {ts:.2}s: {e}")))?;
        samples.push(FrameSample { timestamp_secs: ts, jpeg });
        on_progress(i + 1, total);
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_second_source_five_frames_lands_on_odd_seconds() {
        let plan = sample_plan(10.0, 5);
        assert_eq!(plan, vec![1.0, 3.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn plans_are_strictly_increasing_inside_the_window() {
        for &(dur, n) in &[(7.3, 2), (61.0, 8), (3600.0, 24), (0.5, 3)] {
            let plan = sample_plan(dur, n);
            assert_eq!(plan.len(), n);
            for pair in plan.windows(2) {
                assert!(pair[0] < pair[1], "not increasing for dur={dur} n={n}");
            }
            assert!(plan[0] >= dur * WINDOW_START - 1e-9);
            assert!(*plan.last().unwrap() <= dur * WINDOW_END + 1e-9);
        }
    }

    #[test]
    fn two_frames_sit_on_the_window_edges() {
        let plan = sample_plan(100.0, 2);
        assert_eq!(plan, vec![10.0, 90.0]);
    }
}
