// crates/caselens-media/src/helpers/seek.rs
//
// Seek helper wrapping ffmpeg's avformat seek with consistent soft-fail
// behaviour. All seeks route through here so the guard + log pattern exists
// once; the caller decides policy via the return value.

use ffmpeg_the_third as ffmpeg;

/// Seek `ictx` to `target_secs` seconds from the start of the file.
///
/// Returns `true` if the seek succeeded (or was skipped because the target
/// is 0). Returns `false` if the seek failed — the demuxer keeps decoding
/// from wherever it is, and the caller's PTS filter skips pre-roll frames.
///
/// # Why backward seek (`..=seek_ts`)
/// A forward seek lands on the keyframe AT OR AFTER the target. When the
/// target falls mid-GOP that keyframe can be seconds late, and the frame the
/// analyst asked for is simply absent from the decode stream. A backward
/// seek lands on the keyframe BEFORE the target; the pre-roll frames are
/// discarded by the caller's PTS filter, so the emitted frame is still the
/// right one.
///
/// # Why skip at 0.0
/// `avformat_seek_file(max_ts=0)` returns EPERM on Windows when called on a
/// freshly-opened context. The demuxer already starts at 0, so skipping the
/// call is both correct and quieter.
pub fn seek_to_secs(
    ictx: &mut ffmpeg::format::context::Input,
    target_secs: f64,
    label: &str,
) -> bool {
    if target_secs <= 0.0 {
        return true;
    }

    let seek_ts = (target_secs * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
    match ictx.seek(seek_ts, ..=seek_ts) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("seek soft-fail in {label} at {target_secs:.3}s: {e}");
            false
        }
    }
}
