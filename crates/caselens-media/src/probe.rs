// crates/caselens-media/src/probe.rs
//
// In-process FFmpeg probing: container duration and native video dimensions.
// Everything downstream (viewport mapping, sampling windows, ingest) keys off
// this one answer, so a probe failure marks the whole source unreadable.

use std::path::Path;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

use caselens_core::media_types::SourceInfo;

use crate::error::MediaError;

pub fn probe_source(path: &Path) -> Result<SourceInfo, MediaError> {
    let ictx = input(path).map_err(|e| MediaError::unreadable(format!("open: {e}")))?;

    let stream = ictx
        .streams()
        .best(Type::Video)
        .ok_or_else(|| MediaError::SourceUnreadable("no video stream".into()))?;

    let (width, height) = unsafe {
        let p = stream.parameters().as_ptr();
        ((*p).width as u32, (*p).height as u32)
    };
    if width == 0 || height == 0 {
        return Err(MediaError::SourceUnreadable("video dimensions unknown".into()));
    }

    // Container duration first; fall back to the stream's own duration for
    // containers that don't carry one.
    let mut duration = ictx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    if duration <= 0.0 {
        let tb = stream.time_base();
        duration = stream.duration() as f64 * tb.numerator() as f64 / tb.denominator() as f64;
    }
    if duration <= 0.0 {
        return Err(MediaError::SourceUnreadable("duration unknown".into()));
    }

    tracing::debug!("probed {width}x{height} {duration:.2}s ← {}", path.display());
    Ok(SourceInfo { duration_secs: duration, width, height })
}
