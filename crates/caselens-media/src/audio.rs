// crates/caselens-media/src/audio.rs
//
// Audio clip extraction for the evidence package: decode the source's audio
// track, resample to 16 kHz, truncate at 60 seconds, and pack a canonical
// 44-byte-header PCM WAV the collaborator can decode without guessing.
//
// Mono sources stay mono; anything with two or more channels is folded to
// stereo. Everything goes through the statically linked ffmpeg-the-third,
// same as decode.rs — no child process, no PATH dependency.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::format::sample::{Sample, Type as SampleType};
use ffmpeg::media::Type as MediaType;
use ffmpeg::software::resampling;
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::frame::audio::Audio as AudioFrame;

use caselens_core::media_types::AudioClip;

use crate::error::MediaError;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Output sample rate. Low enough to keep the payload small, high enough to
/// keep speech intelligible for the collaborator.
pub const OUT_RATE: u32 = 16_000;

/// Hard cap on clip length; longer sources are truncated, not rejected.
pub const MAX_CLIP_SECS: u32 = 60;

/// Intermediate format: packed (interleaved) f32 le. Converted to clamped
/// i16 at WAV encode time.
const OUT_FMT: Sample = Sample::F32(SampleType::Packed);

// ── Public API ────────────────────────────────────────────────────────────────

/// Decode, resample, truncate, and WAV-encode the audio track of `path`.
///
/// Every failure surfaces as `AudioUnavailable`; the caller absorbs it and
/// builds the evidence package without audio.
pub fn extract_clip(path: &Path) -> Result<AudioClip, MediaError> {
    let (pcm, channels) = decode_to_pcm(path).map_err(MediaError::no_audio)?;
    let wav = encode_wav(&pcm, channels, OUT_RATE);
    tracing::debug!(
        "audio clip ready: {channels} ch, {} frames, {} WAV bytes ← {}",
        pcm.len() / channels as usize,
        wav.len(),
        path.display(),
    );
    Ok(AudioClip {
        sample_rate:   OUT_RATE,
        channel_count: channels,
        wav_base64:    B64.encode(&wav),
    })
}

/// Encode interleaved f32 PCM as a complete WAV file in memory.
///
/// Canonical 44-byte header:
///   RIFF  <36 + data_size>  WAVE
///   fmt   16  <format=1 PCM>  <channels>  <rate>
///         <byte_rate = rate·channels·2>  <block_align = channels·2>  <bits=16>
///   data  <data_size>  <samples…>
///
/// Samples are clamped to [-1, 1] and widened to little-endian i16.
pub fn encode_wav(samples: &[f32], channels: u16, sample_rate: u32) -> Vec<u8> {
    const BITS:       u16 = 16;
    const FORMAT_PCM: u16 = 1;

    let block_align = channels * (BITS / 8);
    let byte_rate   = sample_rate * block_align as u32;
    let data_size   = (samples.len() * 2) as u32;

    let mut out = Vec::with_capacity(44 + samples.len() * 2);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36u32 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt  chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for s in samples {
        let v = (s.clamp(-1.0, 1.0) * 32767.0).round() as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

// ── Internal implementation ───────────────────────────────────────────────────

/// Interleaved f32 accumulator. The output channel policy (mono in → mono
/// out, everything else → stereo) is fixed by the first frame seen, and the
/// resampler is built lazily once the real source format/layout/rate are
/// known.
struct PcmSink {
    resampler: Option<resampling::Context>,
    stereo:    bool,
    pcm:       Vec<f32>,
}

impl PcmSink {
    fn new() -> Self {
        Self { resampler: None, stereo: false, pcm: Vec::new() }
    }

    fn channels(&self) -> u16 {
        if self.stereo { 2 } else { 1 }
    }

    /// Interleaved sample count equal to `MAX_CLIP_SECS` of output audio.
    fn cap(&self) -> usize {
        (MAX_CLIP_SECS * OUT_RATE) as usize * self.channels() as usize
    }

    fn full(&self) -> bool {
        !self.pcm.is_empty() && self.pcm.len() >= self.cap()
    }

    /// Resample `frame` into the output shape and append it.
    fn push(&mut self, frame: &AudioFrame) {
        let src_channels = frame.ch_layout().channels();
        if self.resampler.is_none() && self.pcm.is_empty() {
            self.stereo = src_channels >= 2;
        }
        let want_channels = if self.stereo { 2 } else { 1 };

        let needs_resample = frame.format() != OUT_FMT
            || frame.rate()                != OUT_RATE
            || src_channels                != want_channels;

        if needs_resample {
            let out_layout = if self.stereo { ChannelLayout::STEREO } else { ChannelLayout::MONO };
            // Mono sources must be declared as MONO so swr doesn't
            // misinterpret the channel count.
            let rs = self.resampler.get_or_insert_with(|| {
                let src_layout = if src_channels >= 2 {
                    frame.ch_layout()
                } else {
                    ChannelLayout::MONO
                };
                resampling::Context::get2(
                    frame.format(), src_layout, frame.rate(),
                    OUT_FMT,        out_layout, OUT_RATE,
                ).expect("create audio resampler for clip extraction")
            });

            let mut resampled = AudioFrame::empty();
            if rs.run(frame, &mut resampled).is_ok() && resampled.samples() > 0 {
                append_packed_f32(&resampled, &mut self.pcm);
            }
        } else {
            // Source is already the right shape — copy directly.
            append_packed_f32(frame, &mut self.pcm);
        }
    }

    /// Consume the sink, truncated to the clip cap on a frame boundary.
    fn finish(mut self) -> (Vec<f32>, u16) {
        let cap = self.cap();
        if self.pcm.len() > cap {
            self.pcm.truncate(cap);
        }
        let channels = self.channels();
        (self.pcm, channels)
    }
}

/// Decode all audio from `src` (up to the clip cap) into interleaved f32 at
/// `OUT_RATE`. Returns the samples and the output channel count.
fn decode_to_pcm(src: &Path) -> Result<(Vec<f32>, u16), String> {
    let mut ictx = input(src).map_err(|e| format!("open: {e}"))?;

    let audio_stream_idx = ictx
        .streams()
        .best(MediaType::Audio)
        .ok_or_else(|| "no audio stream".to_string())?
        .index();

    let stream = ictx.stream(audio_stream_idx).unwrap();
    let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .map_err(|e| format!("codec context: {e}"))?;
    let mut decoder = dec_ctx.decoder().audio()
        .map_err(|e| format!("audio decoder: {e}"))?;

    let mut sink = PcmSink::new();

    for result in ictx.packets() {
        if sink.full() { break; }
        let (stream, packet) = match result {
            Ok(p)  => p,
            Err(_) => continue,
        };
        if stream.index() != audio_stream_idx { continue; }
        if decoder.send_packet(&packet).is_err() { continue; }

        let mut frame = AudioFrame::empty();
        while decoder.receive_frame(&mut frame).is_ok() {
            sink.push(&frame);
        }
    }

    // Flush the decoder unless the cap already cut the run short.
    if !sink.full() {
        let _ = decoder.send_eof();
        let mut frame = AudioFrame::empty();
        while decoder.receive_frame(&mut frame).is_ok() {
            sink.push(&frame);
        }
    }

    if sink.pcm.is_empty() {
        return Err("no audio samples decoded".into());
    }
    Ok(sink.finish())
}

/// Copy the packed f32 samples from `frame` into `out`.
/// OUT_FMT is Packed (interleaved), so all channel data is in plane 0.
fn append_packed_f32(frame: &AudioFrame, out: &mut Vec<f32>) {
    let data = frame.data(0);
    out.extend(
        data.chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(wav: &[u8], off: usize) -> u16 {
        u16::from_le_bytes([wav[off], wav[off + 1]])
    }

    fn u32_at(wav: &[u8], off: usize) -> u32 {
        u32::from_le_bytes([wav[off], wav[off + 1], wav[off + 2], wav[off + 3]])
    }

    #[test]
    fn wav_header_is_canonical_44_bytes() {
        let samples = vec![0.0f32; 320]; // 10 ms of 16 kHz stereo
        let wav = encode_wav(&samples, 2, OUT_RATE);

        assert_eq!(wav.len(), 44 + 320 * 2);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + 640);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1); // PCM
        assert_eq!(u16_at(&wav, 22), 2); // channels
        assert_eq!(u32_at(&wav, 24), 16_000);
        assert_eq!(u32_at(&wav, 28), 16_000 * 2 * 2); // byte rate
        assert_eq!(u16_at(&wav, 32), 4); // block align
        assert_eq!(u16_at(&wav, 34), 16); // bits
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 640);
    }

    #[test]
    fn mono_header_fields_follow_the_channel_count() {
        let wav = encode_wav(&[0.25, -0.25], 1, OUT_RATE);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 28), 16_000 * 2); // byte rate
        assert_eq!(u16_at(&wav, 32), 2); // block align
        assert_eq!(u32_at(&wav, 40), 4);
    }

    #[test]
    fn out_of_range_samples_are_clamped_not_wrapped() {
        let wav = encode_wav(&[1.5, -1.5, 1.0, -1.0, 0.0], 1, OUT_RATE);
        let s = |i: usize| i16::from_le_bytes([wav[44 + i * 2], wav[44 + i * 2 + 1]]);
        assert_eq!(s(0), 32767);
        assert_eq!(s(1), -32767);
        assert_eq!(s(2), 32767);
        assert_eq!(s(3), -32767);
        assert_eq!(s(4), 0);
    }

    #[test]
    fn sink_truncates_at_the_sixty_second_cap() {
        let mut sink = PcmSink::new();
        let cap = sink.cap();
        assert_eq!(cap, 60 * 16_000);

        sink.pcm = vec![0.0; cap + 12_345];
        assert!(sink.full());
        let (pcm, channels) = sink.finish();
        assert_eq!(channels, 1);
        assert_eq!(pcm.len(), cap);
    }
}
