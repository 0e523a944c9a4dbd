// crates/caselens-media/src/decode.rs
//
// FrameDecoder: one open demux/decode pipeline per source, seeked
// sequentially. Every consumer — viewer scrub, evidence sampling, region
// capture, still export — asks it for one frame at a time, so a source is
// never decoded by two pipelines at once.

use std::path::{Path, PathBuf};

use anyhow::Result;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};

use crate::helpers::seek::seek_to_secs;

/// Width of viewer scrub frames. Tall sources get the proportional height,
/// forced even for the scaler.
pub const PREVIEW_W: u32 = 960;

/// A tightly packed frame (stride already stripped).
pub struct DecodedFrame {
    pub width:  u32,
    pub height: u32,
    pub data:   Vec<u8>,
}

pub struct FrameDecoder {
    pub path:  PathBuf,
    ictx:      ffmpeg::format::context::Input,
    decoder:   ffmpeg::decoder::video::Video,
    video_idx: usize,
    tb_num:    i32,
    tb_den:    i32,
    native_w:  u32,
    native_h:  u32,
}

impl FrameDecoder {
    pub fn open(path: &Path) -> Result<Self> {
        let ictx = input(path)?;
        let video_idx = ictx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| anyhow::anyhow!("no video stream"))?
            .index();

        let (tb_num, tb_den, native_w, native_h) = {
            let stream = ictx
                .stream(video_idx)
                .ok_or_else(|| anyhow::anyhow!("stream vanished"))?;
            let tb = stream.time_base();
            let (w, h) = unsafe {
                let p = stream.parameters().as_ptr();
                ((*p).width as u32, (*p).height as u32)
            };
            (tb.numerator(), tb.denominator(), w, h)
        };

        // Second context for decoder params (Parameters borrows from ictx).
        let ictx2 = input(path)?;
        let stream2 = ictx2
            .stream(video_idx)
            .ok_or_else(|| anyhow::anyhow!("stream vanished"))?;
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())?;
        let decoder = dec_ctx.decoder().video()?;

        Ok(Self {
            path: path.to_path_buf(),
            ictx,
            decoder,
            video_idx,
            tb_num,
            tb_den,
            native_w,
            native_h,
        })
    }

    pub fn native_dims(&self) -> (u32, u32) {
        (self.native_w, self.native_h)
    }

    /// Scrub output dimensions: PREVIEW_W wide, proportional even height.
    pub fn preview_dims(&self) -> (u32, u32) {
        let w = PREVIEW_W.min(self.native_w.max(2));
        let h = ((w as u64 * self.native_h.max(1) as u64 / self.native_w.max(1) as u64) as u32)
            .max(2)
            & !1;
        (w, h)
    }

    /// Half the native resolution in each dimension, forced even.
    pub fn half_dims(&self) -> (u32, u32) {
        (
            (self.native_w / 2).max(2) & !1,
            (self.native_h / 2).max(2) & !1,
        )
    }

    fn ts_to_pts(&self, t: f64) -> i64 {
        (t * self.tb_den as f64 / self.tb_num as f64) as i64
    }

    /// Seek to `timestamp` and decode the frame there, scaled to
    /// `out_w` × `out_h` in `out_fmt` (Pixel::RGBA or Pixel::RGB24).
    ///
    /// The seek is backward-inclusive, so it lands on the keyframe at or
    /// before the target; frames between the keyframe and the target are
    /// decoded and discarded by the PTS filter. At EOF the last decoded
    /// frame is returned instead, so asking for the final instant of a
    /// source still yields a frame.
    pub fn frame_at(
        &mut self,
        timestamp: f64,
        out_w: u32,
        out_h: u32,
        out_fmt: Pixel,
    ) -> Result<DecodedFrame> {
        seek_to_secs(&mut self.ictx, timestamp, "frame_at");
        // The pipeline is reused across seeks; drop any buffered frames from
        // the previous position.
        self.decoder.flush();

        let target_pts = self.ts_to_pts(timestamp);
        let mut scaler = SwsContext::get(
            self.decoder.format(),
            self.decoder.width(),
            self.decoder.height(),
            out_fmt,
            out_w,
            out_h,
            Flags::BILINEAR,
        )?;

        let bpp: usize = match out_fmt {
            Pixel::RGBA => 4,
            _           => 3,
        };

        // last_good holds the most recent scaled frame in case EOF arrives
        // before the target (e.g. requesting the final frame).
        let mut last_good: Option<ffmpeg::util::frame::video::Video> = None;

        for result in self.ictx.packets() {
            let (stream, packet) = match result {
                Ok(p)  => p,
                Err(_) => continue,
            };
            if stream.index() != self.video_idx {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            let mut decoded = ffmpeg::util::frame::video::Video::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let mut out = ffmpeg::util::frame::video::Video::empty();
                scaler.run(&decoded, &mut out)?;
                last_good = Some(out.clone());
                // Skip pre-roll frames from the keyframe-aligned seek.
                if let Some(pts) = decoded.pts() {
                    if pts + 2 < target_pts {
                        continue;
                    }
                }
                return Ok(pack_frame(&out, out_w, out_h, bpp));
            }
        }

        if let Some(out) = last_good {
            return Ok(pack_frame(&out, out_w, out_h, bpp));
        }
        Err(anyhow::anyhow!("no frame decoded at t={timestamp:.3}"))
    }
}

/// Strip the scaler's stride padding into a tightly packed buffer.
fn pack_frame(
    out: &ffmpeg::util::frame::video::Video,
    out_w: u32,
    out_h: u32,
    bpp: usize,
) -> DecodedFrame {
    let stride = out.stride(0);
    let raw = out.data(0);
    let row_bytes = out_w as usize * bpp;
    let data: Vec<u8> = (0..out_h as usize)
        .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
        .copied()
        .collect();
    DecodedFrame { width: out_w, height: out_h, data }
}
