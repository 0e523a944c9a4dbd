// crates/caselens-media/src/still.rs
//
// Still-frame export: decode the frame under the playhead at native
// resolution, bake in the active contrast gain, and write a PNG wherever
// the analyst pointed the save dialog.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Result;
use ffmpeg_the_third::format::Pixel;

use caselens_core::filter;

use crate::decode::FrameDecoder;

/// Decode the native frame at `timestamp` and write it to `dest` as an
/// 8-bit RGB PNG. Returns the destination path for the status line.
pub fn save_still(src: &Path, timestamp: f64, contrast: f32, dest: &Path) -> Result<PathBuf> {
    let mut decoder = FrameDecoder::open(src)?;
    let (native_w, native_h) = decoder.native_dims();

    let mut frame = decoder.frame_at(timestamp, native_w, native_h, Pixel::RGB24)?;
    filter::apply_contrast_rgb(&mut frame.data, contrast);

    write_png(dest, frame.width, frame.height, &frame.data)?;
    tracing::info!("still saved → {}", dest.display());
    Ok(dest.to_path_buf())
}

/// Write a packed RGB buffer as an 8-bit PNG.
fn write_png(dest: &Path, width: u32, height: u32, rgb: &[u8]) -> Result<()> {
    let file = std::fs::File::create(dest)?;
    let w = &mut BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgb)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_png_round_trips_through_a_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("still.png");

        // 2x2 frame: red, green, blue, white.
        let rgb = vec![
            255, 0, 0,    0, 255, 0,
            0, 0, 255,    255, 255, 255,
        ];
        write_png(&dest, 2, 2, &rgb).unwrap();

        let decoder = png::Decoder::new(std::fs::File::open(&dest).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();

        assert_eq!((info.width, info.height), (2, 2));
        assert_eq!(info.color_type, png::ColorType::Rgb);
        assert_eq!(&buf[..info.buffer_size()], rgb.as_slice());
    }
}
