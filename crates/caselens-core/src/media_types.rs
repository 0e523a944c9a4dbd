// crates/caselens-core/src/media_types.rs
//
// Types that flow across the channel between caselens-media and caselens-ui.
// No egui, no ffmpeg — just plain data.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::overlay::RegionOfInterest;

/// What probing a source yields: container duration plus intrinsic dimensions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SourceInfo {
    pub duration_secs: f64,
    pub width:         u32,
    pub height:        u32,
}

/// One evidence still: the timestamp that was requested and the half-resolution
/// JPEG decoded near it. The requested time is recorded even when the decoder
/// lands on a nearby frame.
#[derive(Clone, Serialize, Deserialize)]
pub struct FrameSample {
    pub timestamp_secs: f64,
    pub jpeg:           Vec<u8>,
}

/// The per-source audio clip, already WAV-encoded and base64'd for transport.
/// Capped at 60 seconds of 16 kHz PCM.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AudioClip {
    pub sample_rate:   u32,
    pub channel_count: u16,
    pub wav_base64:    String,
}

/// Everything one ingest run produced for a source. Re-running ingest replaces
/// the bundle wholesale.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub frames: Vec<FrameSample>,
    pub audio:  Option<AudioClip>,
}

/// Results sent from the MediaWorker background threads to the UI.
///
/// Ingest variants carry the generation they were started under; the UI drops
/// any result whose generation no longer matches the session.
pub enum MediaResult {
    SourceProbed   { id: Uuid, info: SourceInfo },
    SourceFailed   { id: Uuid, error: String },
    ViewFrame      { id: Uuid, timestamp: f64, width: u32, height: u32, data: Vec<u8> },
    IngestProgress { id: Uuid, generation: u64, done: usize, total: usize },
    IngestDone     { id: Uuid, generation: u64, bundle: EvidenceBundle },
    IngestFailed   { id: Uuid, generation: u64, error: String },
    RegionReady    { region: Box<RegionOfInterest> },
    RegionFailed   { region_id: Uuid, error: String },
    StillSaved     { path: PathBuf },
    StillFailed    { error: String },
}
