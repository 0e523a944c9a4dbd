// crates/caselens-core/src/contracts.rs
//
// Wire contracts for the two remote collaborators.
//
// Evidence submission: sampled stills plus the optional audio clip, JSON with
// base64 payloads so the transport stays text-only. The reply is opaque report
// text. Region query: one cropped region plus a free-text question; the reply
// is structured (answer / confidence / details).
//
// Field names are camelCase on the wire; the structs stay snake_case.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::media_types::EvidenceBundle;
use crate::overlay::RegionOfInterest;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceFrame {
    pub timestamp_seconds: f64,
    pub image_base64:      String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceAudio {
    pub sample_rate:   u32,
    pub channel_count: u16,
    pub wav_base64:    String,
}

/// The full per-source submission. `audio` is null when extraction failed or
/// the source has no audio stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidencePackage {
    pub source_name:      String,
    pub duration_seconds: f64,
    pub frames:           Vec<EvidenceFrame>,
    pub audio:            Option<EvidenceAudio>,
}

impl EvidencePackage {
    pub fn from_bundle(source_name: &str, duration_seconds: f64, bundle: &EvidenceBundle) -> Self {
        Self {
            source_name: source_name.to_owned(),
            duration_seconds,
            frames: bundle
                .frames
                .iter()
                .map(|f| EvidenceFrame {
                    timestamp_seconds: f.timestamp_secs,
                    image_base64:      B64.encode(&f.jpeg),
                })
                .collect(),
            audio: bundle.audio.as_ref().map(|a| EvidenceAudio {
                sample_rate:   a.sample_rate,
                channel_count: a.channel_count,
                wav_base64:    a.wav_base64.clone(),
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionQuery {
    pub image_base64:      String,
    pub timestamp_seconds: f64,
    pub query:             String,
}

impl RegionQuery {
    pub fn for_region(region: &RegionOfInterest, query: &str) -> Self {
        Self {
            image_base64:      B64.encode(&region.jpeg),
            timestamp_seconds: region.taken_at,
            query:             query.to_owned(),
        }
    }
}

/// Structured reply to a region query. `details` is free-form JSON the
/// collaborator may use for bounding boxes, alternatives, and the like.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionAnswer {
    pub answer:     String,
    pub confidence: f32,
    #[serde(default)]
    pub details:    serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_types::FrameSample;

    #[test]
    fn evidence_package_serializes_camel_case() {
        let bundle = EvidenceBundle {
            frames: vec![FrameSample { timestamp_secs: 1.5, jpeg: vec![0xFF, 0xD8] }],
            audio:  None,
        };
        let pkg = EvidencePackage::from_bundle("cam-03.mp4", 12.0, &bundle);
        let v = serde_json::to_value(&pkg).unwrap();
        assert_eq!(v["sourceName"], "cam-03.mp4");
        assert_eq!(v["durationSeconds"], 12.0);
        assert_eq!(v["frames"][0]["timestampSeconds"], 1.5);
        assert_eq!(v["frames"][0]["imageBase64"], "/9g=");
        assert!(v["audio"].is_null());
    }

    #[test]
    fn region_answer_parses_with_and_without_details() {
        let full: RegionAnswer = serde_json::from_str(
            r#"{"answer":"a silver sedan","confidence":0.82,"details":{"plate":"unreadable"}}"#,
        )
        .unwrap();
        assert_eq!(full.answer, "a silver sedan");
        assert!((full.confidence - 0.82).abs() < 1e-6);
        assert_eq!(full.details["plate"], "unreadable");

        let bare: RegionAnswer =
            serde_json::from_str(r#"{"answer":"unclear","confidence":0.1}"#).unwrap();
        assert!(bare.details.is_null());
    }
}
