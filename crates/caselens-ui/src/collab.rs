// crates/caselens-ui/src/collab.rs
//
// Background HTTP client for the collaborator service. Requests run on
// spawned threads so the UI never blocks on the network; outcomes come back
// over a bounded channel drained once per frame, next to the media results.
// Every result carries the key it was issued under so a stale arrival (the
// source was re-ingested, the region was cleared) can be dropped.

use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use ureq::Agent;
use uuid::Uuid;

use caselens_core::contracts::{EvidencePackage, RegionAnswer, RegionQuery};

use crate::config::CollabConfig;

#[derive(Debug)]
pub enum CollabResult {
    Report       { source_id: Uuid, generation: u64, text: String },
    ReportFailed { source_id: Uuid, generation: u64, error: String },
    Answer       { region_id: Uuid, answer: RegionAnswer },
    AnswerFailed { region_id: Uuid, error: String },
}

pub struct CollabClient {
    agent:    Agent,
    base_url: Option<String>,
    tx:       Sender<CollabResult>,
    pub rx:   Receiver<CollabResult>,
}

impl CollabClient {
    pub fn new(config: CollabConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        let (tx, rx) = bounded(64);
        Self {
            agent,
            base_url: config.base_url,
            tx,
            rx,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// POSTs an evidence package; the report text comes back tagged with the
    /// ingest generation the bundle was produced under.
    pub fn submit_evidence(&self, source_id: Uuid, generation: u64, package: EvidencePackage) {
        let Some(url) = self.endpoint("evidence") else {
            self.send(CollabResult::ReportFailed {
                source_id,
                generation,
                error: "CASELENS_COLLAB_URL is not set".into(),
            });
            return;
        };
        let agent = self.agent.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = agent
                .post(&url)
                .send_json(&package)
                .map_err(|e| e.to_string())
                .and_then(|mut r| r.body_mut().read_to_string().map_err(|e| e.to_string()));
            let result = match outcome {
                Ok(text) => CollabResult::Report { source_id, generation, text },
                Err(error) => {
                    tracing::warn!("evidence submission failed: {error}");
                    CollabResult::ReportFailed { source_id, generation, error }
                }
            };
            let _ = tx.send(result);
        });
    }

    /// POSTs a region query; the structured answer comes back keyed by the
    /// region id.
    pub fn submit_region_query(&self, region_id: Uuid, query: RegionQuery) {
        let Some(url) = self.endpoint("region-query") else {
            self.send(CollabResult::AnswerFailed {
                region_id,
                error: "CASELENS_COLLAB_URL is not set".into(),
            });
            return;
        };
        let agent = self.agent.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = agent
                .post(&url)
                .send_json(&query)
                .map_err(|e| e.to_string())
                .and_then(|mut r| {
                    r.body_mut()
                        .read_json::<RegionAnswer>()
                        .map_err(|e| e.to_string())
                });
            let result = match outcome {
                Ok(answer) => CollabResult::Answer { region_id, answer },
                Err(error) => {
                    tracing::warn!("region query failed: {error}");
                    CollabResult::AnswerFailed { region_id, error }
                }
            };
            let _ = tx.send(result);
        });
    }

    fn endpoint(&self, path: &str) -> Option<String> {
        self.base_url.as_ref().map(|base| format!("{base}/{path}"))
    }

    fn send(&self, result: CollabResult) {
        let _ = self.tx.send(result);
    }
}
