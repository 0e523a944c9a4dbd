// crates/caselens-ui/src/config.rs
//
// Collaborator endpoint configuration, read once at startup from the
// environment (a local `.env` file is honored via dotenvy in main).
//
//   CASELENS_COLLAB_URL        — base URL of the collaborator service.
//                                Unset means submissions fail immediately
//                                with a status message, no network attempt.
//   CASELENS_HTTP_TIMEOUT_SECS — per-request timeout, default 120.

use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct CollabConfig {
    pub base_url: Option<String>,
    pub timeout:  Duration,
}

impl CollabConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("CASELENS_COLLAB_URL")
            .ok()
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        let timeout_secs: u64 = std::env::var("CASELENS_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}
