// crates/caselens-media/src/error.rs
//
// Failure vocabulary for media operations, split by how the app reacts:
// SourceUnreadable fails the operation it belongs to and is shown to the
// analyst; AudioUnavailable is absorbed (the audio slot just stays empty);
// Cancelled only happens on shutdown, when nobody is left to care.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("source unreadable: {0}")]
    SourceUnreadable(String),

    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),

    #[error("cancelled")]
    Cancelled,
}

impl MediaError {
    pub fn unreadable(err: impl std::fmt::Display) -> Self {
        MediaError::SourceUnreadable(err.to_string())
    }

    pub fn no_audio(err: impl std::fmt::Display) -> Self {
        MediaError::AudioUnavailable(err.to_string())
    }
}
