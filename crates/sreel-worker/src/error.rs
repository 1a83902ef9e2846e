//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Frame source error: {0}")]
    Frames(#[from] sreel_frames::FrameError),

    #[error("Media error: {0}")]
    Media(#[from] sreel_media::MediaError),

    #[error("Store error: {0}")]
    Store(#[from] sreel_store::StoreError),
}

impl WorkerError {
    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }
}
