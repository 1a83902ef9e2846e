//! Frame source error types.

use thiserror::Error;

/// Result type for frame source operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors that can occur while producing slide frames.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Layout renderer unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Render request failed: {0}")]
    RequestFailed(String),

    #[error("failed to download slide {slide_number}: {message}")]
    DownloadFailed { slide_number: u32, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FrameError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn download_failed(slide_number: u32, message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            slide_number,
            message: message.into(),
        }
    }
}
