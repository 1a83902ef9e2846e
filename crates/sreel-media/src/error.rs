//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while compiling a video.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Encoder not found: {0}")]
    EncoderNotFound(String),

    #[error("Encode failed: {message}")]
    EncodeFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("failed to download slide {slide_number}: {message}")]
    DownloadFailed { slide_number: u32, message: String },

    #[error("Invalid compile request: {0}")]
    InvalidRequest(String),

    #[error("Encode timed out after {0} seconds")]
    Timeout(u64),

    #[error("Storage error: {0}")]
    Storage(#[from] sreel_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an encode failure error.
    pub fn encode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::EncodeFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a download failure error for a named slide.
    pub fn download_failed(slide_number: u32, message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            slide_number,
            message: message.into(),
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}
