//! Error types for the concept and screenshot pipeline.

use std::time::Duration;

use crate::image::task::TaskStatus;

/// Errors that can occur while generating concepts or screenshots.
#[derive(Debug, thiserror::Error)]
pub enum ScreenforgeError {
    /// API token missing or set to the placeholder value.
    #[error("ModelScope API token not configured: {0}. Set MODELSCOPE_API_TOKEN or pass an explicit key")]
    Config(String),

    /// API returned a non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response content was malformed or missing required fields.
    #[error("invalid response content: {0}")]
    Validation(String),

    /// Remote image task ended in a terminal failure state.
    #[error("image task ended with status {0}")]
    JobFailed(TaskStatus),

    /// Polling budget exhausted before the task finished.
    #[error("image generation timed out after {attempts} polls ({waited:?})")]
    Timeout { attempts: u32, waited: Duration },

    /// Both the direct fetch and the relay fallback failed.
    #[error("could not retrieve generated image (direct: {direct}; relay: {relay})")]
    ImageFetch { direct: String, relay: String },

    /// A pipeline for the same resource is already in flight.
    #[error("already generating: {0}")]
    Busy(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (e.g., saving a screenshot).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScreenforgeError {
    /// Returns true if re-running the same operation might succeed.
    ///
    /// Nothing in the pipeline retries automatically; this only informs the
    /// caller whether a manual retry is worth offering.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout { .. } | Self::JobFailed(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScreenforgeError>;
