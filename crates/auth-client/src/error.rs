//! Error types for API calls.

use thiserror::Error;

/// Error type for API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure, no usable response
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request rejected as unauthorized after the refresh cycle ran (or
    /// could not run). The session has been invalidated.
    #[error("Unauthorized")]
    Unauthorized,

    /// Client-side request problem (4xx other than a pipeline 401)
    #[error("Request failed ({status}): {message}")]
    Validation { status: u16, message: String },

    /// Server-side failure (5xx)
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Token storage failure
    #[error(transparent)]
    Storage(#[from] token_store::StorageError),
}

impl ApiError {
    /// Human-readable message for display, falling back when the error
    /// carries no server-provided text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation { message, .. } | ApiError::Server { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
