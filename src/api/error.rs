//! Booking API errors

use thiserror::Error;

/// Errors produced while talking to the booking backend.
///
/// The `Display` text is what the wizard classifies into a friendly
/// message, so variants keep the backend wording intact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport failure: DNS, connect, timeout, reset
    #[error("Network request failed: {0}")]
    Network(String),

    /// Callable function reported an error (`{"error": {...}}`)
    #[error("{message}")]
    Remote { status: String, message: String },

    /// Non-success status without a callable error body
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Body could not be decoded
    #[error("Invalid response from {function}: {message}")]
    InvalidResponse { function: String, message: String },
}

impl ApiError {
    /// Whether the request never reached the backend
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        Self::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
