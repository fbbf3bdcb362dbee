//! Error types surfaced by the analysis layer.
//!
//! Parse problems are not errors: they are reported through
//! [`crate::domain::ReportStatus`] on an otherwise successful result.

use thiserror::Error;

/// Failure of one `analyze` call
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No credential configured; raised before any request is built
    #[error("API key is missing. Set {env_var} (or GEMINI_API_KEY) in the environment.")]
    Configuration { env_var: &'static str },

    /// The image payload could not be decoded
    #[error("Image data is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),

    /// The remote model call failed
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Failure talking to the remote model service. Never retried.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Connection, TLS, timeout or body transfer failure
    #[error("Failed to reach the model service: {0}")]
    Transport(#[source] reqwest::Error),

    /// 401 or 403 from the service
    #[error("The model service rejected the API key ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-success status
    #[error("The model service returned an error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Success status but a body that is not the expected JSON envelope
    #[error("The model service returned an unreadable response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// Map a non-success HTTP status and body to an error
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ServiceError::Unauthorized { status, message },
            _ => ServiceError::Status { status, message },
        }
    }
}
