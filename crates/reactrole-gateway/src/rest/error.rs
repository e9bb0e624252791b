//! REST error types

use reactrole_core::DomainError;
use thiserror::Error;

/// Errors talking to the platform's REST API
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Non-2xx response
    #[error("{method} {path} returned {status}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// Still rate limited after retrying
    #[error("rate limited on {path}, retry after {retry_after_ms}ms")]
    RateLimited { path: String, retry_after_ms: u64 },

    /// Connection, TLS, or timeout failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not what the endpoint documents
    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// HTTP status, when the platform answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        DomainError::PlatformError(err.to_string())
    }
}
