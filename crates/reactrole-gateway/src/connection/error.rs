//! Connection error types

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::protocol::CloseCode;

/// Errors that end a gateway session
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("Invalid payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server closed the connection
    #[error("Connection closed ({code:?}): {reason}")]
    Closed { code: Option<u16>, reason: String },

    /// No Heartbeat ACK arrived before the next beat was due
    #[error("Heartbeat not acknowledged")]
    HeartbeatTimeout,

    /// The server did not follow the handshake
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The event receiver went away
    #[error("Event channel closed")]
    ChannelClosed,
}

impl ConnectionError {
    /// Gateway close code, when the server sent one
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Self::Closed { code: Some(code), .. } => CloseCode::from_u16(*code),
            _ => None,
        }
    }

    /// Check if reconnecting can help
    pub fn should_reconnect(&self) -> bool {
        match self {
            Self::ChannelClosed => false,
            _ => self.close_code().map_or(true, CloseCode::should_reconnect),
        }
    }

    /// Check if the session survives this error
    pub fn allows_resume(&self) -> bool {
        self.close_code().map_or(true, CloseCode::allows_resume)
    }
}
