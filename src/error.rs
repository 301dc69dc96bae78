//! Error types for the trade recorder

use thiserror::Error;

/// Trade recorder errors
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("WebSocket connection error: {0}")]
    Connect(String),

    #[error("Connection timeout after {0} ms")]
    ConnectTimeout(u64),

    #[error("Stream closed: {0}")]
    StreamClosed(String),

    #[error("Market catalog error: {0}")]
    Fetch(String),

    #[error("Failed to parse message: {0}")]
    Parse(String),

    #[error("Trade log error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RecorderError {
    /// Whether the session's identity could not be established.
    ///
    /// The supervisor decides what to do with these; everything else only
    /// ends the session that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecorderError::Connect(_) | RecorderError::ConnectTimeout(_)
        )
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for RecorderError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        RecorderError::Connect(err.to_string())
    }
}

impl From<serde_json::Error> for RecorderError {
    fn from(err: serde_json::Error) -> Self {
        RecorderError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for RecorderError {
    fn from(err: reqwest::Error) -> Self {
        RecorderError::Fetch(err.to_string())
    }
}

impl From<std::io::Error> for RecorderError {
    fn from(err: std::io::Error) -> Self {
        RecorderError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecorderError>;
