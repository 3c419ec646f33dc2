use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink is misconfigured: {0}")]
    Misconfigured(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Receiver responded with HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Command exited unsuccessfully: {0}")]
    CommandFailed(String),

    #[error("Command did not finish within {0:?}")]
    CommandTimedOut(Duration),

    #[error("Sink rejected the notification: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SinkError>;
