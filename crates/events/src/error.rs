use thiserror::Error;

/// Errors raised while building or publishing an event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("event log unavailable: {0}")]
    Unavailable(String),
    #[error("publish to '{channel}' failed: {message}")]
    PublishFailed { channel: String, message: String },
}

pub type Result<T> = std::result::Result<T, EventError>;
