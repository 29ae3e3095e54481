//! Domain events and the append-only logs they are published to.
//!
//! Publishing is fire-and-forget from the caller's point of view: callers get
//! a `Result` back but are expected to log failures rather than act on them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

mod error;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_stream;

pub use error::{EventError, Result};
pub use memory::MemoryEventLog;
#[cfg(feature = "redis")]
pub use redis_stream::RedisStreamLog;

/// Immutable record of a completed change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_type: String,
    pub payload: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl DomainEvent {
    /// Builds an event stamped with the current UTC time.
    pub fn new(event_type: impl Into<String>, payload: &impl Serialize) -> Result<Self> {
        Ok(Self {
            event_type: event_type.into(),
            payload: serde_json::to_value(payload)?,
            timestamp: OffsetDateTime::now_utc(),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Append-only log accepting serialized events on named channels.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<()>;
}
