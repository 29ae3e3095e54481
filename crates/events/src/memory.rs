//! In-process event log.
//!
//! Keeps the most recent payloads per channel in a bounded ring and fans new
//! ones out to broadcast subscribers. Used for local runs and as a test double.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use crate::{DomainEvent, EventPublisher, Result};

const CHANNEL_CAPACITY: usize = 100;

/// Entries retained per channel unless configured otherwise.
pub const DEFAULT_MAX_LEN: usize = 10_000;

#[derive(Debug, Default)]
struct Channel {
    entries: VecDeque<Vec<u8>>,
    sender: Option<broadcast::Sender<Vec<u8>>>,
}

#[derive(Debug, Clone)]
pub struct MemoryEventLog {
    channels: Arc<RwLock<HashMap<String, Channel>>>,
    max_len: usize,
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self {
            channels: Arc::default(),
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_len` entries per channel (minimum 1), dropping the
    /// oldest first.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(1);
        self
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Retained payloads published to `channel`, oldest first.
    pub async fn entries(&self, channel: &str) -> Vec<Vec<u8>> {
        self.channels
            .read()
            .await
            .get(channel)
            .map(|c| c.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Decoded events on `channel`; payloads that are not events are skipped.
    pub async fn events(&self, channel: &str) -> Vec<DomainEvent> {
        self.entries(channel)
            .await
            .iter()
            .filter_map(|bytes| DomainEvent::from_bytes(bytes).ok())
            .collect()
    }

    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<Vec<u8>> {
        let mut channels = self.channels.write().await;
        let entry = channels.entry(channel.to_string()).or_default();
        entry
            .sender
            .get_or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }
}

#[async_trait]
impl EventPublisher for MemoryEventLog {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        let mut channels = self.channels.write().await;
        let entry = channels.entry(channel.to_string()).or_default();

        while entry.entries.len() >= self.max_len {
            entry.entries.pop_front();
        }
        entry.entries.push_back(payload.to_vec());
        if let Some(sender) = &entry.sender {
            if sender.send(payload.to_vec()).is_err() {
                tracing::trace!(channel, "no live subscribers");
            }
        }

        tracing::trace!(channel, bytes = payload.len(), "event appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_appends_in_order() {
        let log = MemoryEventLog::new();

        log.publish("books", b"one").await.unwrap();
        log.publish("books", b"two").await.unwrap();
        log.publish("other", b"three").await.unwrap();

        assert_eq!(log.entries("books").await, vec![b"one".to_vec(), b"two".to_vec()]);
        assert_eq!(log.entries("other").await.len(), 1);
        assert!(log.entries("missing").await.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_receive_new_entries() {
        let log = MemoryEventLog::new();
        let mut receiver = log.subscribe("books").await;

        let event = DomainEvent::new("book_created", &json!({"id": 1})).unwrap();
        log.publish("books", &event.to_bytes().unwrap()).await.unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(DomainEvent::from_bytes(&received).unwrap(), event);
        assert_eq!(log.events("books").await, vec![event]);
    }

    #[tokio::test]
    async fn test_publish_after_subscribers_leave_still_appends() {
        let log = MemoryEventLog::new();
        drop(log.subscribe("books").await);

        log.publish("books", b"one").await.unwrap();

        assert_eq!(log.entries("books").await, vec![b"one".to_vec()]);
    }

    #[tokio::test]
    async fn test_oldest_entries_are_dropped_past_max_len() {
        let log = MemoryEventLog::new().with_max_len(3);

        for n in 0..10u8 {
            log.publish("books", &[n]).await.unwrap();
        }
        log.publish("other", b"kept").await.unwrap();

        assert_eq!(log.entries("books").await, vec![vec![7], vec![8], vec![9]]);
        assert_eq!(log.entries("other").await, vec![b"kept".to_vec()]);
    }

    #[tokio::test]
    async fn test_zero_max_len_keeps_latest_entry() {
        let log = MemoryEventLog::new().with_max_len(0);

        log.publish("books", b"one").await.unwrap();
        log.publish("books", b"two").await.unwrap();

        assert_eq!(log.max_len(), 1);
        assert_eq!(log.entries("books").await, vec![b"two".to_vec()]);
    }
}
