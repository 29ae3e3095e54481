//! Redis Streams event log: each publish is an `XADD {channel} * event <payload>`.

use async_trait::async_trait;

use crate::{EventError, EventPublisher, Result};

/// Field name holding the serialized event inside each stream entry.
const PAYLOAD_FIELD: &str = "event";

#[derive(Clone)]
pub struct RedisStreamLog {
    conn: redis::aio::ConnectionManager,
    max_len: Option<usize>,
}

impl RedisStreamLog {
    pub async fn connect(url: &str) -> Result<Self> {
        let client =
            redis::Client::open(url).map_err(|err| EventError::Unavailable(err.to_string()))?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|err| EventError::Unavailable(err.to_string()))?;
        Ok(Self {
            conn,
            max_len: None,
        })
    }

    /// Cap each stream at roughly `max_len` entries (`MAXLEN ~`).
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

#[async_trait]
impl EventPublisher for RedisStreamLog {
    async fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        let mut conn = self.conn.clone();

        let mut cmd = redis::cmd("XADD");
        cmd.arg(channel);
        if let Some(max_len) = self.max_len {
            cmd.arg("MAXLEN").arg("~").arg(max_len);
        }
        cmd.arg("*").arg(PAYLOAD_FIELD).arg(payload);

        let id: String = cmd
            .query_async(&mut conn)
            .await
            .map_err(|err| EventError::PublishFailed {
                channel: channel.to_string(),
                message: err.to_string(),
            })?;

        tracing::trace!(channel, entry_id = %id, "event appended to stream");
        Ok(())
    }
}
