//! Redis cache backend.
//!
//! Namespace members are tracked in a Redis Set (`{namespace}:_keys`) so
//! namespace invalidation never needs `SCAN` or `KEYS`. Each write pushes the
//! set's expiry out to the entry's TTL, so a set outlives its members but is
//! reclaimed once no member has been written for a full TTL.
//!
//! The multi-command sequences here are not atomic. A crash between commands
//! leaves at worst a stale member in a tracking set or an entry that lives
//! until its TTL; `DEL`/`SREM` on missing members are no-ops.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::{Cache, CacheError, CacheKey, Namespace, Result};

fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        CacheError::ConnectionFailed(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}

/// Redis cache backend using a connection manager for reconnects.
#[derive(Clone)]
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Connects to `url` (e.g. `redis://localhost:6379`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        conn.get(key.as_str()).await.map_err(map_redis_error)
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let seconds = ttl.as_secs().max(1);
        let tracking_key = key.namespace().tracking_key();

        conn.set_ex::<_, _, ()>(key.as_str(), value, seconds)
            .await
            .map_err(map_redis_error)?;
        conn.sadd::<_, _, ()>(&tracking_key, key.as_str())
            .await
            .map_err(map_redis_error)?;
        conn.expire::<_, ()>(&tracking_key, seconds as i64)
            .await
            .map_err(map_redis_error)?;

        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(key.as_str())
            .await
            .map_err(map_redis_error)?;
        conn.srem::<_, _, ()>(key.namespace().tracking_key(), key.as_str())
            .await
            .map_err(map_redis_error)?;

        Ok(())
    }

    async fn invalidate_namespace(&self, namespace: Namespace) -> Result<()> {
        let mut conn = self.conn.clone();
        let tracking_key = namespace.tracking_key();

        let members: Vec<String> = conn
            .smembers(&tracking_key)
            .await
            .map_err(map_redis_error)?;

        if !members.is_empty() {
            conn.del::<_, ()>(&members).await.map_err(map_redis_error)?;
        }
        conn.del::<_, ()>(&tracking_key)
            .await
            .map_err(map_redis_error)?;

        tracing::trace!(namespace = %namespace, removed = members.len(), "namespace invalidated");
        Ok(())
    }
}
