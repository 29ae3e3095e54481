//! Namespaced key-value cache with per-key TTL.
//!
//! Values are opaque bytes. Keys are grouped into [`Namespace`]s so a whole
//! family (for example every cached list page) can be dropped at once.
//!
//! # Feature Flags
//!
//! - `redis`: Redis backend using a connection manager and tracking sets

use std::time::Duration;

use async_trait::async_trait;

mod error;
mod key;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_impl;

pub use error::{CacheError, Result};
pub use key::{CacheKey, Namespace};
pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;

/// Basic cache operations.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the stored bytes, or `None` when absent or expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

    /// Stores a value that expires after `ttl`.
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<()>;

    /// Removes a single key.
    async fn invalidate(&self, key: &CacheKey) -> Result<()>;

    /// Removes every key that was set under `namespace`.
    async fn invalidate_namespace(&self, namespace: Namespace) -> Result<()>;
}
