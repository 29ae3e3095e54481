//! In-memory cache with LRU eviction.
//!
//! Expiration is lazy: an expired entry is dropped the next time it is read.
//! Keys are tracked per namespace so namespace invalidation only touches the
//! namespace's own members.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use crate::{Cache, CacheKey, Namespace, Result};

#[derive(Debug, Clone)]
struct CacheEntry {
    namespace: Namespace,
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug)]
struct Inner {
    store: LruCache<String, CacheEntry>,
    /// Namespace -> member keys. Mirrors `store`: every tracked key is present
    /// until it is evicted, expired or invalidated.
    tracking: HashMap<Namespace, HashSet<String>>,
}

impl Inner {
    fn untrack(&mut self, namespace: Namespace, key: &str) {
        if let Some(members) = self.tracking.get_mut(&namespace) {
            members.remove(key);
            if members.is_empty() {
                self.tracking.remove(&namespace);
            }
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.tracking.values().map(HashSet::len).sum()
    }
}

/// Thread-safe in-memory cache, cheap to clone.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` values (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                store: LruCache::new(capacity),
                tracking: HashMap::new(),
            })),
        }
    }

    /// Number of live (possibly expired but not yet collected) entries.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let mut inner = self.inner.lock().await;

        match inner.store.get(key.as_str()) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }

        // Expired: collect it now
        inner.store.pop(key.as_str());
        inner.untrack(key.namespace(), key.as_str());

        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<()> {
        let mut inner = self.inner.lock().await;

        let entry = CacheEntry {
            namespace: key.namespace(),
            value: value.to_vec(),
            expires_at: Instant::now() + ttl,
        };
        let displaced = inner.store.push(key.as_str().to_string(), entry);
        if let Some((evicted_key, evicted)) = displaced {
            // `push` also hands back the previous value of the same key
            if evicted_key != key.as_str() {
                inner.untrack(evicted.namespace, &evicted_key);
            }
        }
        inner
            .tracking
            .entry(key.namespace())
            .or_default()
            .insert(key.as_str().to_string());

        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<()> {
        let mut inner = self.inner.lock().await;

        inner.store.pop(key.as_str());
        inner.untrack(key.namespace(), key.as_str());

        Ok(())
    }

    async fn invalidate_namespace(&self, namespace: Namespace) -> Result<()> {
        let mut inner = self.inner.lock().await;

        let members = inner.tracking.remove(&namespace).unwrap_or_default();
        for member in &members {
            inner.store.pop(member);
        }

        tracing::trace!(namespace = %namespace, removed = members.len(), "namespace invalidated");
        Ok(())
    }
}
