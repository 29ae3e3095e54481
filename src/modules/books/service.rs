//! Cache-aside orchestration over the book store, cache and event log.
//!
//! Reads probe the cache first and repopulate it on a miss. Writes commit to
//! the store, then invalidate the affected cache entries, then emit one event.
//! Cache and event log failures never change the outcome of an operation:
//! they go through [`tolerate`], which logs and discards them.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use folio_cache::{Cache, CacheKey};
use folio_events::EventPublisher;
use folio_kernel::settings::Settings;
use serde::{de::DeserializeOwned, Serialize};
use time::OffsetDateTime;

use super::error::BookError;
use super::events::BookEvent;
use super::keys::{self, BOOK_PAGES};
use super::models::{Book, BookDraft, BookId};
use super::store::BookStore;
use super::validation::validate;

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub cache_ttl: Duration,
    pub channel: String,
}

impl ServiceOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cache_ttl: settings.cache.ttl(),
            channel: settings.events.channel.clone(),
        }
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

pub struct BookService {
    store: Arc<dyn BookStore>,
    cache: Arc<dyn Cache>,
    events: Arc<dyn EventPublisher>,
    options: ServiceOptions,
}

impl BookService {
    pub fn new(
        store: Arc<dyn BookStore>,
        cache: Arc<dyn Cache>,
        events: Arc<dyn EventPublisher>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            cache,
            events,
            options,
        }
    }

    pub async fn get_all_books(&self, limit: u32, offset: u32) -> Result<Vec<Book>, BookError> {
        let key = keys::page_key(limit, offset);
        if let Some(books) = self.cached(&key).await {
            return Ok(books);
        }

        let books = self
            .store
            .list(limit, offset)
            .await
            .map_err(|err| BookError::from_store(None, err))?;

        self.populate(&key, &books).await;
        Ok(books)
    }

    pub async fn get_book_by_id(&self, id: BookId) -> Result<Book, BookError> {
        let key = keys::book_key(id);
        if let Some(book) = self.cached(&key).await {
            return Ok(book);
        }

        // NotFound returns here, so misses are never cached
        let book = self
            .store
            .get(id)
            .await
            .map_err(|err| BookError::from_store(Some(id), err))?;

        self.populate(&key, &book).await;
        Ok(book)
    }

    pub async fn create_book(&self, draft: BookDraft) -> Result<Book, BookError> {
        validate(&draft, current_year())?;

        let book = self
            .store
            .create(&draft)
            .await
            .map_err(|err| BookError::from_store(None, err))?;
        tracing::info!(book_id = book.id, "book created");

        self.invalidate_pages().await;
        self.emit(BookEvent::Created(book.clone())).await;
        Ok(book)
    }

    /// Full-record replace. `id` and `created_at` always come from the
    /// existing record, never from the draft.
    pub async fn update_book(&self, id: BookId, draft: BookDraft) -> Result<Book, BookError> {
        let existing = self
            .store
            .get(id)
            .await
            .map_err(|err| BookError::from_store(Some(id), err))?;

        validate(&draft, current_year())?;

        let merged = Book {
            id,
            title: draft.title,
            author: draft.author,
            year: draft.year,
            created_at: existing.created_at,
            updated_at: OffsetDateTime::now_utc(),
        };
        let book = self
            .store
            .replace(&merged)
            .await
            .map_err(|err| BookError::from_store(Some(id), err))?;
        tracing::info!(book_id = id, "book updated");

        self.invalidate_book(id).await;
        self.invalidate_pages().await;
        self.emit(BookEvent::Updated(book.clone())).await;
        Ok(book)
    }

    pub async fn delete_book(&self, id: BookId) -> Result<(), BookError> {
        let removed = self
            .store
            .delete(id)
            .await
            .map_err(|err| BookError::from_store(Some(id), err))?;
        if removed == 0 {
            return Err(BookError::NotFound { id });
        }
        tracing::info!(book_id = id, "book deleted");

        self.invalidate_book(id).await;
        self.invalidate_pages().await;
        self.emit(BookEvent::Deleted { id }).await;
        Ok(())
    }

    /// Round-trips the store with a one-row page. The cache is bypassed.
    pub async fn check_store(&self) -> Result<(), BookError> {
        self.store
            .list(1, 0)
            .await
            .map(|_| ())
            .map_err(|err| BookError::from_store(None, err))
    }

    /// A hit that fails to decode counts as a miss.
    async fn cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let bytes = match self.cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(key = %key, "cache miss");
                return None;
            }
            Err(err) => {
                tolerate("cache read", Err(err));
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                tracing::debug!(key = %key, "cache hit");
                Some(value)
            }
            Err(err) => {
                tolerate("cache decode", Err(err));
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                tolerate("cache encode", Err(err));
                return;
            }
        };
        tolerate(
            "cache write",
            self.cache.set(key, &bytes, self.options.cache_ttl).await,
        );
    }

    async fn invalidate_book(&self, id: BookId) {
        tolerate(
            "cache invalidate",
            self.cache.invalidate(&keys::book_key(id)).await,
        );
    }

    async fn invalidate_pages(&self) {
        tolerate(
            "cache invalidate pages",
            self.cache.invalidate_namespace(BOOK_PAGES).await,
        );
    }

    async fn emit(&self, event: BookEvent) {
        let bytes = match event.to_domain_event().and_then(|e| e.to_bytes()) {
            Ok(bytes) => bytes,
            Err(err) => {
                tolerate("event encode", Err(err));
                return;
            }
        };

        let published = tolerate(
            "event publish",
            self.events.publish(&self.options.channel, &bytes).await,
        );
        if published {
            tracing::debug!(
                event_type = event.event_type(),
                book_id = event.book_id(),
                channel = %self.options.channel,
                "event published"
            );
        }
    }
}

/// Log and discard the failure of a best-effort side effect. Returns whether
/// the effect succeeded.
fn tolerate<E: Display>(effect: &'static str, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(effect, error = %err, "best-effort side effect failed");
            false
        }
    }
}

fn current_year() -> i32 {
    OffsetDateTime::now_utc().year()
}
