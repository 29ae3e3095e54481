//! Durable book persistence. The store is the single source of truth.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Book, BookDraft, BookId};

mod memory;
mod postgres;

pub use memory::MemoryBookStore;
pub use postgres::PgBookStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {id} not found")]
    NotFound { id: BookId },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persists a new book; the store assigns `id`, `created_at` and `updated_at`.
    async fn create(&self, draft: &BookDraft) -> Result<Book>;

    async fn get(&self, id: BookId) -> Result<Book>;

    /// Books ordered by ascending id.
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Book>>;

    /// Overwrites every column of the row identified by `book.id`.
    async fn replace(&self, book: &Book) -> Result<Book>;

    /// Returns the number of rows removed.
    async fn delete(&self, id: BookId) -> Result<u64>;
}
