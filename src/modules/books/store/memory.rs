use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{BookStore, Result, StoreError};
use crate::modules::books::models::{Book, BookDraft, BookId};

#[derive(Debug)]
struct Inner {
    books: BTreeMap<BookId, Book>,
    next_id: BookId,
}

/// Process-local store with sequential ids, for local runs and tests.
#[derive(Debug)]
pub struct MemoryBookStore {
    inner: RwLock<Inner>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                books: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, draft: &BookDraft) -> Result<Book> {
        let mut inner = self.inner.write().await;
        let now = OffsetDateTime::now_utc();

        let id = inner.next_id;
        inner.next_id += 1;

        let book = Book {
            id,
            title: draft.title.clone(),
            author: draft.author.clone(),
            year: draft.year,
            created_at: now,
            updated_at: now,
        };
        inner.books.insert(id, book.clone());
        Ok(book)
    }

    async fn get(&self, id: BookId) -> Result<Book> {
        self.inner
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Book>> {
        let inner = self.inner.read().await;
        Ok(inner
            .books
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn replace(&self, book: &Book) -> Result<Book> {
        let mut inner = self.inner.write().await;
        match inner.books.get_mut(&book.id) {
            Some(existing) => {
                *existing = book.clone();
                Ok(book.clone())
            }
            None => Err(StoreError::NotFound { id: book.id }),
        }
    }

    async fn delete(&self, id: BookId) -> Result<u64> {
        let removed = self.inner.write().await.books.remove(&id);
        Ok(u64::from(removed.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let store = MemoryBookStore::new();
        let first = store.create(&BookDraft::new("A", "X", 2000)).await.unwrap();
        let second = store.create(&BookDraft::new("B", "Y", 2001)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn ignores_draft_identity_fields() {
        let store = MemoryBookStore::new();
        let draft = BookDraft {
            id: Some(99),
            ..BookDraft::new("A", "X", 2000)
        };

        let book = store.create(&draft).await.unwrap();

        assert_eq!(book.id, 1);
        assert!(matches!(
            store.get(99).await,
            Err(StoreError::NotFound { id: 99 })
        ));
    }

    #[tokio::test]
    async fn lists_pages_in_id_order() {
        let store = MemoryBookStore::new();
        for i in 0..5 {
            store
                .create(&BookDraft::new(format!("T{}", i), "A", 2000))
                .await
                .unwrap();
        }

        let page = store.list(2, 1).await.unwrap();
        let ids: Vec<BookId> = page.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 3]);

        assert!(store.list(10, 5).await.unwrap().is_empty());
        assert!(store.list(0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_requires_existing_row() {
        let store = MemoryBookStore::new();
        let mut book = store.create(&BookDraft::new("A", "X", 2000)).await.unwrap();

        book.title = "A, revised".into();
        store.replace(&book).await.unwrap();
        assert_eq!(store.get(book.id).await.unwrap().title, "A, revised");

        book.id = 50;
        assert!(matches!(
            store.replace(&book).await,
            Err(StoreError::NotFound { id: 50 })
        ));
    }

    #[tokio::test]
    async fn delete_reports_rows_affected() {
        let store = MemoryBookStore::new();
        let book = store.create(&BookDraft::new("A", "X", 2000)).await.unwrap();

        assert_eq!(store.delete(book.id).await.unwrap(), 1);
        assert_eq!(store.delete(book.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryBookStore::new();
        let first = store.create(&BookDraft::new("A", "X", 2000)).await.unwrap();
        store.delete(first.id).await.unwrap();

        let second = store.create(&BookDraft::new("B", "Y", 2000)).await.unwrap();
        assert_ne!(first.id, second.id);
    }
}
