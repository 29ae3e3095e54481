use async_trait::async_trait;
use sqlx::postgres::PgPool;
use time::OffsetDateTime;

use super::{BookStore, Result, StoreError};
use crate::modules::books::models::{Book, BookDraft, BookId};

const BOOK_COLUMNS: &str = "id, title, author, year, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    year: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            year: row.year,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed store over the `books` table.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, draft: &BookDraft) -> Result<Book> {
        let row: BookRow = sqlx::query_as(&format!(
            "INSERT INTO books (title, author, year, created_at, updated_at) \
             VALUES ($1, $2, $3, now(), now()) \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(draft.year)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: BookId) -> Result<Book> {
        let row: Option<BookRow> =
            sqlx::query_as(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Book::from).ok_or(StoreError::NotFound { id })
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn replace(&self, book: &Book) -> Result<Book> {
        let row: Option<BookRow> = sqlx::query_as(&format!(
            "UPDATE books \
             SET title = $2, author = $3, year = $4, created_at = $5, updated_at = $6 \
             WHERE id = $1 \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year)
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Book::from)
            .ok_or(StoreError::NotFound { id: book.id })
    }

    async fn delete(&self, id: BookId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
