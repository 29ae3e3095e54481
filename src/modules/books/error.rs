use folio_http::error::AppError;
use serde_json::json;
use thiserror::Error;

use super::models::BookId;
use super::store::StoreError;
use super::validation::ValidationError;

/// Outcome classes of the book service.
///
/// Cache and event log failures never show up here: they are logged and
/// swallowed by the service.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("book {id} not found")]
    NotFound { id: BookId },

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl BookError {
    /// Classify a store failure for the book `id` being operated on.
    pub(crate) fn from_store(id: Option<BookId>, err: StoreError) -> Self {
        match (err, id) {
            (StoreError::NotFound { id }, _) => Self::NotFound { id },
            (other, Some(id)) => Self::Internal(
                anyhow::Error::new(other).context(format!("store failed for book {}", id)),
            ),
            (other, None) => Self::Internal(anyhow::Error::new(other).context("store failed")),
        }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::InvalidInput(invalid) => AppError::validation(
                vec![json!({ "field": invalid.field, "error": invalid.reason })],
                invalid.to_string(),
            ),
            BookError::NotFound { id } => AppError::not_found(format!("book {} not found", id)),
            BookError::Internal(err) => AppError::Internal(err),
        }
    }
}
