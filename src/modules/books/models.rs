use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Store-assigned book identifier.
pub type BookId = i64;

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub year: i32,
    /// Set once at creation and carried forward by every update.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Client payload for creating or replacing a book.
///
/// Missing fields default to empty values so validation, not JSON parsing,
/// reports them. `id` and `created_at` are accepted for compatibility with
/// clients that echo a full `Book` back, but the service never trusts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default, skip_serializing)]
    pub id: Option<BookId>,
    #[serde(
        default,
        skip_serializing,
        with = "time::serde::rfc3339::option"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
            ..Self::default()
        }
    }
}

/// Page request for list queries. Defaults belong to the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default = "Pagination::default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Pagination {
    fn default_limit() -> u32 {
        10
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_ignores_missing_fields() {
        let draft: BookDraft = serde_json::from_str(r#"{"author": "Ursula K. Le Guin"}"#).unwrap();
        assert_eq!(draft.title, "");
        assert_eq!(draft.year, 0);
        assert_eq!(draft.id, None);
    }

    #[test]
    fn draft_accepts_echoed_book_fields() {
        let draft: BookDraft = serde_json::from_str(
            r#"{"id": 3, "title": "Dune", "author": "Frank Herbert", "year": 1965,
                "created_at": "1999-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(draft.id, Some(3));
        assert!(draft.created_at.is_some());
    }

    #[test]
    fn pagination_defaults() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page, Pagination::default());
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 0);
    }
}
