//! Draft validation. Rules run in a fixed order (title, author, year) and the
//! first failure wins, so messages are deterministic.

use thiserror::Error;

use super::models::BookDraft;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Accepts years in `0..=current_year + 1`.
pub fn validate(draft: &BookDraft, current_year: i32) -> Result<(), ValidationError> {
    if draft.title.is_empty() {
        return Err(ValidationError::new("title", "title is required"));
    }
    if draft.author.is_empty() {
        return Err(ValidationError::new("author", "author is required"));
    }

    let max_year = current_year + 1;
    if !(0..=max_year).contains(&draft.year) {
        return Err(ValidationError::new(
            "year",
            format!("year must be between 0 and {}", max_year),
        ));
    }

    Ok(())
}
