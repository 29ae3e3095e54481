use folio_events::DomainEvent;
use serde::Serialize;

use super::models::{Book, BookId};

/// Completed book mutations, one event per successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookEvent {
    Created(Book),
    Updated(Book),
    Deleted { id: BookId },
}

#[derive(Serialize)]
struct DeletedPayload {
    id: BookId,
}

impl BookEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            BookEvent::Created(_) => "book_created",
            BookEvent::Updated(_) => "book_updated",
            BookEvent::Deleted { .. } => "book_deleted",
        }
    }

    pub fn book_id(&self) -> BookId {
        match self {
            BookEvent::Created(book) | BookEvent::Updated(book) => book.id,
            BookEvent::Deleted { id } => *id,
        }
    }

    pub fn to_domain_event(&self) -> folio_events::Result<DomainEvent> {
        match self {
            BookEvent::Created(book) | BookEvent::Updated(book) => {
                DomainEvent::new(self.event_type(), book)
            }
            BookEvent::Deleted { id } => {
                DomainEvent::new(self.event_type(), &DeletedPayload { id: *id })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn book() -> Book {
        Book {
            id: 9,
            title: "Kindred".into(),
            author: "Octavia E. Butler".into(),
            year: 1979,
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at: datetime!(2024-01-02 00:00 UTC),
        }
    }

    #[test]
    fn created_event_carries_full_book() {
        let event = BookEvent::Created(book()).to_domain_event().unwrap();
        assert_eq!(event.event_type, "book_created");
        assert_eq!(event.payload["title"], "Kindred");
        assert_eq!(event.payload["created_at"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn deleted_event_carries_only_id() {
        let event = BookEvent::Deleted { id: 9 }.to_domain_event().unwrap();
        assert_eq!(event.event_type, "book_deleted");
        assert_eq!(event.payload, serde_json::json!({ "id": 9 }));
    }

    #[test]
    fn updated_event_type() {
        let event = BookEvent::Updated(book());
        assert_eq!(event.event_type(), "book_updated");
        assert_eq!(event.book_id(), 9);
    }
}
