//! Cache key families for the books module.

use folio_cache::{CacheKey, Namespace};

use super::models::BookId;

/// Single books, keyed by id.
pub const BOOK: Namespace = Namespace::new("book");

/// List pages, keyed by `limit:offset`. Any write makes every page stale.
pub const BOOK_PAGES: Namespace = Namespace::new("books");

pub fn book_key(id: BookId) -> CacheKey {
    CacheKey::new(BOOK, id)
}

pub fn page_key(limit: u32, offset: u32) -> CacheKey {
    CacheKey::new(BOOK_PAGES, format_args!("{}:{}", limit, offset))
}
