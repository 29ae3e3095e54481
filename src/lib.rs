//! Folio book catalogue.
//!
//! The books module implements cache-aside reads and invalidating writes over
//! a [`BookStore`](modules::books::store::BookStore), a
//! [`Cache`](folio_cache::Cache) and an
//! [`EventPublisher`](folio_events::EventPublisher). [`bootstrap`] wires those
//! collaborators from settings and serves them over HTTP.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::{build_registry, migrate, run, Backends};
pub use modules::books::{BookError, BookService, ServiceOptions};
