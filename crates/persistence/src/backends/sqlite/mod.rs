//! SQLite backend.
//!
//! Records live in one table per entity; timestamps are stored as
//! fixed-width RFC 3339 text so that text ordering matches time ordering.
//! List collections compile their predicates to SQL, count with
//! `COUNT(*)` and load a page by selecting ids first.

mod backend;
mod collection;
pub mod query_builder;
mod schema;
mod storage;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use collection::{SqliteCollection, SqliteRecord};
pub use schema::SCHEMA_VERSION;
