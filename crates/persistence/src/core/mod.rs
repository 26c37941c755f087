//! Core storage traits and abstractions.
//!
//! - [`Entity`] - a record type with a descriptor tree and list capabilities
//! - [`Collection`] - an immutable, refinable set of records
//! - [`FeedStorage`] - owner-scoped CRUD plus the base collections
//!
//! # Example: Implementing a Storage Backend
//!
//! A backend provides one [`Collection`] per listable entity and implements
//! [`FeedStorage`] on top of it. The in-memory backend evaluates predicates
//! in process; the SQLite backend compiles them to SQL.

pub mod collection;
pub mod entity;
pub mod storage;

pub use collection::Collection;
pub use entity::Entity;
pub use storage::FeedStorage;
