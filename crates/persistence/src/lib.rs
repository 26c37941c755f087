//! Feedkeeper persistence layer.
//!
//! This crate stores users, their feed sources and the posts fetched from
//! those sources, and shapes list queries over them: capability gating,
//! value coercion, predicate composition and pagination.
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite with in-memory and file modes
//!
//! The in-memory backend is always available.
//!
//! # Architecture
//!
//! - [`schema`] - Field descriptors and the per-entity capability registry
//! - [`types`] - Entities, list queries, field values and pages
//! - [`error`] - Error types for all operations
//! - [`core`] - Storage and collection traits
//! - [`query`] - Coercion, predicate composition and pagination
//! - [`backends`] - Backend implementations
//!
//! # Shaping a query
//!
//! ```
//! use feedkeeper_persistence::query::{filter_predicate, Predicate};
//! use feedkeeper_persistence::schema::CapabilityRegistry;
//! use feedkeeper_persistence::types::{FilterClause, FilterOperator, Source};
//!
//! let registry = CapabilityRegistry::feed().unwrap();
//! let caps = registry.of::<Source>();
//!
//! // `live` is filterable on sources, so the clause becomes a predicate
//! let clause = FilterClause::new(FilterOperator::Equals, "live", "true");
//! assert!(matches!(
//!     filter_predicate::<Source>(&clause, &caps),
//!     Some(Predicate::Compare(_))
//! ));
//!
//! // `image_url` is not, so the clause is dropped
//! let clause = FilterClause::new(FilterOperator::Equals, "image_url", "x");
//! assert!(filter_predicate::<Source>(&clause, &caps).is_none());
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod query;
pub mod schema;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{StorageError, StorageResult};
pub use types::{ListQuery, PageRequest, PageResult};

// Re-export core traits
pub use core::{Collection, Entity, FeedStorage};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
