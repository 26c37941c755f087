//! List-query shaping: value coercion, predicate composition and pagination.
//!
//! Given a base [`Collection`](crate::core::Collection) and a parsed
//! [`ListQuery`](crate::types::ListQuery), [`compose`] narrows and orders the
//! collection and [`paginate`] counts it and loads one page. Neither step
//! can fail because of client input; only storage errors propagate.

pub mod coerce;
pub mod compose;
pub mod normalize;
pub mod paginate;
pub mod predicate;

pub use coerce::{coerce, coerce_kind};
pub use compose::{compose, filter_predicate, search_predicate};
pub use normalize::normalize_dialect;
pub use paginate::paginate;
pub use predicate::{Comparison, Predicate};
