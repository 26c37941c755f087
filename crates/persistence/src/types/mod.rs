//! Core types: field values, list-query clauses, pagination and the feed
//! records themselves.

pub mod pagination;
pub mod post;
pub mod query;
pub mod source;
pub mod user;
pub mod value;

pub use pagination::{DEFAULT_PAGE_SIZE, PageRequest, PageResult};
pub use post::{POST_SCHEMA, Post, PostDraft, PostMark};
pub use query::{FilterClause, FilterOperator, ListQuery, SortClause, SortDirection};
pub use source::{SOURCE_SCHEMA, Source, SourceDraft};
pub use user::{USER_SCHEMA, User, UserDraft};
pub use value::{FieldValue, format_timestamp, parse_timestamp};
