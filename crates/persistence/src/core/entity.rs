//! The entity trait implemented by every listable record type.

use serde::Serialize;

use crate::schema::EntitySchema;
use crate::types::FieldValue;

/// A record type with a static descriptor tree and optional list
/// capabilities.
///
/// The three capability accessors default to empty: an entity that declares
/// nothing can still be listed and paginated, but filter, sort and search
/// parameters are ignored for it.
pub trait Entity: Clone + Send + Sync + Serialize + 'static {
    /// The entity's descriptor tree.
    fn schema() -> &'static EntitySchema;

    /// Primary key.
    fn id(&self) -> i64;

    /// Field paths accepted by `filter__`/`exact__`/`lt__`/... parameters.
    fn filterable_fields() -> &'static [&'static str] {
        &[]
    }

    /// Field paths accepted by `sort`.
    fn sortable_fields() -> &'static [&'static str] {
        &[]
    }

    /// Field paths matched by `search`.
    fn searchable_fields() -> &'static [&'static str] {
        &[]
    }

    /// Reads the value at a field path (one reference hop at most).
    ///
    /// A reference field read without a hop yields the referenced id.
    /// Unknown paths read as [`FieldValue::Null`].
    fn field_value(&self, path: &str) -> FieldValue;
}
