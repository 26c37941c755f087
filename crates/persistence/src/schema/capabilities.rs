//! Per-entity filter/sort/search capability sets.

use crate::error::SchemaError;

use super::field::EntitySchema;

/// The three validated capability sets of one entity.
///
/// Paths are kept in declaration order (duplicates removed) so response
/// headers can list them the way the entity declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCapabilities {
    filterable: Vec<String>,
    sortable: Vec<String>,
    searchable: Vec<String>,
}

impl EntityCapabilities {
    /// Capabilities of an entity that declares nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates declared paths against `schema`.
    ///
    /// Fails on the first path that does not resolve or has more than one
    /// reference hop.
    pub fn declare(
        schema: &'static EntitySchema,
        filterable: &[&str],
        sortable: &[&str],
        searchable: &[&str],
    ) -> Result<Self, SchemaError> {
        Ok(Self {
            filterable: validated(schema, filterable)?,
            sortable: validated(schema, sortable)?,
            searchable: validated(schema, searchable)?,
        })
    }

    pub fn filterable(&self) -> &[String] {
        &self.filterable
    }

    pub fn sortable(&self) -> &[String] {
        &self.sortable
    }

    pub fn searchable(&self) -> &[String] {
        &self.searchable
    }

    pub fn allows_filter(&self, path: &str) -> bool {
        self.filterable.iter().any(|p| p == path)
    }

    pub fn allows_sort(&self, path: &str) -> bool {
        self.sortable.iter().any(|p| p == path)
    }

    pub fn allows_search(&self, path: &str) -> bool {
        self.searchable.iter().any(|p| p == path)
    }

    /// Returns true when all three sets are empty.
    pub fn is_empty(&self) -> bool {
        self.filterable.is_empty() && self.sortable.is_empty() && self.searchable.is_empty()
    }
}

fn validated(schema: &'static EntitySchema, paths: &[&str]) -> Result<Vec<String>, SchemaError> {
    let mut out: Vec<String> = Vec::with_capacity(paths.len());
    for path in paths {
        schema.check_path(path)?;
        if !out.iter().any(|p| p == path) {
            out.push((*path).to_string());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::FieldDescriptor;

    static PARENT: EntitySchema = EntitySchema {
        name: "Parent",
        table: "parents",
        fields: &[FieldDescriptor::integer("id"), FieldDescriptor::text("title")],
    };

    static CHILD: EntitySchema = EntitySchema {
        name: "Child",
        table: "children",
        fields: &[
            FieldDescriptor::integer("id"),
            FieldDescriptor::text("name"),
            FieldDescriptor::integer("rank"),
            FieldDescriptor::reference("parent", "parent_id", &PARENT),
        ],
    };

    #[test]
    fn test_declare_keeps_order_and_dedupes() {
        let caps = EntityCapabilities::declare(
            &CHILD,
            &["rank", "name", "rank"],
            &["id"],
            &["parent.title"],
        )
        .unwrap();
        assert_eq!(caps.filterable(), ["rank".to_string(), "name".to_string()]);
        assert!(caps.allows_filter("name"));
        assert!(!caps.allows_filter("id"));
        assert!(caps.allows_sort("id"));
        assert!(caps.allows_search("parent.title"));
    }

    #[test]
    fn test_declare_rejects_deep_path() {
        let result = EntityCapabilities::declare(&CHILD, &["parent.title.x"], &[], &[]);
        assert!(matches!(result, Err(SchemaError::InvalidFieldPath { .. })));
    }

    #[test]
    fn test_declare_rejects_unknown() {
        let result = EntityCapabilities::declare(&CHILD, &[], &["nope"], &[]);
        assert!(matches!(result, Err(SchemaError::UnknownField { .. })));
    }

    #[test]
    fn test_empty() {
        let caps = EntityCapabilities::empty();
        assert!(caps.is_empty());
        assert!(!caps.allows_sort("id"));
    }
}
