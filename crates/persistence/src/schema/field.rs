//! Field descriptors and entity descriptor trees.
//!
//! Every entity exposes a static [`EntitySchema`] describing its columns and
//! their kinds. A [`FieldKind::Reference`] points at the referenced entity's
//! schema so that dotted paths such as `user.email` resolve one hop deep.

use std::fmt;

use crate::error::SchemaError;

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Free text, compared after dialect normalization.
    Text,
    /// Signed integer.
    Integer,
    /// Floating point number.
    Float,
    /// Boolean flag.
    Boolean,
    /// UTC date-time.
    Timestamp,
    /// Foreign key to another entity.
    Reference(&'static EntitySchema),
}

impl FieldKind {
    /// Returns the kind name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Reference(_) => "reference",
        }
    }

    /// Returns the referenced schema for reference fields.
    pub fn target(&self) -> Option<&'static EntitySchema> {
        match self {
            FieldKind::Reference(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Reference(target) => write!(f, "reference({})", target.name),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A single field of an entity.
#[derive(Debug)]
pub struct FieldDescriptor {
    /// Name used in query parameters and JSON.
    pub name: &'static str,
    /// Storage column name.
    pub column: &'static str,
    /// Value kind.
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, name, FieldKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, name, FieldKind::Integer)
    }

    pub const fn float(name: &'static str) -> Self {
        Self::new(name, name, FieldKind::Float)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, name, FieldKind::Boolean)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, name, FieldKind::Timestamp)
    }

    /// A foreign key stored in `column` pointing at `target`.
    pub const fn reference(
        name: &'static str,
        column: &'static str,
        target: &'static EntitySchema,
    ) -> Self {
        Self::new(name, column, FieldKind::Reference(target))
    }

    const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self { name, column, kind }
    }
}

/// The descriptor tree of one entity.
#[derive(Debug)]
pub struct EntitySchema {
    /// Entity name, e.g. `Source`.
    pub name: &'static str,
    /// Storage table name.
    pub table: &'static str,
    /// Declared fields, `id` first.
    pub fields: &'static [FieldDescriptor],
}

/// A field path resolved against an entity schema.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPath {
    /// The reference field walked through, for dotted paths.
    pub via: Option<&'static FieldDescriptor>,
    /// The terminal field.
    pub field: &'static FieldDescriptor,
}

impl ResolvedPath {
    /// Kind of the terminal field.
    pub fn kind(&self) -> FieldKind {
        self.field.kind
    }
}

impl EntitySchema {
    /// Looks up a direct field by name.
    pub fn field(&'static self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the reference fields of this entity, in declaration order.
    pub fn references(&'static self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Reference(_)))
    }

    /// Resolves a field path, walking at most one reference hop.
    ///
    /// Returns `None` for unknown fields and malformed paths.
    pub fn resolve(&'static self, path: &str) -> Option<ResolvedPath> {
        self.check_path(path).ok()
    }

    /// Resolves a field path, reporting why it is not acceptable.
    pub fn check_path(&'static self, path: &str) -> Result<ResolvedPath, SchemaError> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(self.invalid_path(path, "empty path segment"));
        }

        match segments.as_slice() {
            [name] => self
                .field(name)
                .map(|field| ResolvedPath { via: None, field })
                .ok_or_else(|| self.unknown_field(path)),
            [head, tail] => {
                let via = self.field(head).ok_or_else(|| self.unknown_field(path))?;
                let target = via.kind.target().ok_or_else(|| {
                    self.invalid_path(path, "only reference fields can be traversed")
                })?;
                target
                    .field(tail)
                    .map(|field| ResolvedPath {
                        via: Some(via),
                        field,
                    })
                    .ok_or_else(|| self.unknown_field(path))
            }
            _ => Err(self.invalid_path(path, "at most one reference hop is allowed")),
        }
    }

    fn invalid_path(&self, path: &str, reason: &str) -> SchemaError {
        SchemaError::InvalidFieldPath {
            entity: self.name.to_string(),
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    fn unknown_field(&self, path: &str) -> SchemaError {
        SchemaError::UnknownField {
            entity: self.name.to_string(),
            path: path.to_string(),
        }
    }
}
