//! Error types for the persistence layer.
//!
//! This module defines all error types used throughout the persistence layer,
//! following a hierarchy that separates record errors, input validation errors,
//! capability-declaration errors and backend failures.
//!
//! Only [`StorageError::Backend`] can be caused at request time by a list
//! query; unknown fields and malformed values are absorbed by the query
//! shaper and never surface here.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Record state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Capability declaration errors
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to record state.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The requested record was not found (or is not visible to the caller).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

impl ResourceError {
    /// Shorthand for a not-found error on an integer key.
    pub fn not_found(entity: &str, id: i64) -> Self {
        ResourceError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// Errors related to caller-supplied record content.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Missing required field.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A field carried an unacceptable value.
    #[error("invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingRequiredField { field }
            | ValidationError::InvalidField { field, .. } => field,
        }
    }
}

/// Errors in an entity's capability declaration.
///
/// These are raised while the capability registry is built at startup.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The field path has more than one reference hop or an empty segment.
    #[error("invalid field path '{path}' on {entity}: {reason}")]
    InvalidFieldPath {
        entity: String,
        path: String,
        reason: String,
    },

    /// The field path does not name a field of the entity.
    #[error("unknown field '{path}' on {entity}")]
    UnknownField { entity: String, path: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(BackendError::QueryError {
            message: err.to_string(),
        })
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ResourceError::not_found("Source", 42);
        assert_eq!(err.to_string(), "Source not found: 42");
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: StorageError = ValidationError::MissingRequiredField {
            field: "feed_url".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "missing required field: feed_url");
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::InvalidField {
            field: "body".to_string(),
            message: "must not be empty".to_string(),
        };
        assert_eq!(err.field(), "body");
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::InvalidFieldPath {
            entity: "Post".to_string(),
            path: "source.user.email".to_string(),
            reason: "at most one reference hop is allowed".to_string(),
        };
        assert!(err.to_string().contains("source.user.email"));
    }
}
