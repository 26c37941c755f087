//! Error types for the feedkeeper API.
//!
//! Every error is returned as a JSON body:
//!
//! ```json
//! { "code": 404, "message": "Source 7 not found" }
//! ```
//!
//! Validation failures add an `errors` object keyed by field name.
//!
//! # Error Mapping
//!
//! | Storage Error | HTTP Status |
//! |--------------|-------------|
//! | NotFound | 404 |
//! | Validation | 400 |
//! | Schema | 500 |
//! | Backend | 500 |
//!
//! List requests never fail because of their query parameters; unknown
//! fields are dropped and bad values are coerced. Only storage failures
//! surface from a list endpoint.

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use feedkeeper_persistence::error::{
    BackendError, ResourceError, SchemaError, StorageError, ValidationError,
};
use serde::Serialize;
use tracing::error;

/// The primary error type for API operations.
#[derive(Debug)]
pub enum RestError {
    /// Missing, malformed or unknown bearer token (HTTP 401).
    Unauthorized {
        /// Why the credentials were rejected.
        message: String,
    },

    /// Record not found or not owned by the caller (HTTP 404).
    NotFound {
        /// The entity name (e.g., "Source").
        entity: String,
        /// The record id.
        id: String,
    },

    /// Invalid request body (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
        /// Per-field messages.
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Storage failure (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

/// Result type alias for handlers.
pub type RestResult<T> = Result<T, RestError>;

impl RestError {
    /// A 400 error naming a single offending field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let message = message.into();
        let mut errors = BTreeMap::new();
        errors.insert(field, vec![message.clone()]);
        RestError::BadRequest { message, errors }
    }

    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            RestError::NotFound { entity, id } => write!(f, "{} {} not found", entity, id),
            RestError::BadRequest { message, .. } => write!(f, "Bad request: {}", message),
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            RestError::Unauthorized { message } => message.clone(),
            RestError::NotFound { entity, id } => format!("{} {} not found", entity, id),
            RestError::BadRequest { message, .. } => message.clone(),
            RestError::InternalError { message } => {
                error!(error = %message, "Request failed");
                "Internal server error".to_string()
            }
        };
        let errors = match &self {
            RestError::BadRequest { errors, .. } if !errors.is_empty() => Some(errors),
            _ => None,
        };

        let body = ErrorBody {
            code: status.as_u16(),
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

// Conversions from storage errors

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(e) => e.into(),
            StorageError::Validation(e) => e.into(),
            StorageError::Schema(e) => e.into(),
            StorageError::Backend(e) => e.into(),
        }
    }
}

impl From<ResourceError> for RestError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound { entity, id } => RestError::NotFound { entity, id },
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::invalid_field(err.field(), err.to_string())
    }
}

impl From<SchemaError> for RestError {
    fn from(err: SchemaError) -> Self {
        RestError::InternalError {
            message: err.to_string(),
        }
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        RestError::InternalError {
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for RestError {
    fn from(err: JsonRejection) -> Self {
        RestError::BadRequest {
            message: err.body_text(),
            errors: BTreeMap::new(),
        }
    }
}
