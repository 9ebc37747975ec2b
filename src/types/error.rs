//! Error types for Ideagram
//!
//! One error enum for the whole crate. Every variant maps to an HTTP status
//! code and a JSON body so handlers can turn any failure into a response.

use std::collections::BTreeMap;

use hyper::StatusCode;
use serde_json::{json, Value};

/// Per-field validation messages, keyed by input field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Main error type for Ideagram operations
#[derive(Debug, thiserror::Error)]
pub enum IdeagramError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {}", describe_fields(.0))]
    Validation(FieldErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

fn describe_fields(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl IdeagramError {
    /// Validation error for a single field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self::Validation(fields)
    }

    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::InvalidPassword => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Human readable message without the variant prefix
    pub fn detail(&self) -> String {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Database(m)
            | Self::Internal(m)
            | Self::Config(m)
            | Self::Auth(m) => m.clone(),
            Self::Validation(fields) => describe_fields(fields),
            Self::InvalidPassword => "Invalid password".to_string(),
        }
    }

    /// JSON body for HTTP responses
    ///
    /// Validation errors keep their per-field shape, everything else
    /// becomes `{"detail": "..."}`.
    pub fn to_body(&self) -> Value {
        match self {
            Self::Validation(fields) => json!(fields),
            Self::InvalidPassword => json!({ "old_password": ["Invalid password"] }),
            other => json!({ "detail": other.detail() }),
        }
    }
}

// Implement From conversions for common error types

impl From<std::io::Error> for IdeagramError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for IdeagramError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<hyper::Error> for IdeagramError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for IdeagramError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Unauthorized(format!("JWT error: {}", err))
    }
}

impl From<base64::DecodeError> for IdeagramError {
    fn from(err: base64::DecodeError) -> Self {
        Self::field("content", format!("Invalid base64 content: {}", err))
    }
}

impl From<diesel::r2d2::PoolError> for IdeagramError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::Database(format!("Failed to get connection: {}", err))
    }
}

impl From<diesel::result::Error> for IdeagramError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => Self::NotFound("Record not found".into()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Conflict(info.message().to_string())
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::BadRequest(info.message().to_string())
            }
            other => Self::Database(other.to_string()),
        }
    }
}

/// Result type alias for Ideagram operations
pub type Result<T> = std::result::Result<T, IdeagramError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            IdeagramError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            IdeagramError::Conflict("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IdeagramError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            IdeagramError::Auth("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_field_error_body() {
        let err = IdeagramError::field("title", "Title contains forbidden word");
        assert_eq!(
            err.to_body(),
            json!({ "title": ["Title contains forbidden word"] })
        );
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_detail_body() {
        let err = IdeagramError::NotFound("No idea found with this uuid!".into());
        assert_eq!(
            err.to_body(),
            json!({ "detail": "No idea found with this uuid!" })
        );
    }

    #[test]
    fn test_diesel_not_found_maps() {
        let err: IdeagramError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, IdeagramError::NotFound(_)));
    }
}
