//! Service error taxonomy
//!
//! Every failure a caller can observe is one of these variants. Raw driver
//! errors are classified at the database layer and never cross the route
//! boundary; each variant maps to a stable machine-readable kind and an
//! HTTP status.

use hyper::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RefugeError>;

/// A single field-level validation failure
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Service-wide error type
#[derive(Debug, Error)]
pub enum RefugeError {
    /// Missing or malformed required fields in a submission
    #[error("validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// Primary document absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller is not the owner of the resource
    #[error("forbidden: {0}")]
    Authorization(String),

    /// State-machine guard violated (e.g. transitioning a non-pending request)
    #[error("conflict: {0}")]
    Conflict(String),

    /// A polymorphic reference matched more than one candidate collection.
    /// Data-integrity anomaly; never silently resolved to a first match.
    #[error("ambiguous reference '{reference}' ({kind}) matched collections: {}", collections.join(", "))]
    AmbiguousReference {
        kind: &'static str,
        reference: String,
        collections: Vec<&'static str>,
    },

    /// A required reference could not be resolved (distinct from NotFound
    /// of the primary document)
    #[error("data integrity: {0}")]
    DataIntegrity(String),

    /// Store unreachable or timed out; safe to retry
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Any other classified store failure
    #[error("database error: {0}")]
    Database(String),

    /// Malformed request at the HTTP boundary
    #[error("bad request: {0}")]
    Http(String),
}

impl RefugeError {
    /// Single-field validation shortcut
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        RefugeError::Validation(vec![FieldError::new(field, message)])
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RefugeError::Validation(_) | RefugeError::Http(_) => StatusCode::BAD_REQUEST,
            RefugeError::NotFound(_) => StatusCode::NOT_FOUND,
            RefugeError::Authorization(_) => StatusCode::FORBIDDEN,
            RefugeError::Conflict(_) => StatusCode::CONFLICT,
            RefugeError::AmbiguousReference { .. }
            | RefugeError::DataIntegrity(_)
            | RefugeError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RefugeError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable machine-readable kind for error responses
    pub fn kind(&self) -> &'static str {
        match self {
            RefugeError::Validation(_) => "VALIDATION",
            RefugeError::NotFound(_) => "NOT_FOUND",
            RefugeError::Authorization(_) => "FORBIDDEN",
            RefugeError::Conflict(_) => "CONFLICT",
            RefugeError::AmbiguousReference { .. } => "AMBIGUOUS_REFERENCE",
            RefugeError::DataIntegrity(_) => "DATA_INTEGRITY",
            RefugeError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            RefugeError::Database(_) => "DATABASE",
            RefugeError::Http(_) => "BAD_REQUEST",
        }
    }

    /// Field-level detail for validation errors, if any
    pub fn fields(&self) -> Option<&[FieldError]> {
        match self {
            RefugeError::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Classify a MongoDB driver error into the service taxonomy.
///
/// Server-selection failures (unreachable store, selection timeout) are
/// retryable; everything else is a plain database failure.
pub fn classify_db_error(err: mongodb::error::Error) -> RefugeError {
    use mongodb::error::ErrorKind;

    match *err.kind {
        ErrorKind::ServerSelection { .. } => RefugeError::UpstreamUnavailable(err.to_string()),
        _ => RefugeError::Database(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RefugeError::invalid("contact", "required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RefugeError::NotFound("animal".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RefugeError::Authorization("not owner".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RefugeError::Conflict("not pending".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RefugeError::UpstreamUnavailable("timeout".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        let ambiguous = RefugeError::AmbiguousReference {
            kind: "authorLike",
            reference: "abc".into(),
            collections: vec!["users", "stores"],
        };
        assert_eq!(ambiguous.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_kind_codes_are_stable() {
        assert_eq!(RefugeError::invalid("x", "y").kind(), "VALIDATION");
        assert_eq!(RefugeError::NotFound("x".into()).kind(), "NOT_FOUND");
        assert_eq!(RefugeError::Conflict("x".into()).kind(), "CONFLICT");
        assert_eq!(
            RefugeError::DataIntegrity("x".into()).kind(),
            "DATA_INTEGRITY"
        );
        assert_eq!(
            RefugeError::UpstreamUnavailable("x".into()).kind(),
            "UPSTREAM_UNAVAILABLE"
        );
    }

    #[test]
    fn test_validation_fields_detail() {
        let err = RefugeError::Validation(vec![
            FieldError::new("contact", "required for disparition reports"),
            FieldError::new("species", "required for disparition reports"),
        ]);
        let fields = err.fields().expect("validation carries fields");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "contact");
        assert!(err.to_string().contains("contact"));
    }

    #[test]
    fn test_ambiguous_reference_names_collections() {
        let err = RefugeError::AmbiguousReference {
            kind: "authorLike",
            reference: "64f100000000000000000001".into(),
            collections: vec!["users", "veterinarians"],
        };
        let msg = err.to_string();
        assert!(msg.contains("users"));
        assert!(msg.contains("veterinarians"));
    }
}
