//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ThermoDataError`] via `#[from]`.

use std::fmt;

use serde::Serialize;

use crate::query::QueryError;

/// Top-level error returned by services and repositories.
#[derive(Debug, thiserror::Error)]
pub enum ThermoDataError {
    /// The payload violates declared field constraints.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The query specification could not be parsed or is not allowed.
    #[error("invalid query")]
    Query(#[from] QueryError),

    /// The underlying store failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A single constraint violation on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The field is missing or `null`.
    #[must_use]
    pub fn required(field: &str) -> Self {
        Self::new(field, format!("the {field} field is required"))
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The set of field errors collected while validating a payload.
///
/// Never empty when returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", display_list(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Build an error from a single field violation.
    #[must_use]
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Turn a list of collected violations into a result.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] when `errors` is non-empty.
    pub fn check(errors: Vec<FieldError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { errors })
        }
    }
}

fn display_list(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The record identified by `id` does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
