//! Storage-specific error type wrapping sqlx errors.

use thermodata_domain::error::{FieldError, ThermoDataError, ValidationError};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for ThermoDataError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Report a dangling alert reference as a validation failure.
pub(crate) fn map_reference_error(err: sqlx::Error) -> ThermoDataError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ValidationError::single(FieldError::new(
                "temperatureReadingId",
                "the referenced temperature reading does not exist",
            ))
            .into()
        }
        _ => StorageError::from(err).into(),
    }
}
