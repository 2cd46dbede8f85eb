//! Diesel and r2d2 failures, and their mapping onto `amanah_core::Error`.

use amanah_core::errors::{DatabaseError, Error};
use diesel::result::Error as DieselError;
use thiserror::Error;

/// Never crosses the crate boundary; repositories return `amanah_core::Result`.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot open SQLite database: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Pool checkout failed: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Diesel query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Cannot encode JSON column: {0}")]
    SerializationError(String),

    /// A domain error raised inside a write job. It is handed back unchanged
    /// so not-found and constraint errors keep their meaning.
    #[error("{0}")]
    Core(Error),
}

impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::Core(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            StorageError::PoolError(e) => {
                Error::Database(DatabaseError::PoolCreationFailed(e.to_string()))
            }
            StorageError::QueryFailed(DieselError::NotFound) => {
                Error::Database(DatabaseError::NotFound("no matching row".to_string()))
            }
            StorageError::QueryFailed(DieselError::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            )) => Error::Database(DatabaseError::UniqueViolation(info.message().to_string())),
            StorageError::QueryFailed(DieselError::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                info,
            )) => Error::Database(DatabaseError::ForeignKeyViolation(
                info.message().to_string(),
            )),
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            StorageError::MigrationFailed(e) => Error::Database(DatabaseError::MigrationFailed(e)),
            StorageError::SerializationError(e) => Error::Database(DatabaseError::Internal(e)),
            StorageError::Core(e) => e,
        }
    }
}

/// `.into_core()` on raw Diesel and pool results.
pub trait IntoCore<T> {
    fn into_core(self) -> amanah_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> amanah_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> amanah_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

/// Maps a missing row to a core `NotFound` naming the entity.
pub fn not_found_as(entity: &str, id: &str) -> impl FnOnce(DieselError) -> Error {
    let entity = entity.to_string();
    let id = id.to_string();
    move |err| match err {
        DieselError::NotFound => Error::not_found(&entity, &id),
        other => StorageError::QueryFailed(other).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amanah_core::errors::ValidationError;

    #[test]
    fn core_errors_survive_the_round_trip() {
        let storage: StorageError =
            Error::ConstraintViolation("package still has pilgrims".to_string()).into();
        let back: Error = storage.into();
        assert!(matches!(back, Error::ConstraintViolation(ref m) if m == "package still has pilgrims"));

        let storage: StorageError = Error::from(ValidationError::invalid("bad")).into();
        assert!(matches!(Error::from(storage), Error::Validation(_)));
    }

    #[test]
    fn missing_rows_name_the_entity() {
        let err = not_found_as("Package", "p1")(DieselError::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Package 'p1' not found");
    }
}
