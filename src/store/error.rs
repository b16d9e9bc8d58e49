//! Store error taxonomy
//!
//! Driver errors are translated into typed conditions exactly once, here.
//! Upper layers match on these variants and never inspect SQLSTATE codes
//! or other driver-specific representations.

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for serialization failures.
const SERIALIZATION_FAILURE: &str = "40001";
/// Postgres SQLSTATE for transactions killed as deadlock victims.
const DEADLOCK_DETECTED: &str = "40P01";

/// Error returned by every record store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    AlreadyExists,

    /// Storage-level contention that is expected to resolve on retry.
    #[error("transient storage conflict")]
    TransientConflict,

    /// Any other storage failure. Never retried automatically.
    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl StoreError {
    /// Whether a fresh attempt of the same unit of work may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::TransientConflict)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return StoreError::NotFound;
        }

        let code = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned());

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => StoreError::AlreadyExists,
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => StoreError::TransientConflict,
            _ => StoreError::Storage(err),
        }
    }
}
