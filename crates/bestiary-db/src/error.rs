//! Database error types for bestiary-db.

use bestiary_core::errors::CoreError;
use thiserror::Error;

/// Errors from registry and database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The call was refused by validation or a registry rule.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A SQL query failed or returned unreadable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered, e.g. a transaction log from another store.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// The domain error behind this failure, if any.
    #[must_use]
    pub const fn as_core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(err) => Some(err),
            _ => None,
        }
    }
}
