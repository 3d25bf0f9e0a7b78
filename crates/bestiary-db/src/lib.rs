//! # bestiary-db
//!
//! libSQL storage for the Bestiary registry.
//!
//! Holds the ecosystem and project tables together with the transaction log
//! that audits every change made to them. Each registry mutation and the
//! operation it logs are written in a single libSQL transaction, so the log
//! never records a change that did not happen and never misses one that did.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) in local mode.

pub mod api;
pub mod error;
pub mod helpers;
pub mod input;
pub mod log;
mod migrations;
pub mod query;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for the registry store.
pub struct BestiaryDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl BestiaryDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Foreign keys are per-connection in SQLite; cascades depend on them.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let bestiary_db = Self { db, conn };
        bestiary_db.run_migrations().await?;
        tracing::debug!(path, "registry store opened");
        Ok(bestiary_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Start a storage transaction on the shared connection.
    pub(crate) async fn begin(&self) -> Result<libsql::Transaction, DatabaseError> {
        Ok(self.conn.transaction().await?)
    }

    /// Commit `tx` if `result` is `Ok`, roll it back otherwise.
    ///
    /// The body's error wins over a rollback failure.
    pub(crate) async fn finish<T>(
        tx: libsql::Transaction,
        result: Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, "rolling back registry write");
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Number of rows in `table`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_rows(&self, table: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0)?;
        u64::try_from(count).map_err(|e| DatabaseError::InvalidState(format!("row count {count}: {e}")))
    }
}
