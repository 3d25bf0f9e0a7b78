//! Service layer owning the registry store.
//!
//! `RegistryService` wraps `BestiaryDb` and the pagination limits used by the
//! query methods. All repo methods are implemented as `impl RegistryService`.

use std::path::Path;

use bestiary_config::BestiaryConfig;
use bestiary_core::pagination::PageLimits;

use crate::BestiaryDb;
use crate::error::DatabaseError;
use crate::log::TransactionsLog;

/// Registry operations over one store.
///
/// Every mutation method follows this protocol:
/// 1. Check that the caller's transaction log was opened on this store
/// 2. Validate the input (no writes yet)
/// 3. Begin a storage transaction
/// 4. Execute SQL
/// 5. Log the operation under the caller's transaction log
/// 6. Commit, or roll back on any failure
pub struct RegistryService {
    db: BestiaryDb,
    limits: PageLimits,
}

impl RegistryService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = BestiaryDb::open_local(db_path).await?;
        Ok(Self::from_db(db, PageLimits::default()))
    }

    /// Create a service from loaded configuration.
    ///
    /// Creates the parent directory of a file-backed store if needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created or the
    /// database cannot be opened.
    pub async fn from_config(config: &BestiaryConfig) -> Result<Self, DatabaseError> {
        let path = config.database.path.as_str();
        if !config.database.is_in_memory() {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Other(anyhow::anyhow!(
                        "creating store directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        let db = BestiaryDb::open_local(path).await?;
        Ok(Self::from_db(db, config.pagination.limits()))
    }

    /// Create from an existing `BestiaryDb` (for testing).
    #[must_use]
    pub const fn from_db(db: BestiaryDb, limits: PageLimits) -> Self {
        Self { db, limits }
    }

    /// Access the underlying database.
    #[must_use]
    pub const fn db(&self) -> &BestiaryDb {
        &self.db
    }

    /// Pagination limits applied by the query methods.
    #[must_use]
    pub const fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Reject a transaction log opened on another store.
    ///
    /// Operations must land in the same storage transaction as the write
    /// they describe.
    pub(crate) fn check_log(&self, trxl: &TransactionsLog<'_>) -> Result<(), DatabaseError> {
        if std::ptr::eq(trxl.db(), self.db()) {
            Ok(())
        } else {
            Err(DatabaseError::InvalidState(format!(
                "transaction {} belongs to another store",
                trxl.tuid()
            )))
        }
    }
}
