//! Transaction log.
//!
//! A [`TransactionsLog`] groups the operations performed by one caller-level
//! action. Opening it writes a `transactions` row; every registry mutation
//! made through it appends an `operations` row; closing it stamps
//! `closed_at`. Open and close are committed immediately, so an action that
//! fails half-way still leaves a closed transaction with only the operations
//! that actually succeeded.
//!
//! Prefer [`TransactionsLog::scoped`], which closes the log on every exit path.

use bestiary_core::entities::{Operation, OperationArgs, Transaction};
use bestiary_core::enums::OpType;
use bestiary_core::identity::BestiaryContext;
use bestiary_core::ids::{new_ouid, new_tuid};
use chrono::{DateTime, Utc};

use crate::BestiaryDb;
use crate::error::DatabaseError;
use crate::helpers::{encode_args, format_datetime};

/// Handle on an open transaction.
pub struct TransactionsLog<'a> {
    db: &'a BestiaryDb,
    trx: Transaction,
    closed: bool,
}

impl<'a> TransactionsLog<'a> {
    /// Open a new transaction named `name`, authored by the context's user.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the transaction row cannot be written.
    pub async fn open(
        db: &'a BestiaryDb,
        name: &str,
        ctx: &BestiaryContext,
    ) -> Result<Self, DatabaseError> {
        let now = Utc::now();
        let tuid = new_tuid();
        let authored_by = ctx.authored_by();

        db.conn()
            .execute(
                "INSERT INTO transactions (tuid, name, created_at, closed_at, is_closed, authored_by)
                 VALUES (?1, ?2, ?3, NULL, 0, ?4)",
                libsql::params![tuid.as_str(), name, format_datetime(&now), authored_by],
            )
            .await?;
        let id = db.conn().last_insert_rowid();

        tracing::debug!(%tuid, trx_name = name, authored_by, "transaction opened");

        Ok(Self {
            db,
            trx: Transaction {
                id,
                tuid,
                name: name.to_string(),
                created_at: now,
                closed_at: None,
                is_closed: false,
                authored_by: authored_by.to_string(),
            },
            closed: false,
        })
    }

    /// Open a transaction, run `body` with it, and close it however `body` ends.
    ///
    /// The body's error is returned in preference to a close failure.
    ///
    /// Closing happens when the body returns. A caller that drops the
    /// returned future before then, e.g. on a `tokio::time::timeout`, leaves
    /// the transaction open: `closed_at` stays NULL and only a debug event is
    /// emitted. Any storage write the body had started is rolled back with
    /// its libSQL transaction, so no operation is recorded without its write.
    ///
    /// # Errors
    ///
    /// Returns the error of `body`, or of opening or closing the transaction.
    pub async fn scoped<T, F>(
        db: &'a BestiaryDb,
        name: &str,
        ctx: &BestiaryContext,
        body: F,
    ) -> Result<T, DatabaseError>
    where
        F: AsyncFnOnce(&TransactionsLog<'a>) -> Result<T, DatabaseError>,
    {
        let trxl = Self::open(db, name, ctx).await?;
        let result = body(&trxl).await;
        let closed = trxl.close().await;

        match (result, closed) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(err), Ok(_)) => Err(err),
            (Err(err), Err(close_err)) => {
                tracing::warn!(error = %close_err, "closing transaction after failed action");
                Err(err)
            }
        }
    }

    /// Store the transaction lives in.
    pub(crate) const fn db(&self) -> &'a BestiaryDb {
        self.db
    }

    /// The transaction this handle writes to.
    #[must_use]
    pub const fn trx(&self) -> &Transaction {
        &self.trx
    }

    #[must_use]
    pub fn tuid(&self) -> &str {
        &self.trx.tuid
    }

    /// Record one operation, timestamped now.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the operation row cannot be written.
    pub async fn log_operation(
        &self,
        op_type: OpType,
        entity_type: &str,
        target: &str,
        args: OperationArgs,
    ) -> Result<Operation, DatabaseError> {
        self.log_operation_at(op_type, entity_type, target, args, Utc::now())
            .await
    }

    /// Record one operation with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the operation row cannot be written.
    pub async fn log_operation_at(
        &self,
        op_type: OpType,
        entity_type: &str,
        target: &str,
        args: OperationArgs,
        timestamp: DateTime<Utc>,
    ) -> Result<Operation, DatabaseError> {
        let ouid = new_ouid();
        self.db
            .conn()
            .execute(
                "INSERT INTO operations (ouid, trx_id, op_type, entity_type, target, timestamp, args)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    ouid.as_str(),
                    self.trx.id,
                    op_type.as_str(),
                    entity_type,
                    target,
                    format_datetime(&timestamp),
                    encode_args(&args)?
                ],
            )
            .await?;
        let id = self.db.conn().last_insert_rowid();

        tracing::debug!(tuid = %self.trx.tuid, %ouid, %op_type, entity_type, target, "operation logged");

        Ok(Operation {
            id,
            ouid,
            trx_id: self.trx.id,
            op_type,
            entity_type: entity_type.to_string(),
            target: target.to_string(),
            timestamp,
            args,
        })
    }

    /// Mark the transaction closed and return its final state.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the transaction row is gone,
    /// or a storage error if the update fails.
    pub async fn close(mut self) -> Result<Transaction, DatabaseError> {
        let now = Utc::now();
        let affected = self
            .db
            .conn()
            .execute(
                "UPDATE transactions SET closed_at = ?1, is_closed = 1 WHERE id = ?2",
                libsql::params![format_datetime(&now), self.trx.id],
            )
            .await?;

        // Even on failure, the handle is spent.
        self.closed = true;
        if affected == 0 {
            return Err(DatabaseError::InvalidState(format!(
                "transaction {} no longer exists",
                self.trx.tuid
            )));
        }

        self.trx.closed_at = Some(now);
        self.trx.is_closed = true;
        tracing::debug!(tuid = %self.trx.tuid, trx_name = %self.trx.name, "transaction closed");
        Ok(self.trx.clone())
    }
}

impl Drop for TransactionsLog<'_> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::debug!(
                tuid = %self.trx.tuid,
                trx_name = %self.trx.name,
                "transaction dropped while still open"
            );
        }
    }
}
