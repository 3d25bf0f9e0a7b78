//! Read side of the transaction log.

use bestiary_core::entities::{Operation, Transaction};
use bestiary_core::errors::CoreError;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_args, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::RegistryService;

pub(crate) const TRX_COLS: &str = "id, tuid, name, created_at, closed_at, is_closed, authored_by";

pub(crate) const OP_COLS: &str = "id, ouid, trx_id, op_type, entity_type, target, timestamp, args";

pub(crate) fn row_to_transaction(row: &libsql::Row) -> Result<Transaction, DatabaseError> {
    Ok(Transaction {
        id: row.get(0)?,
        tuid: row.get(1)?,
        name: row.get(2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        closed_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        is_closed: row.get::<i64>(5)? != 0,
        authored_by: row.get::<Option<String>>(6)?.unwrap_or_default(),
    })
}

pub(crate) fn row_to_operation(row: &libsql::Row) -> Result<Operation, DatabaseError> {
    Ok(Operation {
        id: row.get(0)?,
        ouid: row.get(1)?,
        trx_id: row.get(2)?,
        op_type: parse_enum(&row.get::<String>(3)?)?,
        entity_type: row.get(4)?,
        target: row.get(5)?,
        timestamp: parse_datetime(&row.get::<String>(6)?)?,
        args: parse_args(&row.get::<String>(7)?)?,
    })
}

impl RegistryService {
    /// Look up a transaction by its `tuid`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` when no transaction has that token.
    pub async fn find_transaction(&self, tuid: &str) -> Result<Transaction, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {TRX_COLS} FROM transactions WHERE tuid = ?1"), [tuid])
            .await?;
        match rows.next().await? {
            Some(row) => row_to_transaction(&row),
            None => Err(CoreError::NotFound {
                entity: format!("Transaction '{tuid}'"),
            }
            .into()),
        }
    }

    /// Operations recorded under `trx`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn transaction_operations(
        &self,
        trx: &Transaction,
    ) -> Result<Vec<Operation>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {OP_COLS} FROM operations WHERE trx_id = ?1 ORDER BY timestamp, id"),
                [trx.id],
            )
            .await?;

        let mut ops = Vec::new();
        while let Some(row) = rows.next().await? {
            ops.push(row_to_operation(&row)?);
        }
        Ok(ops)
    }
}
