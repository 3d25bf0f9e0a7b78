//! Filtered, paginated listings for read access.
//!
//! Every listing counts the matching rows first, resolves the requested page
//! against that total, then fetches one `LIMIT`/`OFFSET` slice.

use bestiary_core::entities::{Ecosystem, Operation, Project, Transaction};
use bestiary_core::enums::OpType;
use bestiary_core::pagination::{Page, PageRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;
use crate::helpers::format_datetime;
use crate::repos::ecosystem::{self, row_to_ecosystem};
use crate::repos::project::{self, row_to_project};
use crate::repos::transaction::{OP_COLS, TRX_COLS, row_to_operation, row_to_transaction};
use crate::service::RegistryService;

/// Filter criteria for transaction listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub tuid: Option<String>,
    pub name: Option<String>,
    /// Only transactions created at or after this instant.
    pub from_date: Option<DateTime<Utc>>,
    pub authored_by: Option<String>,
}

/// Filter criteria for operation listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFilter {
    pub op_type: Option<OpType>,
    pub entity_type: Option<String>,
    /// Only operations timestamped at or after this instant.
    pub from_date: Option<DateTime<Utc>>,
    /// Only operations of the transaction with this token.
    pub tuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub ecosystem_id: Option<i64>,
    pub parent_id: Option<i64>,
}

/// WHERE clauses with positional parameters.
#[derive(Default)]
struct Conditions {
    clauses: Vec<String>,
    params: Vec<libsql::Value>,
}

impl Conditions {
    /// Add `clause`, whose single `?` is bound to `value`.
    fn push(&mut self, clause: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        self.clauses
            .push(clause.replace('?', &format!("?{}", self.params.len())));
    }

    fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }
}

impl RegistryService {
    /// List transactions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<Transaction>, DatabaseError> {
        let mut conds = Conditions::default();
        if let Some(ref tuid) = filter.tuid {
            conds.push("tuid = ?", tuid.as_str());
        }
        if let Some(ref name) = filter.name {
            conds.push("name = ?", name.as_str());
        }
        if let Some(ref from) = filter.from_date {
            conds.push("created_at >= ?", format_datetime(from));
        }
        if let Some(ref author) = filter.authored_by {
            conds.push("authored_by = ?", author.as_str());
        }

        self.paginate(
            "transactions",
            TRX_COLS,
            conds,
            "created_at, id",
            page,
            row_to_transaction,
        )
        .await
    }

    /// List operations, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn operations(
        &self,
        filter: &OperationFilter,
        page: PageRequest,
    ) -> Result<Page<Operation>, DatabaseError> {
        let mut conds = Conditions::default();
        if let Some(op_type) = filter.op_type {
            conds.push("op_type = ?", op_type.as_str());
        }
        if let Some(ref entity_type) = filter.entity_type {
            conds.push("entity_type = ?", entity_type.as_str());
        }
        if let Some(ref from) = filter.from_date {
            conds.push("timestamp >= ?", format_datetime(from));
        }
        if let Some(ref tuid) = filter.tuid {
            conds.push(
                "trx_id IN (SELECT id FROM transactions WHERE tuid = ?)",
                tuid.as_str(),
            );
        }

        self.paginate(
            "operations",
            OP_COLS,
            conds,
            "timestamp, id",
            page,
            row_to_operation,
        )
        .await
    }

    /// List ecosystems by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn ecosystems(
        &self,
        filter: &EcosystemFilter,
        page: PageRequest,
    ) -> Result<Page<Ecosystem>, DatabaseError> {
        let mut conds = Conditions::default();
        if let Some(id) = filter.id {
            conds.push("id = ?", id);
        }
        if let Some(ref name) = filter.name {
            conds.push("name = ?", name.as_str());
        }

        self.paginate(
            "ecosystems",
            ecosystem::SELECT_COLS,
            conds,
            "id",
            page,
            row_to_ecosystem,
        )
        .await
    }

    /// List projects by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn projects(
        &self,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> Result<Page<Project>, DatabaseError> {
        let mut conds = Conditions::default();
        if let Some(id) = filter.id {
            conds.push("id = ?", id);
        }
        if let Some(ref name) = filter.name {
            conds.push("name = ?", name.as_str());
        }
        if let Some(ecosystem_id) = filter.ecosystem_id {
            conds.push("ecosystem_id = ?", ecosystem_id);
        }
        if let Some(parent_id) = filter.parent_id {
            conds.push("parent_id = ?", parent_id);
        }

        self.paginate(
            "projects",
            project::SELECT_COLS,
            conds,
            "id",
            page,
            row_to_project,
        )
        .await
    }

    async fn paginate<T>(
        &self,
        table: &str,
        cols: &str,
        conds: Conditions,
        order_by: &str,
        page: PageRequest,
        row_fn: fn(&libsql::Row) -> Result<T, DatabaseError>,
    ) -> Result<Page<T>, DatabaseError> {
        let where_clause = conds.where_clause();

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT COUNT(*) FROM {table} {where_clause}"),
                libsql::params_from_iter(conds.params.clone()),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0)?;
        let total = u64::try_from(count)
            .map_err(|e| DatabaseError::InvalidState(format!("row count {count}: {e}")))?;

        let page_info = page.resolve(self.limits(), total);
        if total == 0 {
            return Ok(Page {
                entities: Vec::new(),
                page_info,
            });
        }

        let sql = format!(
            "SELECT {cols} FROM {table} {where_clause}
             ORDER BY {order_by} LIMIT {} OFFSET {}",
            page_info.page_size,
            page_info.offset()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conds.params))
            .await?;

        let mut entities = Vec::new();
        while let Some(row) = rows.next().await? {
            entities.push(row_fn(&row)?);
        }
        Ok(Page {
            entities,
            page_info,
        })
    }
}
