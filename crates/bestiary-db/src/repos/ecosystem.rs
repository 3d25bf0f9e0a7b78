//! Ecosystem repository: audited add, update, delete, and lookups.

use bestiary_core::entities::{Ecosystem, OperationArgs};
use bestiary_core::enums::{EntityType, OpType};
use bestiary_core::errors::CoreError;
use bestiary_core::validation::{check_name, check_optional, check_optional_update};
use chrono::Utc;
use serde_json::Value;

use crate::BestiaryDb;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, map_unique_violation, parse_datetime};
use crate::log::TransactionsLog;
use crate::service::RegistryService;
use crate::updates::ecosystem::EcosystemUpdate;

pub(crate) const SELECT_COLS: &str = "id, name, title, description, created_at, last_modified";

pub(crate) fn row_to_ecosystem(row: &libsql::Row) -> Result<Ecosystem, DatabaseError> {
    Ok(Ecosystem {
        id: row.get(0)?,
        name: row.get(1)?,
        title: get_opt_string(row, 2)?,
        description: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        last_modified: parse_datetime(&row.get::<String>(5)?)?,
    })
}

/// Logged state of an ecosystem after an update.
fn ecosystem_args(ecosystem: &Ecosystem) -> OperationArgs {
    let mut args = OperationArgs::new();
    args.insert("id".into(), ecosystem.id.into());
    args.insert("name".into(), ecosystem.name.as_str().into());
    args.insert("title".into(), ecosystem.title.as_deref().into());
    args.insert("description".into(), ecosystem.description.as_deref().into());
    args
}

impl RegistryService {
    /// Add a new ecosystem and log an `ADD` operation targeting its name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidValue` for a bad field and
    /// `CoreError::AlreadyExists` when the name is taken. Nothing is written
    /// in either case.
    pub async fn add_ecosystem(
        &self,
        trxl: &TransactionsLog<'_>,
        name: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Ecosystem, DatabaseError> {
        self.check_log(trxl)?;
        let name = check_name(Some(name))?;
        let title = check_optional("title", title)?;
        let description = check_optional("description", description)?;

        let now = Utc::now();
        let tx = self.db().begin().await?;
        let result = async {
            self.db()
                .conn()
                .execute(
                    "INSERT INTO ecosystems (name, title, description, created_at, last_modified)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    libsql::params![
                        name,
                        title,
                        description,
                        format_datetime(&now),
                        format_datetime(&now)
                    ],
                )
                .await
                .map_err(|e| map_unique_violation(e, EntityType::Ecosystem, name))?;
            let id = self.db().conn().last_insert_rowid();

            let mut args = OperationArgs::new();
            args.insert("name".into(), name.into());
            args.insert("title".into(), title.into());
            args.insert("description".into(), description.into());
            trxl.log_operation(OpType::Add, EntityType::Ecosystem.as_str(), name, args)
                .await?;

            Ok::<_, DatabaseError>(Ecosystem {
                id,
                name: name.to_string(),
                title: title.map(String::from),
                description: description.map(String::from),
                created_at: now,
                last_modified: now,
            })
        }
        .await;

        BestiaryDb::finish(tx, result).await
    }

    /// Apply `update` to `ecosystem` and log an `UPDATE` with the resulting row.
    ///
    /// Empty `title` or `description` clear the field. An update that sets
    /// nothing writes and logs nothing.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidValue` for a bad field,
    /// `CoreError::AlreadyExists` when renaming onto a taken name, and
    /// `CoreError::NotFound` when the ecosystem no longer exists.
    pub async fn update_ecosystem(
        &self,
        trxl: &TransactionsLog<'_>,
        ecosystem: &Ecosystem,
        update: &EcosystemUpdate,
    ) -> Result<Ecosystem, DatabaseError> {
        self.check_log(trxl)?;
        if update.is_empty() {
            return self.find_ecosystem(ecosystem.id).await;
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref name) = update.name {
            params.push(check_name(Some(name.as_str()))?.into());
            sets.push(format!("name = ?{}", params.len()));
        }
        if let Some(ref title) = update.title {
            let title = check_optional_update("title", title.as_deref())?;
            params.push(title.map_or(libsql::Value::Null, Into::into));
            sets.push(format!("title = ?{}", params.len()));
        }
        if let Some(ref description) = update.description {
            let description = check_optional_update("description", description.as_deref())?;
            params.push(description.map_or(libsql::Value::Null, Into::into));
            sets.push(format!("description = ?{}", params.len()));
        }

        let now = Utc::now();
        params.push(format_datetime(&now).into());
        sets.push(format!("last_modified = ?{}", params.len()));
        params.push(ecosystem.id.into());
        let sql = format!(
            "UPDATE ecosystems SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        let eid = update.name.as_deref().unwrap_or(&ecosystem.name);

        let tx = self.db().begin().await?;
        let result = async {
            let affected = self
                .db()
                .conn()
                .execute(&sql, libsql::params_from_iter(params))
                .await
                .map_err(|e| map_unique_violation(e, EntityType::Ecosystem, eid))?;
            if affected == 0 {
                return Err(DatabaseError::from(CoreError::not_found_id(
                    EntityType::Ecosystem,
                    ecosystem.id,
                )));
            }

            let updated = self.find_ecosystem(ecosystem.id).await?;
            trxl.log_operation(
                OpType::Update,
                EntityType::Ecosystem.as_str(),
                &ecosystem.id.to_string(),
                ecosystem_args(&updated),
            )
            .await?;
            Ok::<_, DatabaseError>(updated)
        }
        .await;

        BestiaryDb::finish(tx, result).await
    }

    /// Delete `ecosystem` and, by cascade, all of its projects.
    ///
    /// Logs a single `DELETE` targeting the ecosystem id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` when the ecosystem no longer exists.
    pub async fn delete_ecosystem(
        &self,
        trxl: &TransactionsLog<'_>,
        ecosystem: &Ecosystem,
    ) -> Result<(), DatabaseError> {
        self.check_log(trxl)?;
        let tx = self.db().begin().await?;
        let result = async {
            let affected = self
                .db()
                .conn()
                .execute("DELETE FROM ecosystems WHERE id = ?1", [ecosystem.id])
                .await?;
            if affected == 0 {
                return Err(DatabaseError::from(CoreError::not_found_id(
                    EntityType::Ecosystem,
                    ecosystem.id,
                )));
            }

            let mut args = OperationArgs::new();
            args.insert("id".into(), Value::from(ecosystem.id));
            trxl.log_operation(
                OpType::Delete,
                EntityType::Ecosystem.as_str(),
                &ecosystem.id.to_string(),
                args,
            )
            .await?;
            Ok::<_, DatabaseError>(())
        }
        .await;

        BestiaryDb::finish(tx, result).await
    }

    /// Look up an ecosystem by id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound`, e.g. `Ecosystem ID 2 not found in the registry`.
    pub async fn find_ecosystem(&self, id: i64) -> Result<Ecosystem, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM ecosystems WHERE id = ?1"), [id])
            .await?;
        match rows.next().await? {
            Some(row) => row_to_ecosystem(&row),
            None => Err(CoreError::not_found_id(EntityType::Ecosystem, id).into()),
        }
    }

    /// Look up an ecosystem by its unique name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` when no ecosystem has that name.
    pub async fn find_ecosystem_by_name(&self, name: &str) -> Result<Ecosystem, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM ecosystems WHERE name = ?1"), [name])
            .await?;
        match rows.next().await? {
            Some(row) => row_to_ecosystem(&row),
            None => Err(CoreError::not_found_name(EntityType::Ecosystem, name).into()),
        }
    }
}
