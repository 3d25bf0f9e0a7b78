//! Project repository.
//!
//! Projects belong to one ecosystem and may hang under a parent project.
//! Deleting an ecosystem or a parent cascades to the projects below it.

use bestiary_core::entities::{Ecosystem, OperationArgs, Project};
use bestiary_core::enums::{EntityType, OpType};
use bestiary_core::errors::CoreError;
use bestiary_core::validation::{check_name, check_optional, check_optional_update};
use chrono::Utc;
use serde_json::Value;

use crate::BestiaryDb;
use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, is_foreign_key_violation, map_unique_violation,
    parse_datetime,
};
use crate::log::TransactionsLog;
use crate::service::RegistryService;
use crate::updates::project::ProjectUpdate;

pub(crate) const SELECT_COLS: &str =
    "id, name, title, ecosystem_id, parent_id, created_at, last_modified";

pub(crate) fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        title: get_opt_string(row, 2)?,
        ecosystem_id: row.get(3)?,
        parent_id: row.get::<Option<i64>>(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        last_modified: parse_datetime(&row.get::<String>(6)?)?,
    })
}

fn project_args(project: &Project) -> OperationArgs {
    let mut args = OperationArgs::new();
    args.insert("id".into(), project.id.into());
    args.insert("name".into(), project.name.as_str().into());
    args.insert("title".into(), project.title.as_deref().into());
    args.insert("ecosystem".into(), project.ecosystem_id.into());
    args.insert("parent_project".into(), project.parent_id.into());
    args
}

fn cannot_be_parent(name: &str) -> DatabaseError {
    CoreError::invalid(format!("Project '{name}' cannot be added as parent project")).into()
}

impl RegistryService {
    /// Add a project to `ecosystem`, optionally under `parent`.
    ///
    /// Logs an `ADD` targeting the project name. The args carry
    /// `parent_project` only when a parent was given.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidValue` for a bad field or a parent with the
    /// same name, `CoreError::AlreadyExists` when the name is taken, and
    /// `CoreError::NotFound` when the ecosystem or parent is gone.
    pub async fn add_project(
        &self,
        trxl: &TransactionsLog<'_>,
        ecosystem: &Ecosystem,
        name: &str,
        title: Option<&str>,
        parent: Option<&Project>,
    ) -> Result<Project, DatabaseError> {
        self.check_log(trxl)?;
        let name = check_name(Some(name))?;
        let title = check_optional("title", title)?;
        if parent.is_some_and(|p| p.name == name) {
            return Err(cannot_be_parent(name));
        }
        let parent_id = parent.map(|p| p.id);

        let now = Utc::now();
        let tx = self.db().begin().await?;
        let result = async {
            let inserted = self
                .db()
                .conn()
                .execute(
                    "INSERT INTO projects (name, title, ecosystem_id, parent_id, created_at, last_modified)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    libsql::params![
                        name,
                        title,
                        ecosystem.id,
                        parent_id,
                        format_datetime(&now),
                        format_datetime(&now)
                    ],
                )
                .await;
            if let Err(err) = inserted {
                if !is_foreign_key_violation(&err) {
                    return Err(map_unique_violation(err, EntityType::Project, name));
                }
                // Either reference may be the dangling one.
                self.find_ecosystem(ecosystem.id).await?;
                return Err(match parent_id {
                    Some(parent_id) => DatabaseError::from(CoreError::not_found_id(
                        EntityType::Project,
                        parent_id,
                    )),
                    None => DatabaseError::from(err),
                });
            }
            let id = self.db().conn().last_insert_rowid();

            let mut args = OperationArgs::new();
            args.insert("name".into(), name.into());
            args.insert("title".into(), title.into());
            args.insert("ecosystem".into(), ecosystem.id.into());
            if let Some(parent_id) = parent_id {
                args.insert("parent_project".into(), parent_id.into());
            }
            trxl.log_operation(OpType::Add, EntityType::Project.as_str(), name, args)
                .await?;

            Ok::<_, DatabaseError>(Project {
                id,
                name: name.to_string(),
                title: title.map(String::from),
                ecosystem_id: ecosystem.id,
                parent_id,
                created_at: now,
                last_modified: now,
            })
        }
        .await;

        BestiaryDb::finish(tx, result).await
    }

    /// Apply `update` to `project` and log an `UPDATE` with the resulting row.
    ///
    /// A new parent must exist and must not be the project itself or one of
    /// its descendants.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidValue` for a bad field or parent,
    /// `CoreError::AlreadyExists` when renaming onto a taken name, and
    /// `CoreError::NotFound` when the project or new parent is gone.
    pub async fn update_project(
        &self,
        trxl: &TransactionsLog<'_>,
        project: &Project,
        update: &ProjectUpdate,
    ) -> Result<Project, DatabaseError> {
        self.check_log(trxl)?;
        if update.is_empty() {
            return self.find_project(project.id).await;
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
        if let Some(parent_id) = update.parent_id {
            if let Some(parent_id) = parent_id {
                self.check_new_parent(project, parent_id).await?;
            }
            params.push(parent_id.map_or(libsql::Value::Null, Into::into));
            sets.push(format!("parent_id = ?{}", params.len()));
        }

        let now = Utc::now();
        params.push(format_datetime(&now).into());
        sets.push(format!("last_modified = ?{}", params.len()));
        params.push(project.id.into());
        let sql = format!(
            "UPDATE projects SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        let eid = update.name.as_deref().unwrap_or(&project.name);

        let tx = self.db().begin().await?;
        let result = async {
            let affected = self
                .db()
                .conn()
                .execute(&sql, libsql::params_from_iter(params))
                .await
                .map_err(|e| map_unique_violation(e, EntityType::Project, eid))?;
            if affected == 0 {
                return Err(DatabaseError::from(CoreError::not_found_id(
                    EntityType::Project,
                    project.id,
                )));
            }

            let updated = self.find_project(project.id).await?;
            trxl.log_operation(
                OpType::Update,
                EntityType::Project.as_str(),
                &project.id.to_string(),
                project_args(&updated),
            )
            .await?;
            Ok::<_, DatabaseError>(updated)
        }
        .await;

        BestiaryDb::finish(tx, result).await
    }

    /// Delete `project` and, by cascade, its child projects.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` when the project no longer exists.
    pub async fn delete_project(
        &self,
        trxl: &TransactionsLog<'_>,
        project: &Project,
    ) -> Result<(), DatabaseError> {
        self.check_log(trxl)?;
        let tx = self.db().begin().await?;
        let result = async {
            let affected = self
                .db()
                .conn()
                .execute("DELETE FROM projects WHERE id = ?1", [project.id])
                .await?;
            if affected == 0 {
                return Err(DatabaseError::from(CoreError::not_found_id(
                    EntityType::Project,
                    project.id,
                )));
            }

            let mut args = OperationArgs::new();
            args.insert("id".into(), Value::from(project.id));
            trxl.log_operation(
                OpType::Delete,
                EntityType::Project.as_str(),
                &project.id.to_string(),
                args,
            )
            .await?;
            Ok::<_, DatabaseError>(())
        }
        .await;

        BestiaryDb::finish(tx, result).await
    }

    /// Look up a project by id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` when no project has that id.
    pub async fn find_project(&self, id: i64) -> Result<Project, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM projects WHERE id = ?1"), [id])
            .await?;
        match rows.next().await? {
            Some(row) => row_to_project(&row),
            None => Err(CoreError::not_found_id(EntityType::Project, id).into()),
        }
    }

    /// Look up a project by its unique name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` when no project has that name.
    pub async fn find_project_by_name(&self, name: &str) -> Result<Project, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM projects WHERE name = ?1"), [name])
            .await?;
        match rows.next().await? {
            Some(row) => row_to_project(&row),
            None => Err(CoreError::not_found_name(EntityType::Project, name).into()),
        }
    }

    /// Reject a parent that is missing, is `project` itself, or sits below it.
    async fn check_new_parent(&self, project: &Project, parent_id: i64) -> Result<(), DatabaseError> {
        if parent_id == project.id {
            return Err(cannot_be_parent(&project.name));
        }
        let parent = self.find_project(parent_id).await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                "WITH RECURSIVE ancestors(id, parent_id) AS (
                     SELECT id, parent_id FROM projects WHERE id = ?1
                     UNION ALL
                     SELECT p.id, p.parent_id FROM projects p JOIN ancestors a ON p.id = a.parent_id
                 )
                 SELECT 1 FROM ancestors WHERE id = ?2 LIMIT 1",
                libsql::params![parent.id, project.id],
            )
            .await?;
        if rows.next().await?.is_some() {
            return Err(cannot_be_parent(&parent.name));
        }
        Ok(())
    }
}
