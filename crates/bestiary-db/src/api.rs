//! Context-level registry actions.
//!
//! Each action opens a transaction named after itself, authored by the
//! caller in `ctx`, runs one registry operation, and closes the transaction
//! whether the operation succeeded or not.

use bestiary_core::entities::{Ecosystem, Project};
use bestiary_core::identity::BestiaryContext;

use crate::error::DatabaseError;
use crate::input::{EcosystemInput, ProjectInput};
use crate::log::TransactionsLog;
use crate::service::RegistryService;
use crate::updates::ecosystem::EcosystemUpdate;
use crate::updates::project::ProjectUpdate;

/// Add an ecosystem.
///
/// # Errors
///
/// Returns the validation, uniqueness or storage error of the operation.
pub async fn add_ecosystem(
    svc: &RegistryService,
    ctx: &BestiaryContext,
    input: &EcosystemInput,
) -> Result<Ecosystem, DatabaseError> {
    TransactionsLog::scoped(svc.db(), "add_ecosystem", ctx, async |trxl| {
        svc.add_ecosystem(
            trxl,
            &input.name,
            input.title.as_deref(),
            input.description.as_deref(),
        )
        .await
    })
    .await
}

/// Update the ecosystem with id `id`.
///
/// # Errors
///
/// Returns `CoreError::NotFound` for an unknown id, or the error of the update.
pub async fn update_ecosystem(
    svc: &RegistryService,
    ctx: &BestiaryContext,
    id: i64,
    update: &EcosystemUpdate,
) -> Result<Ecosystem, DatabaseError> {
    TransactionsLog::scoped(svc.db(), "update_ecosystem", ctx, async |trxl| {
        let ecosystem = svc.find_ecosystem(id).await?;
        svc.update_ecosystem(trxl, &ecosystem, update).await
    })
    .await
}

/// Delete the ecosystem with id `id` and return it as it was.
///
/// # Errors
///
/// Returns `CoreError::NotFound` for an unknown id.
pub async fn delete_ecosystem(
    svc: &RegistryService,
    ctx: &BestiaryContext,
    id: i64,
) -> Result<Ecosystem, DatabaseError> {
    TransactionsLog::scoped(svc.db(), "delete_ecosystem", ctx, async |trxl| {
        let ecosystem = svc.find_ecosystem(id).await?;
        svc.delete_ecosystem(trxl, &ecosystem).await?;
        Ok(ecosystem)
    })
    .await
}

/// Add a project to the ecosystem named by `input.ecosystem_id`.
///
/// # Errors
///
/// Returns `CoreError::NotFound` for an unknown ecosystem or parent, or the
/// error of the operation.
pub async fn add_project(
    svc: &RegistryService,
    ctx: &BestiaryContext,
    input: &ProjectInput,
) -> Result<Project, DatabaseError> {
    TransactionsLog::scoped(svc.db(), "add_project", ctx, async |trxl| {
        let ecosystem = svc.find_ecosystem(input.ecosystem_id).await?;
        let parent = match input.parent_id {
            Some(parent_id) => Some(svc.find_project(parent_id).await?),
            None => None,
        };
        svc.add_project(
            trxl,
            &ecosystem,
            &input.name,
            input.title.as_deref(),
            parent.as_ref(),
        )
        .await
    })
    .await
}

/// Update the project with id `id`.
///
/// # Errors
///
/// Returns `CoreError::NotFound` for an unknown id, or the error of the update.
pub async fn update_project(
    svc: &RegistryService,
    ctx: &BestiaryContext,
    id: i64,
    update: &ProjectUpdate,
) -> Result<Project, DatabaseError> {
    TransactionsLog::scoped(svc.db(), "update_project", ctx, async |trxl| {
        let project = svc.find_project(id).await?;
        svc.update_project(trxl, &project, update).await
    })
    .await
}

/// Delete the project with id `id` and return it as it was.
///
/// # Errors
///
/// Returns `CoreError::NotFound` for an unknown id.
pub async fn delete_project(
    svc: &RegistryService,
    ctx: &BestiaryContext,
    id: i64,
) -> Result<Project, DatabaseError> {
    TransactionsLog::scoped(svc.db(), "delete_project", ctx, async |trxl| {
        let project = svc.find_project(id).await?;
        svc.delete_project(trxl, &project).await?;
        Ok(project)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{count_rows, test_service};
    use bestiary_core::errors::CoreError;

    #[tokio::test]
    async fn failed_action_still_closes_its_transaction() {
        let svc = test_service().await;
        let ctx = BestiaryContext::new("test");

        let err = delete_ecosystem(&svc, &ctx, 2).await.unwrap_err();
        assert_eq!(err.to_string(), "Ecosystem ID 2 not found in the registry");

        let mut rows = svc
            .db()
            .conn()
            .query("SELECT name, is_closed FROM transactions", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "delete_ecosystem");
        assert_eq!(row.get::<i64>(1).unwrap(), 1);
        assert_eq!(count_rows(&svc, "operations").await, 0);
    }

    #[tokio::test]
    async fn add_project_needs_existing_parent() {
        let svc = test_service().await;
        let ctx = BestiaryContext::new("test");
        let eco = add_ecosystem(&svc, &ctx, &EcosystemInput::new("Example"))
            .await
            .unwrap();

        let err = add_project(&svc, &ctx, &ProjectInput::new(eco.id, "example").with_parent(42))
            .await
            .unwrap_err();

        assert_eq!(
            err.as_core(),
            Some(&CoreError::not_found_id(bestiary_core::enums::EntityType::Project, 42))
        );
        assert_eq!(count_rows(&svc, "projects").await, 0);
    }

    #[tokio::test]
    async fn delete_returns_entity_as_it_was() {
        let svc = test_service().await;
        let ctx = BestiaryContext::new("test");
        let eco = add_ecosystem(&svc, &ctx, &EcosystemInput::new("Example").with_title("T"))
            .await
            .unwrap();
        let prj = add_project(&svc, &ctx, &ProjectInput::new(eco.id, "example"))
            .await
            .unwrap();

        assert_eq!(delete_project(&svc, &ctx, prj.id).await.unwrap(), prj);
        assert_eq!(delete_ecosystem(&svc, &ctx, eco.id).await.unwrap(), eco);
    }
}
