//! Filtered, paginated listings over a seeded store.

use bestiary_config::BestiaryConfig;
use bestiary_core::enums::OpType;
use bestiary_core::identity::BestiaryContext;
use bestiary_core::pagination::{PageRequest, PaginationInfo};
use bestiary_db::api;
use bestiary_db::input::{EcosystemInput, ProjectInput};
use bestiary_db::query::{EcosystemFilter, OperationFilter, TransactionFilter};
use bestiary_db::service::RegistryService;
use chrono::Utc;
use pretty_assertions::assert_eq;

async fn seeded() -> RegistryService {
    let svc = RegistryService::new_local(":memory:").await.unwrap();
    let alice = BestiaryContext::new("alice");
    let bob = BestiaryContext::new("bob");

    let eco = api::add_ecosystem(&svc, &alice, &EcosystemInput::new("Example"))
        .await
        .unwrap();
    api::add_ecosystem(&svc, &bob, &EcosystemInput::new("Other"))
        .await
        .unwrap();
    api::add_project(&svc, &bob, &ProjectInput::new(eco.id, "example"))
        .await
        .unwrap();
    svc
}

#[tokio::test]
async fn first_page_of_three_transactions() {
    let svc = seeded().await;

    let page = svc
        .transactions(&TransactionFilter::default(), PageRequest::new(1, 2))
        .await
        .unwrap();

    assert_eq!(
        page.page_info,
        PaginationInfo {
            page: 1,
            page_size: 2,
            num_pages: 2,
            has_next: true,
            has_prev: false,
            start_index: 1,
            end_index: 2,
            total_results: 3,
        }
    );
    let names: Vec<_> = page.entities.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["add_ecosystem", "add_ecosystem"]);
}

#[tokio::test]
async fn page_size_alone_starts_at_first_page() {
    let svc = seeded().await;
    let page = svc
        .transactions(
            &TransactionFilter::default(),
            PageRequest {
                page: None,
                page_size: Some(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.page_info.page, 1);
    assert_eq!(page.entities.len(), 2);
}

#[tokio::test]
async fn page_alone_uses_default_size() {
    let svc = seeded().await;
    let page = svc
        .transactions(
            &TransactionFilter::default(),
            PageRequest {
                page: Some(1),
                page_size: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.page_info.page_size, 10);
    assert_eq!(page.page_info.num_pages, 1);
    assert_eq!(page.entities.len(), 3);
}

#[tokio::test]
async fn transactions_filter_by_author_and_name() {
    let svc = seeded().await;

    let bobs = svc
        .transactions(
            &TransactionFilter {
                authored_by: Some("bob".into()),
                ..TransactionFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(bobs.page_info.total_results, 2);

    let projects = svc
        .transactions(
            &TransactionFilter {
                name: Some("add_project".into()),
                ..TransactionFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(projects.entities.len(), 1);

    let by_tuid = svc
        .transactions(
            &TransactionFilter {
                tuid: Some(projects.entities[0].tuid.clone()),
                ..TransactionFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_tuid.entities, projects.entities);
}

#[tokio::test]
async fn from_date_excludes_older_rows() {
    let svc = seeded().await;
    let cutoff = Utc::now();
    api::add_ecosystem(&svc, &BestiaryContext::new("carol"), &EcosystemInput::new("Late"))
        .await
        .unwrap();

    let trxs = svc
        .transactions(
            &TransactionFilter {
                from_date: Some(cutoff),
                ..TransactionFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(trxs.entities.len(), 1);
    assert_eq!(trxs.entities[0].authored_by, "carol");

    let ops = svc
        .operations(
            &OperationFilter {
                from_date: Some(cutoff),
                ..OperationFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(ops.entities.len(), 1);
    assert_eq!(ops.entities[0].target, "Late");
}

#[tokio::test]
async fn operations_filter_by_type_and_transaction() {
    let svc = seeded().await;

    let project_ops = svc
        .operations(
            &OperationFilter {
                op_type: Some(OpType::Add),
                entity_type: Some("project".into()),
                ..OperationFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(project_ops.entities.len(), 1);
    assert_eq!(project_ops.entities[0].target, "example");
    assert_eq!(project_ops.entities[0].ouid.len(), 32);

    let first_trx = svc
        .transactions(&TransactionFilter::default(), PageRequest::new(1, 1))
        .await
        .unwrap()
        .entities
        .remove(0);
    let scoped = svc
        .operations(
            &OperationFilter {
                tuid: Some(first_trx.tuid.clone()),
                ..OperationFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(scoped.entities.len(), 1);
    assert_eq!(scoped.entities[0].trx_id, first_trx.id);
    assert_eq!(scoped.entities[0].target, "Example");
}

#[tokio::test]
async fn ecosystem_filter_by_id() {
    let svc = seeded().await;
    let other = svc.find_ecosystem_by_name("Other").await.unwrap();

    let page = svc
        .ecosystems(
            &EcosystemFilter {
                id: Some(other.id),
                ..EcosystemFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.entities, vec![other]);
}

#[tokio::test]
async fn configured_limits_clamp_page_size() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = BestiaryConfig::default();
    config.database.path = dir.path().join("registry.db").to_str().unwrap().to_string();
    config.pagination.default_page_size = 1;
    config.pagination.max_page_size = 2;

    let svc = RegistryService::from_config(&config).await.unwrap();
    for name in ["Alpha", "Beta", "Gamma"] {
        api::add_ecosystem(&svc, &BestiaryContext::new("test"), &EcosystemInput::new(name))
            .await
            .unwrap();
    }

    let default_page = svc
        .ecosystems(&EcosystemFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(default_page.entities.len(), 1);
    assert_eq!(default_page.page_info.num_pages, 3);

    let clamped = svc
        .ecosystems(&EcosystemFilter::default(), PageRequest::new(1, 50))
        .await
        .unwrap();
    assert_eq!(clamped.page_info.page_size, 2);
    assert_eq!(clamped.entities.len(), 2);
}
