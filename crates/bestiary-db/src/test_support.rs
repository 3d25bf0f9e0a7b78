//! Shared test utilities for bestiary-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use bestiary_core::identity::BestiaryContext;
    use bestiary_core::pagination::PageLimits;

    use crate::BestiaryDb;
    use crate::log::TransactionsLog;
    use crate::service::RegistryService;

    /// Create an in-memory `RegistryService` with default page limits.
    pub async fn test_service() -> RegistryService {
        let db = BestiaryDb::open_local(":memory:").await.unwrap();
        RegistryService::from_db(db, PageLimits::default())
    }

    /// Open a transaction authored by `test`.
    pub async fn open_trxl<'a>(svc: &'a RegistryService, name: &str) -> TransactionsLog<'a> {
        TransactionsLog::open(svc.db(), name, &BestiaryContext::new("test"))
            .await
            .unwrap()
    }

    pub async fn count_rows(svc: &RegistryService, table: &str) -> u64 {
        svc.db().count_rows(table).await.unwrap()
    }
}
