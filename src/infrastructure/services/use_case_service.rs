//! Use case service - topic tracking definitions inside a tenant namespace

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

use crate::domain::use_case::{queries, UseCase, UseCaseDraft};
use crate::domain::{Clock, DeploymentReport, DomainError, ItemOutcome, TenantId, WarehouseClient};

/// Trait for the use case service (for dynamic dispatch in AppState)
#[async_trait]
pub trait UseCaseServiceTrait: Send + Sync + Debug {
    /// Insert each draft as its own statement. Every draft is attempted.
    async fn deploy_use_cases(
        &self,
        tenant_id: &str,
        drafts: Vec<UseCaseDraft>,
    ) -> Result<DeploymentReport, DomainError>;

    /// Active use cases of a tenant
    async fn get_use_cases(&self, tenant_id: &str) -> Result<Vec<UseCase>, DomainError>;

    /// Soft delete
    async fn deactivate(&self, tenant_id: &str, use_case_id: &str) -> Result<(), DomainError>;
}

pub struct UseCaseService {
    warehouse: Arc<dyn WarehouseClient>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for UseCaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UseCaseService").finish()
    }
}

impl UseCaseService {
    pub fn new(warehouse: Arc<dyn WarehouseClient>, clock: Arc<dyn Clock>) -> Self {
        Self { warehouse, clock }
    }

    async fn deploy_one(
        &self,
        tenant: &TenantId,
        draft: UseCaseDraft,
        ordinal: usize,
    ) -> Result<String, (String, DomainError)> {
        let fallback = draft
            .use_case_id
            .clone()
            .or_else(|| draft.use_case.clone())
            .unwrap_or_else(|| format!("#{}", ordinal));

        let use_case =
            UseCase::from_draft(draft, ordinal, self.clock.now()).map_err(|e| (fallback, e))?;
        let id = use_case.use_case_id.clone();

        let statement = queries::insert_use_case(tenant, &use_case).map_err(|e| (id.clone(), e))?;
        self.warehouse
            .execute(&statement)
            .await
            .map_err(|e| (id.clone(), e))?;

        Ok(id)
    }
}

#[async_trait]
impl UseCaseServiceTrait for UseCaseService {
    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    async fn deploy_use_cases(
        &self,
        tenant_id: &str,
        drafts: Vec<UseCaseDraft>,
    ) -> Result<DeploymentReport, DomainError> {
        let tenant = TenantId::new(tenant_id)?;
        let mut report = DeploymentReport::new();

        for (ordinal, draft) in drafts.into_iter().enumerate() {
            match self.deploy_one(&tenant, draft, ordinal).await {
                Ok(id) => {
                    info!(tenant_id = %tenant, use_case_id = %id, "Use case deployed");
                    report.push(ItemOutcome::ok(ordinal, id));
                }
                Err((id, e)) => {
                    error!(tenant_id = %tenant, use_case_id = %id, error = %e, "Use case deployment failed");
                    report.push(ItemOutcome::failed(ordinal, id, e.to_string()));
                }
            }
        }

        info!(
            tenant_id = %tenant,
            succeeded = report.succeeded_count(),
            attempted = report.attempted(),
            "Use case deployment finished"
        );
        Ok(report)
    }

    async fn get_use_cases(&self, tenant_id: &str) -> Result<Vec<UseCase>, DomainError> {
        let tenant = TenantId::new(tenant_id)?;
        let result = self
            .warehouse
            .execute(&queries::select_active_use_cases(&tenant))
            .await?;

        Ok(result
            .rows
            .iter()
            .filter_map(|row| match UseCase::from_row(row) {
                Ok(use_case) => Some(use_case),
                Err(e) => {
                    warn!(
                        tenant_id = %tenant,
                        use_case_id = row.get_str(0).unwrap_or_default(),
                        error = %e,
                        "Skipping unreadable use case row"
                    );
                    None
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, tenant_id: &str, use_case_id: &str) -> Result<(), DomainError> {
        let tenant = TenantId::new(tenant_id)?;
        let result = self
            .warehouse
            .execute(&queries::deactivate_use_case(&tenant, use_case_id))
            .await?;

        // Dry runs return no rows at all, so only a reported zero counts as missing
        if !result.rows.is_empty() && result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Use case '{}' not found for tenant '{}'",
                use_case_id, tenant
            )));
        }

        info!(tenant_id = %tenant, use_case_id, "Use case deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::warehouse::{MockWarehouseClient, Row, SqlValue};
    use crate::domain::{FixedClock, QueryResult, Statement};
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(),
        ))
    }

    fn service(mock: MockWarehouseClient) -> UseCaseService {
        UseCaseService::new(Arc::new(mock), clock())
    }

    fn complaints() -> UseCaseDraft {
        UseCaseDraft::new("Customer Complaints")
            .with_topics(["refund request", "billing issue"])
            .with_confidence_threshold(0.8)
    }

    /// Replays inserted rows the way the warehouse would return them
    fn stored_row(statement: &Statement) -> Row {
        let cell = |v: &SqlValue| v.to_wire();
        Row::new(statement.bindings.iter().map(cell).collect())
    }

    fn use_case_row(id: &str, topics: &str) -> Row {
        Row::new(vec![
            Some(id.to_string()),
            Some(format!("Use case {}", id)),
            Some(String::new()),
            Some(topics.to_string()),
            Some(String::new()),
            Some("0.8".to_string()),
            Some("true".to_string()),
        ])
    }

    #[tokio::test]
    async fn test_malformed_topics_row_is_skipped() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute().times(1).returning(|_| {
            Ok(QueryResult::with_rows(
                vec![],
                vec![
                    use_case_row("UC_1", r#"["a","b"]"#),
                    use_case_row("UC_2", "[not json"),
                    use_case_row("UC_3", r#"["c"]"#),
                ],
            ))
        });

        let use_cases = service(mock).get_use_cases("TEST001").await.unwrap();

        let ids: Vec<&str> = use_cases.iter().map(|u| u.use_case_id.as_str()).collect();
        assert_eq!(ids, vec!["UC_1", "UC_3"]);
        assert_eq!(use_cases[0].topics_to_track, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_deploy_and_read_back() {
        let inserted: Arc<Mutex<Vec<Statement>>> = Arc::default();
        let captured = inserted.clone();

        let mut mock = MockWarehouseClient::new();
        mock.expect_execute()
            .withf(|s| s.sql.starts_with("INSERT INTO CUSTOMER_TEST001.USE_CASES"))
            .times(1)
            .returning(move |s| {
                captured.lock().unwrap().push(s.clone());
                Ok(QueryResult::empty())
            });
        let replay = inserted.clone();
        mock.expect_execute()
            .withf(|s| s.sql.starts_with("SELECT"))
            .times(1)
            .returning(move |_| {
                let rows = replay.lock().unwrap().iter().map(stored_row).collect();
                Ok(QueryResult::with_rows(vec![], rows))
            });

        let service = service(mock);
        let report = service
            .deploy_use_cases("TEST001", vec![complaints()])
            .await
            .unwrap();

        assert!(report.succeeded());
        assert_eq!(report.outcomes[0].item, "UC_20240610_090000_000");

        let use_cases = service.get_use_cases("TEST001").await.unwrap();
        assert_eq!(use_cases.len(), 1);
        assert_eq!(use_cases[0].use_case_name, "Customer Complaints");
        assert_eq!(
            use_cases[0].topics_to_track,
            vec!["refund request", "billing issue"]
        );
        assert_eq!(use_cases[0].confidence_threshold, 0.8);
        assert!(use_cases[0].is_active);
    }

    #[tokio::test]
    async fn test_topic_order_survives_round_trip() {
        let inserted: Arc<Mutex<Vec<Statement>>> = Arc::default();
        let captured = inserted.clone();
        let replay = inserted.clone();

        let mut mock = MockWarehouseClient::new();
        mock.expect_execute()
            .withf(|s| s.sql.starts_with("INSERT"))
            .returning(move |s| {
                captured.lock().unwrap().push(s.clone());
                Ok(QueryResult::empty())
            });
        mock.expect_execute()
            .withf(|s| s.sql.starts_with("SELECT"))
            .returning(move |_| {
                let rows = replay.lock().unwrap().iter().map(stored_row).collect();
                Ok(QueryResult::with_rows(vec![], rows))
            });

        let service = service(mock);
        service
            .deploy_use_cases(
                "TEST001",
                vec![UseCaseDraft::new("Ordered").with_topics(["a", "b"])],
            )
            .await
            .unwrap();

        let use_cases = service.get_use_cases("TEST001").await.unwrap();
        assert_eq!(use_cases[0].topics_to_track, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_every_draft_attempted() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute()
            .withf(|s| s.label == "insert UC_B")
            .times(1)
            .returning(|_| Err(DomainError::warehouse("Insufficient privileges")));
        mock.expect_execute()
            .times(2)
            .returning(|_| Ok(QueryResult::empty()));

        let drafts = vec![
            UseCaseDraft::new("A").with_id("UC_A"),
            UseCaseDraft::new("B").with_id("UC_B"),
            UseCaseDraft::new("C").with_id("UC_C"),
        ];
        let report = service(mock)
            .deploy_use_cases("TEST001", drafts)
            .await
            .unwrap();

        assert_eq!(report.attempted(), 3);
        assert!(!report.succeeded());
        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].item, "UC_B");
        assert_eq!(failed[0].index, 1);
    }

    #[tokio::test]
    async fn test_invalid_draft_reported_without_insert() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(QueryResult::empty()));

        let drafts = vec![
            UseCaseDraft::new("Too sure").with_confidence_threshold(1.5),
            UseCaseDraft::new("Fine"),
        ];
        let report = service(mock)
            .deploy_use_cases("TEST001", drafts)
            .await
            .unwrap();

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.failed()[0].item, "Too sure");
        assert_eq!(report.outcomes[1].item, "UC_20240610_090000_001");
    }

    #[tokio::test]
    async fn test_invalid_tenant_rejected() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute().times(0);

        let err = service(mock)
            .deploy_use_cases("bad id", vec![complaints()])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidId { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_missing_use_case() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute().times(1).returning(|_| {
            Ok(QueryResult::with_rows(
                vec!["number of rows updated".to_string()],
                vec![Row::new(vec![Some("0".to_string())])],
            ))
        });

        let err = service(mock)
            .deactivate("TEST001", "UC_MISSING")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deactivate() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute()
            .withf(|s| s.bindings == vec![SqlValue::text("UC_1")])
            .times(1)
            .returning(|_| {
                Ok(QueryResult::with_rows(
                    vec!["number of rows updated".to_string()],
                    vec![Row::new(vec![Some("1".to_string())])],
                ))
            });

        service(mock).deactivate("TEST001", "UC_1").await.unwrap();
    }
}
