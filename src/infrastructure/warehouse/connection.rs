use async_trait::async_trait;
use tracing::{info, warn};

use super::SessionCache;
use crate::domain::warehouse::{
    QueryResult, SessionContext, Statement, WarehouseClient, SESSION_CONTEXT_QUERY,
};
use crate::domain::{Clock, DomainError};

/// A warehouse client plus the session metadata resolved through it
///
/// The session context is looked up before the first statement and again
/// whenever the cached copy has expired or was invalidated. An authentication
/// failure invalidates the cache so the next statement re-resolves it.
#[derive(Debug)]
pub struct WarehouseConnection<W: WarehouseClient, C: Clock> {
    client: W,
    cache: SessionCache<C>,
}

impl<W: WarehouseClient, C: Clock> WarehouseConnection<W, C> {
    pub fn new(client: W, cache: SessionCache<C>) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &W {
        &self.client
    }

    pub fn cache(&self) -> &SessionCache<C> {
        &self.cache
    }

    pub async fn session_context(&self) -> Result<SessionContext, DomainError> {
        if let Some(context) = self.cache.get() {
            return Ok(context);
        }

        let statement = Statement::new("session context", SESSION_CONTEXT_QUERY);
        let result = self.run(&statement).await?;
        let context = result
            .rows
            .first()
            .map(SessionContext::from_row)
            .unwrap_or_default();

        info!(
            user = context.user.as_deref().unwrap_or("-"),
            role = context.role.as_deref().unwrap_or("-"),
            warehouse = context.warehouse.as_deref().unwrap_or("-"),
            database = context.database.as_deref().unwrap_or("-"),
            "Warehouse session established"
        );

        self.cache.store(context.clone());
        Ok(context)
    }

    async fn run(&self, statement: &Statement) -> Result<QueryResult, DomainError> {
        match self.client.execute(statement).await {
            Err(err @ DomainError::Unauthorized { .. }) => {
                warn!(label = %statement.label, "Authentication failed, dropping cached session");
                self.cache.invalidate();
                Err(err)
            }
            other => other,
        }
    }
}

#[async_trait]
impl<W: WarehouseClient, C: Clock> WarehouseClient for WarehouseConnection<W, C> {
    async fn execute(&self, statement: &Statement) -> Result<QueryResult, DomainError> {
        self.session_context().await?;
        self.run(statement).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::warehouse::{MockWarehouseClient, Row};
    use crate::domain::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    fn session_row() -> QueryResult {
        QueryResult::with_rows(
            vec![],
            vec![Row::new(vec![
                Some("ANALYST".to_string()),
                Some("ACCOUNTADMIN".to_string()),
                Some("COMPUTE_WH".to_string()),
                Some("CALL_CENTER_ANALYTICS".to_string()),
                None,
            ])],
        )
    }

    fn cache() -> SessionCache<FixedClock> {
        let start = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        SessionCache::new(FixedClock::new(start), Duration::hours(8))
    }

    #[tokio::test]
    async fn test_resolves_session_once() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute()
            .withf(|s| s.sql == SESSION_CONTEXT_QUERY)
            .times(1)
            .returning(|_| Ok(session_row()));
        mock.expect_execute()
            .withf(|s| s.sql == "SELECT 1")
            .times(2)
            .returning(|_| Ok(QueryResult::empty()));

        let connection = WarehouseConnection::new(mock, cache());
        connection.execute(&Statement::new("a", "SELECT 1")).await.unwrap();
        connection.execute(&Statement::new("b", "SELECT 1")).await.unwrap();

        let context = connection.cache().get().unwrap();
        assert_eq!(context.warehouse.as_deref(), Some("COMPUTE_WH"));
    }

    #[tokio::test]
    async fn test_re_resolves_after_expiry() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute()
            .withf(|s| s.sql == SESSION_CONTEXT_QUERY)
            .times(2)
            .returning(|_| Ok(session_row()));
        mock.expect_execute()
            .withf(|s| s.sql == "SELECT 1")
            .times(2)
            .returning(|_| Ok(QueryResult::empty()));

        let connection = WarehouseConnection::new(mock, cache());
        connection.execute(&Statement::new("a", "SELECT 1")).await.unwrap();
        connection.cache().clock().advance(Duration::hours(9));
        connection.execute(&Statement::new("b", "SELECT 1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_unauthorized_invalidates_cache() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute()
            .withf(|s| s.sql == SESSION_CONTEXT_QUERY)
            .times(1)
            .returning(|_| Ok(session_row()));
        mock.expect_execute()
            .withf(|s| s.sql == "SELECT 1")
            .times(1)
            .returning(|_| Err(DomainError::unauthorized("token expired")));

        let connection = WarehouseConnection::new(mock, cache());
        let err = connection
            .execute(&Statement::new("a", "SELECT 1"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Unauthorized { .. }));
        assert!(connection.cache().get().is_none());
    }

    #[tokio::test]
    async fn test_session_failure_propagates() {
        let mut mock = MockWarehouseClient::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Err(DomainError::transport("Cannot connect")));

        let connection = WarehouseConnection::new(mock, cache());
        let err = connection
            .execute(&Statement::new("a", "SELECT 1"))
            .await
            .unwrap_err();

        assert!(err.is_transport());
    }
}
