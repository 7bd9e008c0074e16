use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::domain::warehouse::{QueryResult, Statement, WarehouseClient};
use crate::domain::DomainError;

/// Warehouse stand-in that records statements instead of sending them.
/// Every statement succeeds with an empty result.
#[derive(Debug, Default)]
pub struct DryRunWarehouse {
    executed: Mutex<Vec<Statement>>,
}

impl DryRunWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements recorded so far, in execution order
    pub fn executed(&self) -> Vec<Statement> {
        self.executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl WarehouseClient for DryRunWarehouse {
    async fn execute(&self, statement: &Statement) -> Result<QueryResult, DomainError> {
        info!(
            label = %statement.label,
            bindings = statement.bindings.len(),
            "[dry-run] {}",
            statement.summary()
        );

        self.executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(statement.clone());

        Ok(QueryResult::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let warehouse = DryRunWarehouse::new();

        warehouse.execute(&Statement::new("a", "SELECT 1")).await.unwrap();
        warehouse
            .execute(&Statement::new("b", "SELECT ?").bind("x"))
            .await
            .unwrap();

        let labels: Vec<_> = warehouse.executed().into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }
}
