//! Workflow server domain - research workflows hosted on n8n

mod definition;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

pub use definition::*;

use crate::domain::DomainError;

/// REST API of the workflow server
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkflowServer: Send + Sync {
    async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>, DomainError>;

    /// Create a workflow and return its server-assigned id
    async fn create_workflow(&self, definition: &Value) -> Result<String, DomainError>;

    async fn delete_workflow(&self, id: &str) -> Result<(), DomainError>;

    /// Whether the server answers at its root URL
    async fn is_running(&self) -> bool;
}
