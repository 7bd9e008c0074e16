//! Workflow service - research workflows on the workflow server

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::domain::prompt::{get_prompt, get_prompt_or_default};
use crate::domain::{
    CreatedWorkflow, DomainError, ResearchWorkflowSpec, WorkflowServer, WorkflowSummary,
};

/// Request to create a research workflow
#[derive(Debug, Clone)]
pub struct CreateWorkflowRequest {
    pub name: String,
    pub company_name: String,
    /// Prompt name; the default prompt when absent or unknown
    pub prompt: Option<String>,
}

impl CreateWorkflowRequest {
    pub fn new(name: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company_name: company_name.into(),
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

/// Trait for the workflow service (for dynamic dispatch in AppState)
#[async_trait]
pub trait WorkflowServiceTrait: Send + Sync + Debug {
    async fn list(&self) -> Result<Vec<WorkflowSummary>, DomainError>;

    async fn create(&self, request: CreateWorkflowRequest) -> Result<CreatedWorkflow, DomainError>;

    async fn delete(&self, id: &str) -> Result<(), DomainError>;

    /// Whether the workflow server is reachable
    async fn is_running(&self) -> bool;
}

pub struct WorkflowService {
    server: Arc<dyn WorkflowServer>,
}

impl std::fmt::Debug for WorkflowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowService").finish()
    }
}

impl WorkflowService {
    pub fn new(server: Arc<dyn WorkflowServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl WorkflowServiceTrait for WorkflowService {
    async fn list(&self) -> Result<Vec<WorkflowSummary>, DomainError> {
        self.server.list_workflows().await
    }

    #[instrument(skip(self), fields(name = %request.name, company = %request.company_name))]
    async fn create(&self, request: CreateWorkflowRequest) -> Result<CreatedWorkflow, DomainError> {
        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Workflow name cannot be empty"));
        }
        if request.company_name.trim().is_empty() {
            return Err(DomainError::validation("Company name cannot be empty"));
        }

        let prompt_name = request.prompt.as_deref().unwrap_or_default();
        if !prompt_name.is_empty() && get_prompt(prompt_name).is_none() {
            warn!(prompt = prompt_name, "Unknown prompt, using the default");
        }
        let prompt = get_prompt_or_default(prompt_name);

        let spec = ResearchWorkflowSpec::new(request.name.trim(), request.company_name.trim());
        let definition = spec
            .build(prompt)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let id = self.server.create_workflow(&definition).await?;
        info!(workflow_id = %id, prompt = prompt.name, "Research workflow created");

        Ok(CreatedWorkflow {
            id,
            name: spec.name.clone(),
            webhook_path: spec.webhook_path(),
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.server.delete_workflow(id).await
    }

    async fn is_running(&self) -> bool {
        self.server.is_running().await
    }
}
