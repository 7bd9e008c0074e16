//! Application state for shared services

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::domain::{Clock, DomainError, PipelineSettings, SystemClock, WarehouseClient};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::research::{FileCampaignStore, WebhookResearchClient};
use crate::infrastructure::services::{
    OnboardingService, OnboardingServiceTrait, PipelineService, PipelineServiceTrait,
    ProvisioningService, ProvisioningServiceTrait, ResearchService, ResearchServiceTrait,
    UseCaseService, UseCaseServiceTrait, WorkflowService, WorkflowServiceTrait,
};
use crate::infrastructure::warehouse::build_warehouse;
use crate::infrastructure::workflow::N8nClient;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub provisioning_service: Arc<dyn ProvisioningServiceTrait>,
    pub use_case_service: Arc<dyn UseCaseServiceTrait>,
    pub pipeline_service: Arc<dyn PipelineServiceTrait>,
    pub onboarding_service: Arc<dyn OnboardingServiceTrait>,
    pub research_service: Arc<dyn ResearchServiceTrait>,
    pub workflow_service: Arc<dyn WorkflowServiceTrait>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

fn http_client(timeout_secs: u64) -> Result<HttpClient, DomainError> {
    HttpClient::with_timeout((timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)))
}

impl AppState {
    /// Wire every service from configuration against the wall clock
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let warehouse = build_warehouse(&config.warehouse, &config.session_cache, clock.clone())?;
        Self::with_warehouse(config, warehouse, clock)
    }

    /// Wire every service around an existing warehouse client
    pub fn with_warehouse(
        config: &AppConfig,
        warehouse: Arc<dyn WarehouseClient>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        let provisioning_service: Arc<dyn ProvisioningServiceTrait> = Arc::new(
            ProvisioningService::new(warehouse.clone(), config.warehouse.database.clone()),
        );
        let use_case_service: Arc<dyn UseCaseServiceTrait> =
            Arc::new(UseCaseService::new(warehouse.clone(), clock.clone()));
        let pipeline_service: Arc<dyn PipelineServiceTrait> = Arc::new(PipelineService::new(
            warehouse.clone(),
            clock.clone(),
            PipelineSettings::from(&config.pipeline),
        ));
        let onboarding_service = Arc::new(OnboardingService::new(
            provisioning_service.clone(),
            use_case_service.clone(),
            pipeline_service.clone(),
            warehouse,
        ));

        let research = &config.research;
        let research_service = Arc::new(ResearchService::new(
            Arc::new(WebhookResearchClient::new(
                http_client(research.timeout_secs)?,
                research.webhook_url.clone(),
            )),
            Arc::new(FileCampaignStore::new(&research.output_dir)),
            clock,
            research.source.clone(),
            research.default_campaign.clone(),
        ));

        let workflow = &config.workflow_server;
        let workflow_service = Arc::new(WorkflowService::new(Arc::new(N8nClient::new(
            http_client(workflow.timeout_secs)?,
            workflow.base_url.clone(),
            workflow.api_token.clone(),
        ))));

        Ok(Self {
            provisioning_service,
            use_case_service,
            pipeline_service,
            onboarding_service,
            research_service,
            workflow_service,
        })
    }
}
