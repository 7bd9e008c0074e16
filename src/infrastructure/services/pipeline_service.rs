//! Pipeline service - generation, deployment and re-drive of the per-tenant DAG

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::provisioning_service::execute_all;
use crate::config::PipelineConfig;
use crate::domain::pipeline::{redrive_failed, redrive_log};
use crate::domain::{
    Clock, DeploymentReport, DomainError, PipelineDefinition, PipelineSettings, TenantId,
    WarehouseClient,
};

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            warehouse: config.task_warehouse.clone(),
            schedule: config.schedule.clone(),
            classifier_model: config.classifier_model.clone(),
        }
    }
}

/// Trait for the pipeline service (for dynamic dispatch in AppState)
#[async_trait]
pub trait PipelineServiceTrait: Send + Sync + Debug {
    /// Build the DAG without touching the warehouse
    fn generate(&self, tenant_id: &str) -> Result<PipelineDefinition, DomainError>;

    /// Create and resume the three tasks, one statement at a time
    async fn deploy(&self, tenant_id: &str) -> Result<DeploymentReport, DomainError>;

    /// Move `FAILED` transcripts back to `PENDING`. Returns the number requeued.
    async fn redrive_failed(&self, tenant_id: &str) -> Result<u64, DomainError>;
}

pub struct PipelineService {
    warehouse: Arc<dyn WarehouseClient>,
    clock: Arc<dyn Clock>,
    settings: PipelineSettings,
}

impl std::fmt::Debug for PipelineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineService")
            .field("settings", &self.settings)
            .finish()
    }
}

impl PipelineService {
    pub fn new(
        warehouse: Arc<dyn WarehouseClient>,
        clock: Arc<dyn Clock>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            warehouse,
            clock,
            settings,
        }
    }
}

#[async_trait]
impl PipelineServiceTrait for PipelineService {
    fn generate(&self, tenant_id: &str) -> Result<PipelineDefinition, DomainError> {
        let tenant = TenantId::new(tenant_id)?;
        Ok(PipelineDefinition::generate(
            &tenant,
            &self.settings,
            self.clock.now(),
        ))
    }

    #[instrument(skip(self))]
    async fn deploy(&self, tenant_id: &str) -> Result<DeploymentReport, DomainError> {
        let pipeline = self.generate(tenant_id)?;
        let report = execute_all(self.warehouse.as_ref(), &pipeline.statements()).await;

        info!(
            tenant_id,
            namespace = %pipeline.namespace,
            succeeded = report.succeeded_count(),
            attempted = report.attempted(),
            "Pipeline deployed"
        );
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn redrive_failed(&self, tenant_id: &str) -> Result<u64, DomainError> {
        let tenant = TenantId::new(tenant_id)?;

        let requeued = self
            .warehouse
            .execute(&redrive_failed(&tenant))
            .await?
            .rows_affected();

        if requeued > 0 {
            self.warehouse.execute(&redrive_log(&tenant)).await?;
        }

        info!(tenant_id = %tenant, requeued, "Failed transcripts requeued");
        Ok(requeued)
    }
}
