//! Onboarding service - provision, deploy use cases, deploy pipeline, activate

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{PipelineServiceTrait, ProvisioningServiceTrait, UseCaseServiceTrait};
use crate::domain::tenant::queries;
use crate::domain::{
    DeploymentReport, DomainError, TenantId, UseCaseDraft, WarehouseClient,
};

/// What each onboarding step achieved. Later steps are `None` when an earlier
/// one stopped the flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardingReport {
    pub tenant_id: String,
    pub namespace: String,
    pub provisioned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cases: Option<DeploymentReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<DeploymentReport>,
    pub activated: bool,
}

impl OnboardingReport {
    fn new(tenant: &TenantId) -> Self {
        Self {
            tenant_id: tenant.to_string(),
            namespace: tenant.namespace(),
            provisioned: false,
            use_cases: None,
            pipeline: None,
            activated: false,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.activated
    }
}

#[async_trait]
pub trait OnboardingServiceTrait: Send + Sync + Debug {
    async fn onboard(
        &self,
        tenant_id: &str,
        display_name: &str,
        drafts: Vec<UseCaseDraft>,
    ) -> Result<OnboardingReport, DomainError>;
}

pub struct OnboardingService {
    provisioning: Arc<dyn ProvisioningServiceTrait>,
    use_cases: Arc<dyn UseCaseServiceTrait>,
    pipeline: Arc<dyn PipelineServiceTrait>,
    warehouse: Arc<dyn WarehouseClient>,
}

impl std::fmt::Debug for OnboardingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnboardingService").finish()
    }
}

impl OnboardingService {
    pub fn new(
        provisioning: Arc<dyn ProvisioningServiceTrait>,
        use_cases: Arc<dyn UseCaseServiceTrait>,
        pipeline: Arc<dyn PipelineServiceTrait>,
        warehouse: Arc<dyn WarehouseClient>,
    ) -> Self {
        Self {
            provisioning,
            use_cases,
            pipeline,
            warehouse,
        }
    }
}

#[async_trait]
impl OnboardingServiceTrait for OnboardingService {
    #[instrument(skip(self, drafts), fields(use_cases = drafts.len()))]
    async fn onboard(
        &self,
        tenant_id: &str,
        display_name: &str,
        drafts: Vec<UseCaseDraft>,
    ) -> Result<OnboardingReport, DomainError> {
        let tenant = TenantId::new(tenant_id)?;
        let mut report = OnboardingReport::new(&tenant);

        report.provisioned = self
            .provisioning
            .create_tenant_namespace(tenant.as_str(), display_name)
            .await;
        if !report.provisioned {
            warn!(tenant_id = %tenant, "Provisioning failed, onboarding stopped");
            return Ok(report);
        }

        let use_cases = self.use_cases.deploy_use_cases(tenant.as_str(), drafts).await?;
        let pipeline = self.pipeline.deploy(tenant.as_str()).await?;
        let complete = use_cases.succeeded() && pipeline.succeeded();
        report.use_cases = Some(use_cases);
        report.pipeline = Some(pipeline);

        if !complete {
            warn!(tenant_id = %tenant, "Onboarding incomplete, tenant left in CREATED");
            return Ok(report);
        }

        match self.warehouse.execute(&queries::activate(&tenant)).await {
            // Dry runs return no rows at all, so only a reported zero means the guard refused
            Ok(result) if !result.rows.is_empty() && result.rows_affected() == 0 => {
                warn!(tenant_id = %tenant, "Tenant not activated, it is no longer CREATED or ACTIVE");
            }
            Ok(_) => {
                report.activated = true;
                info!(tenant_id = %tenant, "Tenant onboarded and activated");
            }
            Err(e) => warn!(tenant_id = %tenant, error = %e, "Tenant activation failed"),
        }

        Ok(report)
    }
}
