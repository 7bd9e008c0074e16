//! Provisioning service - shared database structure and tenant namespaces

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

use crate::domain::schema::database_structure;
use crate::domain::tenant::{queries, validate_display_name, Tenant, TenantId, TenantStatus};
use crate::domain::{DeploymentReport, DomainError, ItemOutcome, Statement, WarehouseClient};

/// Trait for the provisioning service (for dynamic dispatch in AppState)
#[async_trait]
pub trait ProvisioningServiceTrait: Send + Sync + Debug {
    /// Create the namespace for a tenant and register it. Returns whether the
    /// remote call succeeded; failures are logged, never raised.
    async fn create_tenant_namespace(&self, tenant_id: &str, display_name: &str) -> bool;

    async fn list_tenants(&self) -> Result<Vec<Tenant>, DomainError>;

    async fn set_status(&self, tenant_id: &str, status: TenantStatus)
        -> Result<Tenant, DomainError>;

    /// Create the shared database, schemas, registry and provisioning procedure
    async fn deploy_database_structure(&self) -> DeploymentReport;
}

/// Run statements one at a time, recording an outcome for each and carrying
/// on past failures
pub(crate) async fn execute_all(
    warehouse: &dyn WarehouseClient,
    statements: &[Statement],
) -> DeploymentReport {
    let mut report = DeploymentReport::new();

    for (index, statement) in statements.iter().enumerate() {
        match warehouse.execute(statement).await {
            Ok(_) => {
                info!(label = %statement.label, "Statement executed");
                report.push(ItemOutcome::ok(index, &statement.label));
            }
            Err(e) => {
                error!(label = %statement.label, sql = %statement.summary(), error = %e, "Statement failed");
                report.push(ItemOutcome::failed(index, &statement.label, e.to_string()));
            }
        }
    }

    report
}

pub struct ProvisioningService {
    warehouse: Arc<dyn WarehouseClient>,
    database: String,
}

impl std::fmt::Debug for ProvisioningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningService")
            .field("database", &self.database)
            .finish()
    }
}

impl ProvisioningService {
    pub fn new(warehouse: Arc<dyn WarehouseClient>, database: impl Into<String>) -> Self {
        Self {
            warehouse,
            database: database.into(),
        }
    }

    async fn try_create(&self, tenant_id: &str, display_name: &str) -> Result<String, DomainError> {
        let id = TenantId::new(tenant_id)?;
        validate_display_name(display_name).map_err(|e| DomainError::validation(e.to_string()))?;

        let result = self
            .warehouse
            .execute(&queries::call_create_customer_schema(&id, display_name))
            .await?;

        Ok(result.first_value().unwrap_or_default().to_string())
    }

    async fn find(&self, id: &TenantId) -> Result<Tenant, DomainError> {
        self.list_tenants()
            .await?
            .into_iter()
            .find(|t| t.id == *id)
            .ok_or_else(|| DomainError::not_found(format!("Tenant '{}' not found", id)))
    }
}

#[async_trait]
impl ProvisioningServiceTrait for ProvisioningService {
    #[instrument(skip(self))]
    async fn create_tenant_namespace(&self, tenant_id: &str, display_name: &str) -> bool {
        match self.try_create(tenant_id, display_name).await {
            Ok(message) => {
                info!(tenant_id, message = %message, "Tenant namespace provisioned");
                true
            }
            Err(e @ (DomainError::InvalidId { .. } | DomainError::Validation { .. })) => {
                warn!(tenant_id, error = %e, "Rejected tenant provisioning request");
                false
            }
            Err(e) => {
                error!(tenant_id, error = %e, "Tenant provisioning failed");
                false
            }
        }
    }

    async fn list_tenants(&self) -> Result<Vec<Tenant>, DomainError> {
        let result = self.warehouse.execute(&queries::select_customers()).await?;

        Ok(result
            .rows
            .iter()
            .filter_map(|row| match queries::tenant_from_row(row) {
                Ok(tenant) => Some(tenant),
                Err(e) => {
                    warn!(
                        customer_id = row.get_str(0).unwrap_or_default(),
                        error = %e,
                        "Skipping unreadable registry row"
                    );
                    None
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        tenant_id: &str,
        status: TenantStatus,
    ) -> Result<Tenant, DomainError> {
        let id = TenantId::new(tenant_id)?;
        let tenant = self.find(&id).await?;

        if !tenant.status.can_transition_to(status) {
            return Err(DomainError::validation(format!(
                "Tenant '{}' cannot move from {} to {}",
                id, tenant.status, status
            )));
        }

        self.warehouse
            .execute(&queries::update_status(&id, status))
            .await?;

        info!(tenant_id = %id, from = %tenant.status, to = %status, "Tenant status updated");
        Ok(tenant.with_status(status))
    }

    async fn deploy_database_structure(&self) -> DeploymentReport {
        let statements = database_structure(&self.database);
        let report = execute_all(self.warehouse.as_ref(), &statements).await;

        info!(
            database = %self.database,
            succeeded = report.succeeded_count(),
            attempted = report.attempted(),
            "Database structure deployed"
        );
        report
    }
}
