//! Tenant endpoints: provisioning, use cases, pipeline and onboarding

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ReportResponse;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::tenant::validate_display_name;
use crate::domain::{Tenant, TenantId, TenantStatus, UseCase, UseCaseDraft};
use crate::infrastructure::services::OnboardingReport;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTenantRequest {
    pub tenant_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTenantResponse {
    pub tenant_id: String,
    pub namespace: String,
    pub provisioned: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListTenantsResponse {
    pub tenants: Vec<Tenant>,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusRequest {
    pub status: TenantStatus,
}

/// Use cases arrive either as a bare array or wrapped in `use_cases`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UseCasesPayload {
    List(Vec<UseCaseDraft>),
    Wrapped { use_cases: Vec<UseCaseDraft> },
}

impl UseCasesPayload {
    pub fn into_drafts(self) -> Vec<UseCaseDraft> {
        match self {
            Self::List(drafts) | Self::Wrapped { use_cases: drafts } => drafts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListUseCasesResponse {
    pub use_cases: Vec<UseCase>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResponse {
    pub tenant_id: String,
    pub namespace: String,
    pub generated_at: DateTime<Utc>,
    pub statements: Vec<String>,
    pub script: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedriveResponse {
    pub tenant_id: String,
    pub requeued: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnboardRequest {
    pub display_name: String,
    #[serde(default)]
    pub use_cases: Vec<UseCaseDraft>,
}

/// POST /tenants
pub async fn create_tenant(
    State(state): State<AppState>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<CreateTenantResponse>), ApiError> {
    debug!(tenant_id = %request.tenant_id, "Provisioning tenant");

    // Reject bad input as 400 before the boolean provisioning call hides the reason
    let tenant = TenantId::new(request.tenant_id.as_str())?;
    validate_display_name(&request.display_name)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let provisioned = state
        .provisioning_service
        .create_tenant_namespace(tenant.as_str(), &request.display_name)
        .await;

    if !provisioned {
        return Err(ApiError::bad_gateway(format!(
            "Provisioning tenant '{}' failed",
            tenant
        )));
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateTenantResponse {
            namespace: tenant.namespace(),
            tenant_id: tenant.to_string(),
            provisioned,
        }),
    ))
}

/// GET /tenants
pub async fn list_tenants(
    State(state): State<AppState>,
) -> Result<Json<ListTenantsResponse>, ApiError> {
    let tenants = state.provisioning_service.list_tenants().await?;
    let total = tenants.len();

    Ok(Json(ListTenantsResponse { tenants, total }))
}

/// PUT /tenants/{tenant_id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<Tenant>, ApiError> {
    let tenant = state
        .provisioning_service
        .set_status(&tenant_id, request.status)
        .await?;

    Ok(Json(tenant))
}

/// POST /tenants/{tenant_id}/use-cases
pub async fn deploy_use_cases(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(payload): Json<UseCasesPayload>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = state
        .use_case_service
        .deploy_use_cases(&tenant_id, payload.into_drafts())
        .await?;

    Ok(Json(report.into()))
}

/// GET /tenants/{tenant_id}/use-cases
pub async fn list_use_cases(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<ListUseCasesResponse>, ApiError> {
    let use_cases = state.use_case_service.get_use_cases(&tenant_id).await?;
    let total = use_cases.len();

    Ok(Json(ListUseCasesResponse { use_cases, total }))
}

/// DELETE /tenants/{tenant_id}/use-cases/{use_case_id}
pub async fn deactivate_use_case(
    State(state): State<AppState>,
    Path((tenant_id, use_case_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .use_case_service
        .deactivate(&tenant_id, &use_case_id)
        .await?;

    Ok(Json(serde_json::json!({
        "deactivated": true,
        "use_case_id": use_case_id
    })))
}

/// GET /tenants/{tenant_id}/pipeline
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<PipelineResponse>, ApiError> {
    let pipeline = state.pipeline_service.generate(&tenant_id)?;

    Ok(Json(PipelineResponse {
        tenant_id: pipeline.tenant_id.to_string(),
        namespace: pipeline.namespace.clone(),
        generated_at: pipeline.generated_at,
        statements: pipeline.statements().into_iter().map(|s| s.sql).collect(),
        script: pipeline.render(),
    }))
}

/// POST /tenants/{tenant_id}/pipeline/deploy
pub async fn deploy_pipeline(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = state.pipeline_service.deploy(&tenant_id).await?;
    Ok(Json(report.into()))
}

/// POST /tenants/{tenant_id}/pipeline/redrive
pub async fn redrive_pipeline(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<RedriveResponse>, ApiError> {
    let requeued = state.pipeline_service.redrive_failed(&tenant_id).await?;
    Ok(Json(RedriveResponse { tenant_id, requeued }))
}

/// POST /tenants/{tenant_id}/onboard
pub async fn onboard_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(request): Json<OnboardRequest>,
) -> Result<Json<OnboardingReport>, ApiError> {
    let report = state
        .onboarding_service
        .onboard(&tenant_id, &request.display_name, request.use_cases)
        .await?;

    Ok(Json(report))
}
