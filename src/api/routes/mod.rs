//! HTTP routes for tenants, research and research workflows

pub mod research;
pub mod tenants;
pub mod workflows;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;

use super::state::AppState;
use crate::domain::DeploymentReport;

/// A batch report with its aggregate outcome spelled out for clients
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub succeeded: bool,
    pub attempted: usize,
    pub succeeded_count: usize,
    #[serde(flatten)]
    pub report: DeploymentReport,
}

impl From<DeploymentReport> for ReportResponse {
    fn from(report: DeploymentReport) -> Self {
        Self {
            succeeded: report.succeeded(),
            attempted: report.attempted(),
            succeeded_count: report.succeeded_count(),
            report,
        }
    }
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Research
        .route("/research", post(research::run_research))
        .route("/research/extract", post(research::extract_use_cases))
        .route("/campaigns", get(research::list_campaigns))
        .route("/prompts", get(research::list_prompts))
        .route("/prompts/{name}", get(research::get_prompt))
        // Tenants
        .route("/tenants", post(tenants::create_tenant))
        .route("/tenants", get(tenants::list_tenants))
        .route("/tenants/{tenant_id}/status", put(tenants::set_status))
        .route("/tenants/{tenant_id}/use-cases", post(tenants::deploy_use_cases))
        .route("/tenants/{tenant_id}/use-cases", get(tenants::list_use_cases))
        .route(
            "/tenants/{tenant_id}/use-cases/{use_case_id}",
            delete(tenants::deactivate_use_case),
        )
        .route("/tenants/{tenant_id}/pipeline", get(tenants::get_pipeline))
        .route("/tenants/{tenant_id}/pipeline/deploy", post(tenants::deploy_pipeline))
        .route("/tenants/{tenant_id}/pipeline/redrive", post(tenants::redrive_pipeline))
        .route("/tenants/{tenant_id}/onboard", post(tenants::onboard_tenant))
        // Research workflows
        .route("/workflows", get(workflows::list_workflows))
        .route("/workflows", post(workflows::create_workflow))
        .route("/workflows/{workflow_id}", delete(workflows::delete_workflow))
}
