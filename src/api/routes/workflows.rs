//! Research workflow endpoints on the workflow server

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{CreatedWorkflow, WorkflowSummary};
use crate::infrastructure::services::CreateWorkflowRequest;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkflowApiRequest {
    pub name: String,
    pub company_name: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl From<CreateWorkflowApiRequest> for CreateWorkflowRequest {
    fn from(request: CreateWorkflowApiRequest) -> Self {
        let create = CreateWorkflowRequest::new(request.name, request.company_name);
        match request.prompt {
            Some(prompt) => create.with_prompt(prompt),
            None => create,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListWorkflowsResponse {
    pub workflows: Vec<WorkflowSummary>,
    pub total: usize,
}

/// GET /workflows
pub async fn list_workflows(
    State(state): State<AppState>,
) -> Result<Json<ListWorkflowsResponse>, ApiError> {
    let workflows = state.workflow_service.list().await?;
    let total = workflows.len();

    Ok(Json(ListWorkflowsResponse { workflows, total }))
}

/// POST /workflows
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkflowApiRequest>,
) -> Result<(StatusCode, Json<CreatedWorkflow>), ApiError> {
    debug!(name = %request.name, company = %request.company_name, "Creating research workflow");

    let created = state.workflow_service.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /workflows/{workflow_id}
pub async fn delete_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.workflow_service.delete(&workflow_id).await?;

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": workflow_id
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::test_support::{send, Mocks};
    use crate::domain::DomainError;
    use axum::http::Method;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_create_request_defaults_prompt() {
        let request: CreateWorkflowApiRequest =
            serde_json::from_str(r#"{"name": "Research", "company_name": "Acme"}"#).unwrap();
        let create = CreateWorkflowRequest::from(request);

        assert_eq!(create.company_name, "Acme");
        assert!(create.prompt.is_none());
    }

    #[tokio::test]
    async fn test_list_workflows() {
        let dir = TempDir::new().unwrap();
        let mut mocks = Mocks::new();
        mocks.workflows.expect_list_workflows().returning(|| {
            Ok(vec![WorkflowSummary {
                id: "wf-1".to_string(),
                name: "Company Research Flow".to_string(),
                active: false,
                node_count: 3,
                updated_at: None,
            }])
        });

        let (status, body) = send(mocks.router(dir.path()), Method::GET, "/workflows", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["workflows"][0]["node_count"], 3);
    }

    #[tokio::test]
    async fn test_create_workflow() {
        let dir = TempDir::new().unwrap();
        let mut mocks = Mocks::new();
        mocks
            .workflows
            .expect_create_workflow()
            .times(1)
            .returning(|_| Ok("wf-9".to_string()));

        let (status, body) = send(
            mocks.router(dir.path()),
            Method::POST,
            "/workflows",
            Some(json!({"name": "Apple research", "company_name": "Apple Inc"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], "wf-9");
        assert_eq!(body["webhook_path"], "research-apple-inc");
    }

    #[tokio::test]
    async fn test_delete_unknown_workflow() {
        let dir = TempDir::new().unwrap();
        let mut mocks = Mocks::new();
        mocks
            .workflows
            .expect_delete_workflow()
            .returning(|_| Err(DomainError::not_found("Failed to delete workflow: not found")));

        let (status, _) = send(
            mocks.router(dir.path()),
            Method::DELETE,
            "/workflows/nope",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_bad_gateway() {
        let dir = TempDir::new().unwrap();
        let mut mocks = Mocks::new();
        mocks
            .workflows
            .expect_list_workflows()
            .returning(|| Err(DomainError::workflow_server("Failed to list workflows: status 500: boom")));

        let (status, body) = send(mocks.router(dir.path()), Method::GET, "/workflows", None).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "workflow_server");
    }
}
