use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::workflow::{WorkflowServer, WorkflowSummary};
use crate::domain::DomainError;
use crate::infrastructure::http_client::{HttpClientTrait, HttpResponse};

const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct N8nWorkflow {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: String,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    nodes: Vec<Value>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl N8nWorkflow {
    fn into_summary(self) -> WorkflowSummary {
        WorkflowSummary {
            id: id_string(&self.id),
            name: if self.name.is_empty() {
                "Unnamed".to_string()
            } else {
                self.name
            },
            active: self.active,
            node_count: self.nodes.len(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<N8nWorkflow>,
}

/// Ids come back as strings on current servers and as numbers on older ones
fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// n8n public REST API client
#[derive(Debug)]
pub struct N8nClient<C: HttpClientTrait> {
    client: C,
    base_url: String,
    auth_header: Option<String>,
}

impl<C: HttpClientTrait> N8nClient<C> {
    pub fn new(client: C, base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: api_token
                .filter(|t| !t.is_empty())
                .map(|t| format!("Bearer {}", t)),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(auth) = &self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }

    fn check(&self, action: &str, response: HttpResponse) -> Result<HttpResponse, DomainError> {
        match response.status {
            200..=299 => Ok(response),
            401 | 403 => Err(DomainError::workflow_server(format!(
                "Failed to {}: API token rejected ({})",
                action, response.status
            ))),
            404 => Err(DomainError::not_found(format!("Failed to {}: not found", action))),
            status => Err(DomainError::workflow_server(format!(
                "Failed to {}: status {}: {}",
                action, status, response.body
            ))),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> WorkflowServer for N8nClient<C> {
    async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>, DomainError> {
        let response = self
            .client
            .get(&self.api_url("/workflows"), self.headers())
            .await?;
        let list: ListResponse = self.check("list workflows", response)?.json()?;

        Ok(list.data.into_iter().map(N8nWorkflow::into_summary).collect())
    }

    async fn create_workflow(&self, definition: &Value) -> Result<String, DomainError> {
        let response = self
            .client
            .post_json(&self.api_url("/workflows"), self.headers(), definition)
            .await?;
        let created: Value = self.check("create workflow", response)?.json()?;

        // Older servers wrap the workflow in `data`
        let id = created
            .get("data")
            .and_then(|d| d.get("id"))
            .or_else(|| created.get("id"))
            .map(id_string)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DomainError::workflow_server("Created workflow has no id"))?;

        info!(workflow_id = %id, "Created workflow");
        Ok(id)
    }

    async fn delete_workflow(&self, id: &str) -> Result<(), DomainError> {
        let response = self
            .client
            .delete(&self.api_url(&format!("/workflows/{}", id)), self.headers())
            .await?;
        self.check("delete workflow", response)?;

        info!(workflow_id = %id, "Deleted workflow");
        Ok(())
    }

    async fn is_running(&self) -> bool {
        match self.client.get(&self.base_url, vec![]).await {
            // The root path answers 404 on some versions
            Ok(response) => matches!(response.status, 200 | 404),
            Err(e) => {
                debug!(error = %e, "Workflow server not reachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::HttpClient;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> N8nClient<HttpClient> {
        N8nClient::new(HttpClient::new(), server.uri(), Some("tok".to_string()))
    }

    #[tokio::test]
    async fn test_list_workflows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/workflows"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "abc", "name": "Company Research Flow", "active": true,
                     "nodes": [{}, {}, {}], "updatedAt": "2024-06-10T09:00:00.000Z"},
                    {"id": 7, "nodes": []}
                ]
            })))
            .mount(&server)
            .await;

        let workflows = client(&server).list_workflows().await.unwrap();

        assert_eq!(workflows.len(), 2);
        assert_eq!(workflows[0].id, "abc");
        assert_eq!(workflows[0].node_count, 3);
        assert!(workflows[0].active);
        assert_eq!(workflows[1].id, "7");
        assert_eq!(workflows[1].name, "Unnamed");
    }

    #[tokio::test]
    async fn test_create_workflow_reads_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/workflows"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "wf-1"}})))
            .mount(&server)
            .await;

        let id = client(&server)
            .create_workflow(&json!({"name": "x"}))
            .await
            .unwrap();
        assert_eq!(id, "wf-1");
    }

    #[tokio::test]
    async fn test_create_workflow_unwrapped_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "wf-2"})))
            .mount(&server)
            .await;

        let id = client(&server)
            .create_workflow(&json!({"name": "x"}))
            .await
            .unwrap();
        assert_eq!(id, "wf-2");
    }

    #[tokio::test]
    async fn test_delete_missing_workflow() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/workflows/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).delete_workflow("nope").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).list_workflows().await.unwrap_err();
        assert!(matches!(err, DomainError::WorkflowServer { .. }));
    }

    #[tokio::test]
    async fn test_is_running_accepts_404_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client(&server).is_running().await);
    }

    #[tokio::test]
    async fn test_is_running_false_when_unreachable() {
        let client = N8nClient::new(HttpClient::new(), "http://127.0.0.1:9", None);
        assert!(!client.is_running().await);
    }
}
