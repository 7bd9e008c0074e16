use async_trait::async_trait;
use tracing::debug;

use crate::domain::research::{ResearchClient, ResearchRequest};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Posts research requests to the workflow server's webhook
#[derive(Debug)]
pub struct WebhookResearchClient<C: HttpClientTrait> {
    client: C,
    webhook_url: String,
}

impl<C: HttpClientTrait> WebhookResearchClient<C> {
    pub fn new(client: C, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }
}

#[async_trait]
impl<C: HttpClientTrait> ResearchClient for WebhookResearchClient<C> {
    async fn research(&self, request: &ResearchRequest) -> Result<String, DomainError> {
        let body = serde_json::to_value(request)?;

        debug!(company = %request.company_name, url = %self.webhook_url, "Triggering research webhook");

        let response = self
            .client
            .post_json(
                &self.webhook_url,
                vec![("Content-Type", "application/json")],
                &body,
            )
            .await
            .map_err(|e| match e {
                DomainError::Transport { message } => DomainError::research(format!(
                    "Cannot reach workflow server at {}: {}",
                    self.webhook_url, message
                )),
                other => other,
            })?;

        match response.status {
            200..=299 => Ok(response.body),
            404 => Err(DomainError::research(format!(
                "Webhook not found at {}; check the workflow is active",
                self.webhook_url
            ))),
            500 => Err(DomainError::research(format!(
                "Workflow execution failed: {}",
                response.body
            ))),
            status => Err(DomainError::research(format!(
                "Request failed with status {}: {}",
                status, response.body
            ))),
        }
    }
}
