//! n8n research workflow: webhook trigger -> research request -> respond to webhook

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::prompt::{ResearchPrompt, TemplateError};

pub const RESEARCH_API_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const RESEARCH_MODEL: &str = "sonar-pro";

const TRIGGER_NODE: &str = "Company Research Trigger";
const RESEARCH_NODE: &str = "Perplexity Research";
const RESPOND_NODE: &str = "Return Results";

/// n8n expression that reads the company name from the webhook payload
pub const COMPANY_NAME_EXPRESSION: &str = "{{ $json.body.company_name }}";

/// Webhook path for a company: `research-<lowercase-hyphenated-name>`
pub fn webhook_path(company_name: &str) -> String {
    let mut slug = String::new();
    for c in company_name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    format!("research-{}", slug.trim_matches('-'))
}

/// Inputs for a research workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchWorkflowSpec {
    pub name: String,
    pub company_name: String,
}

impl ResearchWorkflowSpec {
    pub fn new(name: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company_name: company_name.into(),
        }
    }

    pub fn webhook_path(&self) -> String {
        webhook_path(&self.company_name)
    }

    /// Workflow body accepted by `POST /api/v1/workflows`
    pub fn build(&self, prompt: &ResearchPrompt) -> Result<Value, TemplateError> {
        let path = self.webhook_path();
        let content = prompt.render(COMPANY_NAME_EXPRESSION)?;

        let request_body = json!({
            "model": RESEARCH_MODEL,
            "messages": [{ "role": "user", "content": content }],
            "max_tokens": 8000,
            "temperature": 0,
            "return_citations": true
        });

        Ok(json!({
            "name": self.name,
            "nodes": [
                {
                    "parameters": {
                        "httpMethod": "POST",
                        "path": path,
                        "responseMode": "responseNode",
                        "options": {}
                    },
                    "id": "webhook-trigger",
                    "name": TRIGGER_NODE,
                    "type": "n8n-nodes-base.webhook",
                    "typeVersion": 1,
                    "position": [240, 300],
                    "webhookId": path
                },
                {
                    "parameters": {
                        "method": "POST",
                        "url": RESEARCH_API_URL,
                        "authentication": "genericCredentialType",
                        "genericAuthType": "httpHeaderAuth",
                        "sendBody": true,
                        "specifyBody": "json",
                        "jsonBody": format!("={}", request_body),
                        "options": {}
                    },
                    "id": "perplexity-research",
                    "name": RESEARCH_NODE,
                    "type": "n8n-nodes-base.httpRequest",
                    "typeVersion": 4,
                    "position": [460, 300]
                },
                {
                    "parameters": {
                        "respondWith": "json",
                        "responseBody": "={{ $json }}"
                    },
                    "id": "respond-webhook",
                    "name": RESPOND_NODE,
                    "type": "n8n-nodes-base.respondToWebhook",
                    "typeVersion": 1,
                    "position": [680, 300]
                }
            ],
            "connections": {
                TRIGGER_NODE: { "main": [[{ "node": RESEARCH_NODE, "type": "main", "index": 0 }]] },
                RESEARCH_NODE: { "main": [[{ "node": RESPOND_NODE, "type": "main", "index": 0 }]] }
            },
            "settings": { "executionOrder": "v1" }
        }))
    }
}

/// A workflow as listed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub node_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Result of creating a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedWorkflow {
    pub id: String,
    pub name: String,
    pub webhook_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prompt::default_prompt;

    #[test]
    fn test_webhook_path() {
        assert_eq!(webhook_path("Apple Inc"), "research-apple-inc");
        assert_eq!(webhook_path("  AT&T  Mobility "), "research-at-t-mobility");
        assert_eq!(webhook_path("Tesla"), "research-tesla");
    }

    #[test]
    fn test_build_three_nodes() {
        let spec = ResearchWorkflowSpec::new("Company Research Flow", "Apple Inc");
        let workflow = spec.build(default_prompt()).unwrap();

        let nodes = workflow["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0]["type"], "n8n-nodes-base.webhook");
        assert_eq!(nodes[0]["parameters"]["path"], "research-apple-inc");
        assert_eq!(nodes[1]["type"], "n8n-nodes-base.httpRequest");
        assert_eq!(nodes[2]["type"], "n8n-nodes-base.respondToWebhook");
        assert_eq!(workflow["name"], "Company Research Flow");
    }

    #[test]
    fn test_build_connections_chain() {
        let workflow = ResearchWorkflowSpec::new("Flow", "Acme")
            .build(default_prompt())
            .unwrap();
        let connections = &workflow["connections"];

        assert_eq!(
            connections["Company Research Trigger"]["main"][0][0]["node"],
            "Perplexity Research"
        );
        assert_eq!(
            connections["Perplexity Research"]["main"][0][0]["node"],
            "Return Results"
        );
    }

    #[test]
    fn test_build_embeds_company_expression() {
        let workflow = ResearchWorkflowSpec::new("Flow", "Acme")
            .build(default_prompt())
            .unwrap();
        let body = workflow["nodes"][1]["parameters"]["jsonBody"]
            .as_str()
            .unwrap();

        assert!(body.starts_with("={"));
        assert!(body.contains(COMPANY_NAME_EXPRESSION));
        assert!(body.contains("\"model\":\"sonar-pro\""));
    }
}
