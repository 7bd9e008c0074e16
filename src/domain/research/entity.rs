//! Research requests, webhook responses and fenced JSON extraction

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

static JSON_BLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap());

/// Body posted to the research webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub company_name: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl ResearchRequest {
    pub fn new(
        company_name: &str,
        source: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let company_name = company_name.trim();
        if company_name.is_empty() {
            return Err(DomainError::validation("Company name cannot be empty"));
        }

        Ok(Self {
            company_name: company_name.to_string(),
            timestamp: now,
            source: source.into(),
        })
    }
}

/// Parsed webhook response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ResearchResult {
    /// Research-API passthrough: `choices[0].message.content` plus citations
    Completion {
        content: String,
        citations: Vec<String>,
        raw: Value,
    },
    Json { raw: Value },
    Text { raw: String },
}

impl ResearchResult {
    pub fn parse(body: &str) -> Self {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) => return Self::Text { raw: body.to_string() },
        };

        let content = value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty());

        match content {
            Some(content) => {
                let citations = value
                    .get("citations")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|c| c.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();

                Self::Completion {
                    content: content.to_string(),
                    citations,
                    raw: value.clone(),
                }
            }
            None => Self::Json { raw: value },
        }
    }

    /// Text worth scanning for a fenced JSON block
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Completion { content, .. } => Some(content),
            Self::Text { raw } => Some(raw),
            Self::Json { .. } => None,
        }
    }

    pub fn citations(&self) -> &[String] {
        match self {
            Self::Completion { citations, .. } => citations,
            _ => &[],
        }
    }

    pub fn is_json(&self) -> bool {
        !matches!(self, Self::Text { .. })
    }

    /// Extension used when the body is persisted
    pub fn extension(&self) -> &'static str {
        if self.is_json() { "json" } else { "txt" }
    }
}

/// Parse the first ```json fenced block in `content`.
/// Returns `Ok(None)` when there is no block and an error when the block is not valid JSON.
pub fn extract_json_block(content: &str) -> Result<Option<Value>, DomainError> {
    let Some(cap) = JSON_BLOCK_PATTERN.captures(content) else {
        return Ok(None);
    };

    serde_json::from_str(&cap[1])
        .map(Some)
        .map_err(|e| DomainError::serialization(format!("Invalid JSON block: {}", e)))
}
