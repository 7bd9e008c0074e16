//! Built-in research prompts

use std::collections::HashMap;

use serde::Serialize;

use super::template::{PromptTemplate, TemplateError};

pub const CALL_CENTER_CAMPAIGN: &str = "call_center_campaign";
pub const DATA_CAPTURE_STRATEGY: &str = "data_capture_strategy";
pub const DEFAULT_PROMPT: &str = CALL_CENTER_CAMPAIGN;

pub const COMPANY_NAME_VARIABLE: &str = "company_name";

/// A named prompt shipped with the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResearchPrompt {
    pub name: &'static str,
    pub description: &'static str,
    pub content: &'static str,
}

impl ResearchPrompt {
    /// Fill in the company name
    pub fn render(&self, company_name: &str) -> Result<String, TemplateError> {
        let values = HashMap::from([(COMPANY_NAME_VARIABLE.to_string(), company_name.to_string())]);
        PromptTemplate::parse(self.content).render(&values)
    }
}

static PROMPTS: &[ResearchPrompt] = &[
    ResearchPrompt {
        name: CALL_CENTER_CAMPAIGN,
        description: "Complaint themes, tags and call center use cases for a company",
        content: include_str!("../../../prompts/call_center_campaign.md"),
    },
    ResearchPrompt {
        name: DATA_CAPTURE_STRATEGY,
        description: "Structured, semi-structured and unstructured data sources worth capturing",
        content: include_str!("../../../prompts/data_capture_strategy.md"),
    },
];

pub fn list_prompts() -> &'static [ResearchPrompt] {
    PROMPTS
}

pub fn get_prompt(name: &str) -> Option<&'static ResearchPrompt> {
    PROMPTS.iter().find(|p| p.name == name)
}

pub fn default_prompt() -> &'static ResearchPrompt {
    &PROMPTS[0]
}

/// Unknown names fall back to the default prompt
pub fn get_prompt_or_default(name: &str) -> &'static ResearchPrompt {
    get_prompt(name).unwrap_or_else(default_prompt)
}
