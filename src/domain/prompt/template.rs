//! Research prompt templates
//!
//! Placeholders use `{name}` syntax with lowercase snake-case names. Any other
//! braces (JSON samples inside the prompt body) are left untouched.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Matches `{company_name}` style placeholders
static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z][a-z0-9_]*)\}").unwrap());

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },
}

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: String,
    /// Placeholder names in first-seen order, without duplicates
    variables: Vec<String>,
}

impl PromptTemplate {
    pub fn parse(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut variables: Vec<String> = Vec::new();

        for cap in PLACEHOLDER_PATTERN.captures_iter(&content) {
            let name = &cap[1];
            if !variables.iter().any(|v| v == name) {
                variables.push(name.to_string());
            }
        }

        Self { content, variables }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Substitute every placeholder. All variables are required.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        if let Some(missing) = self.variables.iter().find(|v| !values.contains_key(*v)) {
            return Err(TemplateError::MissingVariable {
                name: missing.clone(),
            });
        }

        let rendered = PLACEHOLDER_PATTERN.replace_all(&self.content, |cap: &regex::Captures| {
            values
                .get(&cap[1])
                .cloned()
                .unwrap_or_else(|| cap[0].to_string())
        });

        Ok(rendered.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_no_variables() {
        let template = PromptTemplate::parse("Hello, world!");
        assert!(template.variables().is_empty());
    }

    #[test]
    fn test_parse_ignores_json_braces() {
        let template = PromptTemplate::parse(
            "Research {company_name}.\n```json\n{\n  \"company_website\": \"url\"\n}\n```\nAgain {company_name}",
        );
        assert_eq!(template.variables(), &["company_name".to_string()]);
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let template = PromptTemplate::parse("{company_name} and {company_name} again");
        let result = template
            .render(&values(&[("company_name", "Acme")]))
            .unwrap();
        assert_eq!(result, "Acme and Acme again");
    }

    #[test]
    fn test_render_missing_variable() {
        let template = PromptTemplate::parse("Hello, {name}!");

        match template.render(&HashMap::new()) {
            Err(TemplateError::MissingVariable { name }) => assert_eq!(name, "name"),
            other => panic!("Expected MissingVariable error, got {:?}", other),
        }
    }

    #[test]
    fn test_render_leaves_other_braces() {
        let template = PromptTemplate::parse("{\"a\": 1} for {company_name}");
        let result = template
            .render(&values(&[("company_name", "Acme")]))
            .unwrap();
        assert_eq!(result, "{\"a\": 1} for Acme");
    }
}
