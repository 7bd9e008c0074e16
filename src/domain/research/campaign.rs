//! Campaign artifact layout: `<campaign>/<company>/<kind>_<YYYYmmdd_HHMMSS>.<ext>`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a persisted file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Research,
    ExtractedUseCases,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::ExtractedUseCases => "extracted_use_cases",
        }
    }
}

/// Make a campaign or company name safe as a single directory name.
/// Spaces become `_`; path separators and parent references are dropped.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0') && !c.is_control())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

pub fn artifact_file_name(kind: ArtifactKind, extension: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}.{}", kind.as_str(), now.format("%Y%m%d_%H%M%S"), extension)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub name: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub name: String,
    pub companies: Vec<CompanySummary>,
}

/// Where a research run left its files
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedResearch {
    pub campaign: String,
    pub company: String,
    pub research_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_path: Option<String>,
}
