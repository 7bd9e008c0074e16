//! Use case entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::warehouse::Row;
use crate::domain::DomainError;

pub const DEFAULT_USE_CASE_NAME: &str = "Unnamed Use Case";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Use case as submitted by a caller; everything but the topics is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UseCaseDraft {
    #[serde(default)]
    pub use_case_id: Option<String>,
    #[serde(default, alias = "use_case_name", alias = "name")]
    pub use_case: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics_to_track: Vec<String>,
    #[serde(default)]
    pub business_value_context: Option<String>,
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UseCaseDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            use_case: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.use_case_id = Some(id.into());
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics_to_track = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    pub fn with_business_value(mut self, context: impl Into<String>) -> Self {
        self.business_value_context = Some(context.into());
        self
    }
}

/// A named analytical goal tracked for one tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCase {
    pub use_case_id: String,
    pub use_case_name: String,
    pub description: String,
    pub topics_to_track: Vec<String>,
    pub business_value_context: String,
    pub confidence_threshold: f64,
    pub is_active: bool,
}

/// Timestamp-based ID; the ordinal keeps IDs distinct within one batch
pub fn generate_use_case_id(now: DateTime<Utc>, ordinal: usize) -> String {
    format!("UC_{}_{:03}", now.format("%Y%m%d_%H%M%S"), ordinal)
}

impl UseCase {
    /// Apply defaults to a draft. `ordinal` is the draft's position in its batch.
    pub fn from_draft(
        draft: UseCaseDraft,
        ordinal: usize,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let confidence_threshold = draft
            .confidence_threshold
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(DomainError::validation(format!(
                "Confidence threshold {} must be between 0 and 1",
                confidence_threshold
            )));
        }

        let use_case_id = draft
            .use_case_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generate_use_case_id(now, ordinal));

        Ok(Self {
            use_case_id,
            use_case_name: draft
                .use_case
                .unwrap_or_else(|| DEFAULT_USE_CASE_NAME.to_string()),
            description: draft.description.unwrap_or_default(),
            topics_to_track: draft.topics_to_track,
            business_value_context: draft.business_value_context.unwrap_or_default(),
            confidence_threshold,
            is_active: draft.is_active.unwrap_or(true),
        })
    }

    /// Topics as stored in the warehouse: a JSON-encoded array
    pub fn topics_json(&self) -> Result<String, DomainError> {
        Ok(serde_json::to_string(&self.topics_to_track)?)
    }

    /// Decode a row selected with the column order of `USE_CASE_COLUMNS`
    pub fn from_row(row: &Row) -> Result<Self, DomainError> {
        let topics_to_track = match row.get_str(3).map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw).map_err(|e| {
                DomainError::serialization(format!(
                    "Malformed topics for use case '{}': {}",
                    row.get_string(0),
                    e
                ))
            })?,
            _ => Vec::new(),
        };

        Ok(Self {
            use_case_id: row.get_string(0),
            use_case_name: row.get_string(1),
            description: row.get_string(2),
            topics_to_track,
            business_value_context: row.get_string(4),
            confidence_threshold: row
                .get_f64(5)
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            is_active: row.get_bool(6).unwrap_or(true),
        })
    }
}
