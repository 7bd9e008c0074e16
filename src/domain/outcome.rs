//! Per-item outcomes for batch operations that continue past failures

use serde::{Deserialize, Serialize};

/// Result of one unit of work inside a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// Position of the item in the submitted batch
    pub index: usize,
    /// Identifier of the item (use case ID, statement label, ...)
    pub item: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemOutcome {
    pub fn ok(index: usize, item: impl Into<String>) -> Self {
        Self {
            index,
            item: item.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(index: usize, item: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            index,
            item: item.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a batch where every item is attempted regardless of earlier failures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl DeploymentReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: ItemOutcome) {
        self.outcomes.push(outcome);
    }

    /// True when every attempted item succeeded
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    pub fn failed(&self) -> Vec<&ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.success).collect()
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }
}

impl FromIterator<ItemOutcome> for DeploymentReport {
    fn from_iter<T: IntoIterator<Item = ItemOutcome>>(iter: T) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_succeeds() {
        let report = DeploymentReport::new();
        assert!(report.succeeded());
        assert_eq!(report.attempted(), 0);
    }

    #[test]
    fn test_partial_failure() {
        let report: DeploymentReport = vec![
            ItemOutcome::ok(0, "UC_A"),
            ItemOutcome::failed(1, "UC_B", "permission denied"),
            ItemOutcome::ok(2, "UC_C"),
        ]
        .into_iter()
        .collect();

        assert!(!report.succeeded());
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.succeeded_count(), 2);

        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].item, "UC_B");
        assert_eq!(failed[0].index, 1);
    }

    #[test]
    fn test_serialization_omits_missing_error() {
        let json = serde_json::to_string(&ItemOutcome::ok(0, "UC_A")).unwrap();
        assert!(!json.contains("error"));
    }
}
