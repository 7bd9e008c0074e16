//! Pipeline stages and the transcript processing state machine

use serde::{Deserialize, Serialize};

/// Processing state of a transcript
///
/// `PENDING -> PROCESSING -> COMPLETED`; a classify failure moves the batch to
/// `FAILED`, and a re-drive moves it back to `PENDING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
                | (Self::Failed, Self::Pending)
        )
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three stages of the topic-detection DAG, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Ingest,
    Classify,
    Aggregate,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 3] = [Self::Ingest, Self::Classify, Self::Aggregate];

    /// Task name inside the tenant namespace
    pub fn task_name(&self) -> &'static str {
        match self {
            Self::Ingest => "PROCESS_TRANSCRIPTS",
            Self::Classify => "DETECT_TOPICS",
            Self::Aggregate => "GENERATE_ANALYTICS",
        }
    }

    /// Value written to `PROCESSING_LOGS.processing_stage`
    pub fn log_stage(&self) -> &'static str {
        match self {
            Self::Ingest => "INGESTION",
            Self::Classify => "CLASSIFICATION",
            Self::Aggregate => "AGGREGATION",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ingest => "Process new transcripts",
            Self::Classify => "Topic detection",
            Self::Aggregate => "Generate analytics",
        }
    }

    pub fn predecessor(&self) -> Option<PipelineStage> {
        match self {
            Self::Ingest => None,
            Self::Classify => Some(Self::Ingest),
            Self::Aggregate => Some(Self::Classify),
        }
    }
}

/// Log stage for the re-drive operation
pub const REDRIVE_LOG_STAGE: &str = "REDRIVE";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_chain() {
        assert_eq!(PipelineStage::Ingest.predecessor(), None);
        assert_eq!(
            PipelineStage::Classify.predecessor(),
            Some(PipelineStage::Ingest)
        );
        assert_eq!(
            PipelineStage::Aggregate.predecessor(),
            Some(PipelineStage::Classify)
        );
    }

    #[test]
    fn test_status_transitions() {
        use ProcessingStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Failed.can_transition_to(Completed));
    }
}
