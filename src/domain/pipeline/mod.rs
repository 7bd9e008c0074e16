//! Topic-detection pipeline domain

mod definition;
mod stage;

pub use definition::{
    redrive_failed, redrive_log, PipelineDefinition, PipelineSettings, TaskDefinition,
    TaskSchedule,
};
pub use stage::{PipelineStage, ProcessingStatus, REDRIVE_LOG_STAGE};
