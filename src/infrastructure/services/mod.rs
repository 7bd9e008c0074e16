//! Infrastructure services

mod onboarding_service;
mod pipeline_service;
mod provisioning_service;
mod research_service;
mod use_case_service;
mod workflow_service;

pub use onboarding_service::{OnboardingReport, OnboardingService, OnboardingServiceTrait};
pub use pipeline_service::{PipelineService, PipelineServiceTrait};
pub use provisioning_service::{ProvisioningService, ProvisioningServiceTrait};
pub use research_service::{
    ExtractedBlock, ResearchOutcome, ResearchService, ResearchServiceTrait,
};
pub use use_case_service::{UseCaseService, UseCaseServiceTrait};
pub use workflow_service::{CreateWorkflowRequest, WorkflowService, WorkflowServiceTrait};
