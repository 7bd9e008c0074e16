//! Domain layer - Core business logic and entities

pub mod clock;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod prompt;
pub mod research;
pub mod schema;
pub mod tenant;
pub mod use_case;
pub mod warehouse;
pub mod workflow;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::DomainError;
pub use outcome::{DeploymentReport, ItemOutcome};
pub use pipeline::{PipelineDefinition, PipelineSettings, PipelineStage, ProcessingStatus};
pub use prompt::{PromptTemplate, ResearchPrompt, TemplateError};
pub use research::{
    CampaignStore, CampaignSummary, ResearchClient, ResearchRequest, ResearchResult,
    SavedResearch,
};
pub use tenant::{Tenant, TenantId, TenantStatus};
pub use use_case::{UseCase, UseCaseDraft};
pub use warehouse::{QueryResult, Row, SessionContext, SqlValue, Statement, WarehouseClient};
pub use workflow::{CreatedWorkflow, ResearchWorkflowSpec, WorkflowServer, WorkflowSummary};
