//! Company research domain - webhook payloads, parsed results and campaign artifacts

mod campaign;
mod entity;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub use campaign::*;
pub use entity::*;

use crate::domain::DomainError;

/// Something that researches a company and returns the raw response body
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResearchClient: Send + Sync {
    async fn research(&self, request: &ResearchRequest) -> Result<String, DomainError>;
}

/// Persistence of campaign artifacts
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Write `contents` and return the path written
    async fn save(
        &self,
        campaign: &str,
        company: &str,
        file_name: &str,
        contents: &str,
    ) -> Result<String, DomainError>;

    async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>, DomainError>;
}
