//! Research service - runs company research through the webhook and files the
//! results under their campaign

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::domain::research::{artifact_file_name, extract_json_block, ArtifactKind};
use crate::domain::{
    CampaignStore, CampaignSummary, Clock, DomainError, ResearchClient, ResearchRequest,
    ResearchResult, SavedResearch,
};

/// A completed research run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchOutcome {
    pub saved: SavedResearch,
    pub result: ResearchResult,
}

/// A fenced JSON block pulled out of research content and persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedBlock {
    pub path: String,
    pub value: Value,
}

/// Trait for the research service (for dynamic dispatch in AppState)
#[async_trait]
pub trait ResearchServiceTrait: Send + Sync + Debug {
    /// Research a company, persist the raw body and any extracted use cases.
    /// `campaign` falls back to the configured default.
    async fn research(
        &self,
        company_name: &str,
        campaign: Option<&str>,
    ) -> Result<ResearchOutcome, DomainError>;

    /// Persist the first fenced JSON block of `content`
    async fn extract(
        &self,
        campaign: Option<&str>,
        company_name: &str,
        content: &str,
    ) -> Result<ExtractedBlock, DomainError>;

    async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>, DomainError>;
}

pub struct ResearchService {
    client: Arc<dyn ResearchClient>,
    store: Arc<dyn CampaignStore>,
    clock: Arc<dyn Clock>,
    source: String,
    default_campaign: String,
}

impl std::fmt::Debug for ResearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchService")
            .field("source", &self.source)
            .field("default_campaign", &self.default_campaign)
            .finish()
    }
}

impl ResearchService {
    pub fn new(
        client: Arc<dyn ResearchClient>,
        store: Arc<dyn CampaignStore>,
        clock: Arc<dyn Clock>,
        source: impl Into<String>,
        default_campaign: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            clock,
            source: source.into(),
            default_campaign: default_campaign.into(),
        }
    }

    fn campaign<'a>(&'a self, campaign: Option<&'a str>) -> &'a str {
        campaign
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.default_campaign)
    }

    async fn save_block(
        &self,
        campaign: &str,
        company_name: &str,
        value: Value,
    ) -> Result<ExtractedBlock, DomainError> {
        let contents = serde_json::to_string_pretty(&value)?;
        let file_name = artifact_file_name(ArtifactKind::ExtractedUseCases, "json", self.clock.now());
        let path = self
            .store
            .save(campaign, company_name, &file_name, &contents)
            .await?;

        Ok(ExtractedBlock { path, value })
    }
}

#[async_trait]
impl ResearchServiceTrait for ResearchService {
    #[instrument(skip(self))]
    async fn research(
        &self,
        company_name: &str,
        campaign: Option<&str>,
    ) -> Result<ResearchOutcome, DomainError> {
        let campaign = self.campaign(campaign);
        let request = ResearchRequest::new(company_name, self.source.as_str(), self.clock.now())?;
        let company = request.company_name.as_str();

        let body = self.client.research(&request).await?;
        let result = ResearchResult::parse(&body);

        let file_name = artifact_file_name(ArtifactKind::Research, result.extension(), self.clock.now());
        let research_path = self.store.save(campaign, company, &file_name, &body).await?;

        let extracted_path = match result.content().map(extract_json_block) {
            Some(Ok(Some(value))) => Some(self.save_block(campaign, company, value).await?.path),
            Some(Err(e)) => {
                warn!(company, error = %e, "Research content has an unreadable JSON block");
                None
            }
            _ => None,
        };

        info!(
            company,
            campaign,
            path = %research_path,
            citations = result.citations().len(),
            extracted = extracted_path.is_some(),
            "Research saved"
        );

        Ok(ResearchOutcome {
            saved: SavedResearch {
                campaign: campaign.to_string(),
                company: company.to_string(),
                research_path,
                extracted_path,
            },
            result,
        })
    }

    #[instrument(skip(self, content))]
    async fn extract(
        &self,
        campaign: Option<&str>,
        company_name: &str,
        content: &str,
    ) -> Result<ExtractedBlock, DomainError> {
        let company = company_name.trim();
        if company.is_empty() {
            return Err(DomainError::validation("Company name cannot be empty"));
        }

        let value = extract_json_block(content)?
            .ok_or_else(|| DomainError::validation("No ```json block found in content"))?;

        self.save_block(self.campaign(campaign), company, value).await
    }

    async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>, DomainError> {
        self.store.list_campaigns().await
    }
}
