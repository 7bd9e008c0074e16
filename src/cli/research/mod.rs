//! Research command - calls the research webhook and saves the result

use tracing::info;

use super::print_json;
use crate::api::AppState;
use crate::config::AppConfig;

pub async fn run(config: AppConfig, company: &str, campaign: Option<&str>) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let outcome = state.research_service.research(company, campaign).await?;

    info!(
        company,
        path = %outcome.saved.research_path,
        "Research saved"
    );
    print_json(&outcome)
}
