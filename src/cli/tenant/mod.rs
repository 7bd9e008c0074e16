//! Tenant commands: bootstrap, provisioning, use cases, pipeline and onboarding

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::json;
use tracing::info;

use super::{print_json, PipelineAction};
use crate::api::routes::tenants::UseCasesPayload;
use crate::api::AppState;
use crate::config::AppConfig;
use crate::domain::{
    Clock, DeploymentReport, PipelineDefinition, PipelineSettings, SystemClock, TenantId,
    UseCaseDraft,
};

pub async fn bootstrap(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let report = state.provisioning_service.deploy_database_structure().await;
    finish_report("Database structure", &report)
}

pub async fn provision(config: AppConfig, tenant_id: &str, name: &str) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let provisioned = state
        .provisioning_service
        .create_tenant_namespace(tenant_id, name)
        .await;

    print_json(&json!({
        "tenant_id": tenant_id,
        "provisioned": provisioned,
    }))?;

    if !provisioned {
        bail!("Provisioning failed for tenant {}", tenant_id);
    }
    Ok(())
}

pub async fn use_cases(config: AppConfig, tenant_id: &str, file: &Path) -> anyhow::Result<()> {
    let drafts = read_drafts(file).await?;
    info!(tenant_id, count = drafts.len(), "Deploying use cases from file");

    let state = AppState::from_config(&config)?;
    let report = state
        .use_case_service
        .deploy_use_cases(tenant_id, drafts)
        .await?;
    finish_report("Use case deployment", &report)
}

pub async fn pipeline(config: AppConfig, action: PipelineAction) -> anyhow::Result<()> {
    match action {
        PipelineAction::Render { tenant_id } => {
            println!("{}", render_pipeline(&config, &tenant_id, &SystemClock)?);
            Ok(())
        }
        PipelineAction::Deploy { tenant_id } => {
            let state = AppState::from_config(&config)?;
            let report = state.pipeline_service.deploy(&tenant_id).await?;
            finish_report("Pipeline deployment", &report)
        }
        PipelineAction::Redrive { tenant_id } => {
            let state = AppState::from_config(&config)?;
            let requeued = state.pipeline_service.redrive_failed(&tenant_id).await?;
            print_json(&json!({
                "tenant_id": tenant_id,
                "requeued": requeued,
            }))
        }
    }
}

pub async fn onboard(
    config: AppConfig,
    tenant_id: &str,
    name: &str,
    file: &Path,
) -> anyhow::Result<()> {
    let drafts = read_drafts(file).await?;

    let state = AppState::from_config(&config)?;
    let report = state
        .onboarding_service
        .onboard(tenant_id, name, drafts)
        .await?;
    print_json(&report)?;

    if !report.succeeded() {
        bail!("Onboarding of tenant {} did not complete", tenant_id);
    }
    Ok(())
}

fn render_pipeline(config: &AppConfig, tenant_id: &str, clock: &dyn Clock) -> anyhow::Result<String> {
    let tenant = TenantId::new(tenant_id)?;
    let settings = PipelineSettings::from(&config.pipeline);
    Ok(PipelineDefinition::generate(&tenant, &settings, clock.now()).render())
}

async fn read_drafts(file: &Path) -> anyhow::Result<Vec<UseCaseDraft>> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let payload: UseCasesPayload = serde_json::from_str(&content)
        .with_context(|| format!("Invalid use case file {}", file.display()))?;
    Ok(payload.into_drafts())
}

fn finish_report(what: &str, report: &DeploymentReport) -> anyhow::Result<()> {
    print_json(report)?;
    if !report.succeeded() {
        bail!(
            "{} finished with {} of {} statements failed",
            what,
            report.outcomes.len() - report.succeeded_count(),
            report.outcomes.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FixedClock;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_drafts_accepts_both_shapes() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("list.json");
        let wrapped = dir.path().join("wrapped.json");
        tokio::fs::write(&list, r#"[{"use_case": "Complaints"}]"#).await.unwrap();
        tokio::fs::write(&wrapped, r#"{"use_cases": [{"use_case": "A"}, {"use_case": "B"}]}"#)
            .await
            .unwrap();

        assert_eq!(read_drafts(&list).await.unwrap().len(), 1);
        assert_eq!(read_drafts(&wrapped).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_read_drafts_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_drafts(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_render_pipeline_offline() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap());
        let script = render_pipeline(&AppConfig::default(), "TEST001", &clock).unwrap();

        assert!(script.contains("CUSTOMER_TEST001"));
        assert!(script.contains("PROCESS_TRANSCRIPTS"));
        assert!(script.contains("DETECT_TOPICS"));
    }

    #[test]
    fn test_render_pipeline_rejects_bad_tenant() {
        let clock = FixedClock::new(Utc::now());
        assert!(render_pipeline(&AppConfig::default(), "bad id;", &clock).is_err());
    }
}
