//! Company research endpoints: webhook runs, extraction, campaigns and prompts

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::prompt::{get_prompt as find_prompt, list_prompts as all_prompts, DEFAULT_PROMPT};
use crate::domain::CampaignSummary;
use crate::infrastructure::services::{ExtractedBlock, ResearchOutcome};

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchRequestBody {
    pub company_name: String,
    #[serde(default)]
    pub campaign: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRequestBody {
    pub company_name: String,
    #[serde(default)]
    pub campaign: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListCampaignsResponse {
    pub campaigns: Vec<CampaignSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptSummary {
    pub name: &'static str,
    pub description: &'static str,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListPromptsResponse {
    pub prompts: Vec<PromptSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptQuery {
    /// Render the prompt for this company instead of returning the raw template
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptResponse {
    pub name: &'static str,
    pub description: &'static str,
    pub content: String,
    pub rendered: bool,
}

/// POST /research
pub async fn run_research(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequestBody>,
) -> Result<Json<ResearchOutcome>, ApiError> {
    debug!(company = %request.company_name, "Research requested");

    let outcome = state
        .research_service
        .research(&request.company_name, request.campaign.as_deref())
        .await?;

    Ok(Json(outcome))
}

/// POST /research/extract
pub async fn extract_use_cases(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequestBody>,
) -> Result<Json<ExtractedBlock>, ApiError> {
    let block = state
        .research_service
        .extract(
            request.campaign.as_deref(),
            &request.company_name,
            &request.content,
        )
        .await?;

    Ok(Json(block))
}

/// GET /campaigns
pub async fn list_campaigns(
    State(state): State<AppState>,
) -> Result<Json<ListCampaignsResponse>, ApiError> {
    let campaigns = state.research_service.list_campaigns().await?;
    let total = campaigns.len();

    Ok(Json(ListCampaignsResponse { campaigns, total }))
}

/// GET /prompts
pub async fn list_prompts() -> Json<ListPromptsResponse> {
    let prompts = all_prompts()
        .iter()
        .map(|p| PromptSummary {
            name: p.name,
            description: p.description,
            is_default: p.name == DEFAULT_PROMPT,
        })
        .collect();

    Json(ListPromptsResponse { prompts })
}

/// GET /prompts/{name}
pub async fn get_prompt(
    Path(name): Path<String>,
    Query(query): Query<PromptQuery>,
) -> Result<Json<PromptResponse>, ApiError> {
    let prompt =
        find_prompt(&name).ok_or_else(|| ApiError::not_found(format!("Prompt '{}' not found", name)))?;

    let (content, rendered) = match query.company_name.as_deref().map(str::trim) {
        Some(company) if !company.is_empty() => (
            prompt
                .render(company)
                .map_err(|e| ApiError::internal(e.to_string()))?,
            true,
        ),
        _ => (prompt.content.to_string(), false),
    };

    Ok(Json(PromptResponse {
        name: prompt.name,
        description: prompt.description,
        content,
        rendered,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::routes::test_support::{send, Mocks};
    use crate::domain::DomainError;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_research_saves_into_campaign() {
        let dir = TempDir::new().unwrap();
        let mut mocks = Mocks::new();
        mocks
            .research
            .expect_research()
            .withf(|r| r.company_name == "Apple Inc" && r.source == "api")
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "choices": [{"message": {"content": "Summary\n```json\n{\"use_cases\": []}\n```"}}],
                    "citations": ["https://apple.com"]
                })
                .to_string())
            });

        let (status, body) = send(
            mocks.router(dir.path()),
            Method::POST,
            "/research",
            Some(json!({"company_name": "Apple Inc", "campaign": "Q3"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["saved"]["campaign"], "Q3");
        assert_eq!(body["result"]["format"], "completion");
        assert_eq!(body["result"]["citations"][0], "https://apple.com");
        assert!(dir.path().join("Q3").join("Apple_Inc").is_dir());
        assert!(body["saved"]["extracted_path"].is_string());
    }

    #[tokio::test]
    async fn test_research_webhook_failure_is_bad_gateway() {
        let dir = TempDir::new().unwrap();
        let mut mocks = Mocks::new();
        mocks
            .research
            .expect_research()
            .returning(|_| Err(DomainError::research("Webhook not found at http://localhost:5678/webhook/company-research")));

        let (status, body) = send(
            mocks.router(dir.path()),
            Method::POST,
            "/research",
            Some(json!({"company_name": "Apple Inc"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "research");
    }

    #[tokio::test]
    async fn test_research_missing_company_field() {
        let dir = TempDir::new().unwrap();
        let (status, body) = send(
            Mocks::new().router(dir.path()),
            Method::POST,
            "/research",
            Some(json!({"campaign": "Q3"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_extract_and_list_campaigns() {
        let dir = TempDir::new().unwrap();
        let router = Mocks::new().router(dir.path());

        let (status, body) = send(
            router.clone(),
            Method::POST,
            "/research/extract",
            Some(json!({
                "company_name": "Acme",
                "content": "```json\n{\"use_cases\": [{\"use_case\": \"Churn\"}]}\n```"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"]["use_cases"][0]["use_case"], "Churn");

        let (status, body) = send(router, Method::GET, "/campaigns", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["campaigns"][0]["name"], "default");
        assert_eq!(body["campaigns"][0]["companies"][0]["file_count"], 1);
    }

    #[tokio::test]
    async fn test_prompts() {
        let dir = TempDir::new().unwrap();
        let router = Mocks::new().router(dir.path());

        let (status, body) = send(router.clone(), Method::GET, "/prompts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prompts"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["prompts"][0]["is_default"], true);

        let (status, body) = send(
            router.clone(),
            Method::GET,
            "/prompts/data_capture_strategy?company_name=Acme%20Corp",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rendered"], true);
        let content = body["content"].as_str().unwrap();
        assert!(content.contains("Acme Corp"));
        assert!(!content.contains("{company_name}"));

        let (status, _) = send(router, Method::GET, "/prompts/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
