//! Health endpoint

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub checks: Vec<HealthCheck>,
    pub latency_ms: u64,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /health
///
/// Always 200 while the process serves requests. An unreachable workflow
/// server only degrades the research workflow endpoints.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();

    let workflow_server = if state.workflow_service.is_running().await {
        HealthCheck {
            name: "workflow_server".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        }
    } else {
        HealthCheck {
            name: "workflow_server".to_string(),
            status: HealthStatus::Degraded,
            message: Some("Workflow server is not reachable".to_string()),
        }
    };

    let response = HealthResponse {
        status: workflow_server.status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: vec![workflow_server],
        latency_ms: start.elapsed().as_millis() as u64,
    };

    (StatusCode::OK, Json(response))
}
