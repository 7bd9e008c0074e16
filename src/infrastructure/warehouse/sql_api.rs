//! Snowflake SQL API v2 client
//!
//! One `POST /api/v2/statements` per statement. A `202` means the statement is
//! still running; its status URL is polled until it completes or the statement
//! timeout elapses. Results spread over several partitions are fetched one
//! partition at a time.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::WarehouseConfig;
use crate::domain::warehouse::{QueryResult, Row, SqlValue, Statement, WarehouseClient};
use crate::domain::DomainError;
use crate::infrastructure::http_client::{HttpClientTrait, HttpResponse};

const STATEMENTS_PATH: &str = "/api/v2/statements";

/// Connection settings resolved from configuration
#[derive(Debug, Clone)]
pub struct SqlApiSettings {
    pub base_url: String,
    pub token: String,
    pub token_type: String,
    pub role: String,
    pub warehouse: String,
    pub database: String,
    pub schema: Option<String>,
    pub statement_timeout: Duration,
    pub poll_interval: Duration,
}

impl From<&WarehouseConfig> for SqlApiSettings {
    fn from(config: &WarehouseConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            token_type: config.token_type.clone(),
            role: config.role.clone(),
            warehouse: config.warehouse.clone(),
            database: config.database.clone(),
            schema: config.schema.clone().filter(|s| !s.is_empty()),
            statement_timeout: Duration::from_secs(config.statement_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
        }
    }
}

#[derive(Debug, Serialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: &'static str,
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    database: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    warehouse: &'a str,
    role: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    bindings: BTreeMap<String, Binding>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowType {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    row_type: Vec<RowType>,
    #[serde(default)]
    partition_info: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    statement_handle: Option<String>,
    #[serde(default)]
    statement_status_url: Option<String>,
    #[serde(default)]
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

/// Warehouse client speaking the SQL API over an injectable HTTP client
#[derive(Debug)]
pub struct SqlApiClient<C: HttpClientTrait> {
    client: C,
    settings: SqlApiSettings,
    auth_header: String,
}

impl<C: HttpClientTrait> SqlApiClient<C> {
    pub fn new(client: C, settings: SqlApiSettings) -> Self {
        let auth_header = format!("Bearer {}", settings.token);
        Self {
            client,
            settings,
            auth_header,
        }
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Accept", "application/json"),
            ("Content-Type", "application/json"),
            ("User-Agent", concat!("callcenter-analytics/", env!("CARGO_PKG_VERSION"))),
        ];
        if !self.settings.token_type.is_empty() {
            headers.push((
                "X-Snowflake-Authorization-Token-Type",
                self.settings.token_type.as_str(),
            ));
        }
        headers
    }

    fn build_request<'a>(&'a self, statement: &'a Statement) -> StatementRequest<'a> {
        let bindings = statement
            .bindings
            .iter()
            .enumerate()
            .map(|(i, value)| ((i + 1).to_string(), to_binding(value)))
            .collect();

        StatementRequest {
            statement: &statement.sql,
            timeout: self.settings.statement_timeout.as_secs(),
            database: &self.settings.database,
            schema: self.settings.schema.as_deref(),
            warehouse: &self.settings.warehouse,
            role: &self.settings.role,
            bindings,
        }
    }

    /// Absolute URL for a status path returned by the API
    fn resolve(&self, status_url: &str) -> String {
        if status_url.starts_with("http://") || status_url.starts_with("https://") {
            status_url.to_string()
        } else {
            format!("{}{}", self.settings.base_url, status_url)
        }
    }

    async fn wait_for_completion(
        &self,
        mut response: HttpResponse,
        started: Instant,
    ) -> Result<StatementResponse, DomainError> {
        loop {
            match response.status {
                200 => return response.json(),
                202 => {
                    let pending: StatementResponse = response.json()?;
                    let status_url = pending.statement_status_url.ok_or_else(|| {
                        DomainError::warehouse("Statement accepted without a status URL")
                    })?;

                    if started.elapsed() >= self.settings.statement_timeout {
                        return Err(DomainError::transport(format!(
                            "Statement {} still running after {:?}",
                            pending.statement_handle.unwrap_or_default(),
                            self.settings.statement_timeout
                        )));
                    }

                    debug!(status_url = %status_url, "Statement still running, polling");
                    tokio::time::sleep(self.settings.poll_interval).await;
                    response = self.client.get(&self.resolve(&status_url), self.headers()).await?;
                }
                _ => return Err(error_from_response(&response)),
            }
        }
    }

    /// Fetch partitions after the first one and append their rows
    async fn fetch_partitions(
        &self,
        result: &mut StatementResponse,
        partition_count: usize,
    ) -> Result<(), DomainError> {
        let handle = result
            .statement_handle
            .clone()
            .ok_or_else(|| DomainError::warehouse("Partitioned result without a statement handle"))?;

        for partition in 1..partition_count {
            let url = format!(
                "{}{}/{}?partition={}",
                self.settings.base_url, STATEMENTS_PATH, handle, partition
            );
            let response = self.client.get(&url, self.headers()).await?;
            if !response.is_success() {
                return Err(error_from_response(&response));
            }

            let page: StatementResponse = response.json()?;
            result.data.extend(page.data);
        }

        Ok(())
    }
}

fn to_binding(value: &SqlValue) -> Binding {
    Binding {
        kind: value.type_name(),
        value: value.to_wire(),
    }
}

fn error_from_response(response: &HttpResponse) -> DomainError {
    let parsed: Option<StatementResponse> = serde_json::from_str(&response.body).ok();
    let message = parsed
        .as_ref()
        .and_then(|r| r.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}: {}", response.status, response.body));

    if response.status == 401 {
        return DomainError::unauthorized(message);
    }

    match parsed.and_then(|r| r.code) {
        Some(code) => DomainError::warehouse_with_code(message, code),
        None => DomainError::warehouse(message),
    }
}

#[async_trait]
impl<C: HttpClientTrait> WarehouseClient for SqlApiClient<C> {
    async fn execute(&self, statement: &Statement) -> Result<QueryResult, DomainError> {
        let url = format!(
            "{}{}?requestId={}",
            self.settings.base_url,
            STATEMENTS_PATH,
            Uuid::new_v4()
        );
        let body = serde_json::to_value(self.build_request(statement))?;

        debug!(label = %statement.label, sql = %statement.summary(), "Executing statement");

        let started = Instant::now();
        let response = self.client.post_json(&url, self.headers(), &body).await?;
        let mut result = self.wait_for_completion(response, started).await?;

        let meta = result.result_set_meta_data.take().unwrap_or_default();
        if meta.partition_info.len() > 1 {
            self.fetch_partitions(&mut result, meta.partition_info.len())
                .await?;
        }

        if let Some(code) = result.code.as_deref().filter(|c| *c != "090001") {
            warn!(label = %statement.label, code = %code, "Statement completed with non-standard code");
        }

        Ok(QueryResult {
            columns: meta.row_type.into_iter().map(|c| c.name).collect(),
            rows: result.data.into_iter().map(Row::new).collect(),
            statement_handle: result.statement_handle,
            message: result.message,
        })
    }
}
