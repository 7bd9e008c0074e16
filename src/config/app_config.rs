use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub warehouse: WarehouseConfig,
    pub session_cache: SessionCacheConfig,
    pub pipeline: PipelineConfig,
    pub research: ResearchConfig,
    pub workflow_server: WorkflowServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Connection settings for the warehouse SQL API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Account URL, e.g. `https://<account>.snowflakecomputing.com`
    pub base_url: String,
    /// Bearer token (OAuth, key-pair JWT or programmatic access token)
    pub token: String,
    /// Value for `X-Snowflake-Authorization-Token-Type`
    pub token_type: String,
    pub role: String,
    pub warehouse: String,
    pub database: String,
    pub schema: Option<String>,
    /// Server-side statement timeout
    pub statement_timeout_secs: u64,
    /// Client-side HTTP timeout; `0` disables it
    pub http_timeout_secs: u64,
    /// Delay between status polls for statements still running
    pub poll_interval_ms: u64,
    /// Record statements instead of sending them
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionCacheConfig {
    pub ttl_hours: i64,
}

/// Settings baked into generated task definitions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub task_warehouse: String,
    pub schedule: String,
    pub classifier_model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    pub webhook_url: String,
    pub timeout_secs: u64,
    pub source: String,
    pub output_dir: String,
    pub default_campaign: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowServerConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost.snowflakecomputing.com".to_string(),
            token: String::new(),
            token_type: "OAUTH".to_string(),
            role: "ACCOUNTADMIN".to_string(),
            warehouse: "COMPUTE_WH".to_string(),
            database: "CALL_CENTER_ANALYTICS".to_string(),
            schema: None,
            statement_timeout_secs: 60,
            http_timeout_secs: 0,
            poll_interval_ms: 500,
            dry_run: false,
        }
    }
}

impl Default for SessionCacheConfig {
    fn default() -> Self {
        Self { ttl_hours: 8 }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            task_warehouse: "COMPUTE_WH".to_string(),
            schedule: "USING CRON 0 */1 * * * UTC".to_string(),
            classifier_model: "CORTEX_CLASSIFY".to_string(),
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            webhook_url: "http://localhost:5678/webhook/company-research".to_string(),
            timeout_secs: 300,
            source: "callcenter_analytics".to_string(),
            output_dir: "campaigns".to_string(),
            default_campaign: "default".to_string(),
        }
    }
}

impl Default for WorkflowServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5678".to_string(),
            api_token: None,
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
