//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, LogFormat, LoggingConfig, PipelineConfig, ResearchConfig, ServerConfig,
    SessionCacheConfig, WarehouseConfig, WorkflowServerConfig,
};
