//! Warehouse transport: SQL API client, session cache and dry-run stand-in

mod connection;
mod dry_run;
mod session_cache;
mod sql_api;

use std::sync::Arc;
use std::time::Duration;

pub use connection::WarehouseConnection;
pub use dry_run::DryRunWarehouse;
pub use session_cache::SessionCache;
pub use sql_api::{SqlApiClient, SqlApiSettings};

use crate::config::{SessionCacheConfig, WarehouseConfig};
use crate::domain::{Clock, DomainError, WarehouseClient};
use crate::infrastructure::http_client::HttpClient;

/// Build the configured warehouse client: dry-run or SQL API, wrapped in a
/// session-caching connection either way
pub fn build_warehouse(
    config: &WarehouseConfig,
    cache_config: &SessionCacheConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn WarehouseClient>, DomainError> {
    let cache = SessionCache::new(clock, chrono::Duration::hours(cache_config.ttl_hours));

    if config.dry_run {
        return Ok(Arc::new(WarehouseConnection::new(DryRunWarehouse::new(), cache)));
    }

    if config.token.is_empty() {
        return Err(DomainError::configuration(
            "warehouse.token is required unless warehouse.dry_run is set",
        ));
    }

    let timeout = (config.http_timeout_secs > 0).then(|| Duration::from_secs(config.http_timeout_secs));
    let http = HttpClient::with_timeout(timeout)?;
    let client = SqlApiClient::new(http, SqlApiSettings::from(config));

    Ok(Arc::new(WarehouseConnection::new(client, cache)))
}
