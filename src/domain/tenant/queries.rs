//! Statements against the tenant registry and provisioning procedure

use chrono::{DateTime, NaiveDateTime, Utc};

use super::{Tenant, TenantId, TenantStatus};
use crate::domain::schema::{
    CREATE_CUSTOMER_SCHEMA_PROCEDURE, CUSTOMERS, SHARED_CONFIG_SCHEMA, SHARED_UTILS_SCHEMA,
};
use crate::domain::warehouse::{Row, Statement};
use crate::domain::DomainError;

pub fn call_create_customer_schema(tenant_id: &TenantId, display_name: &str) -> Statement {
    Statement::new(
        format!("provision {}", tenant_id),
        format!(
            "CALL {}.{}(?, ?)",
            SHARED_UTILS_SCHEMA, CREATE_CUSTOMER_SCHEMA_PROCEDURE
        ),
    )
    .bind(tenant_id.as_str())
    .bind(display_name)
}

pub fn select_customers() -> Statement {
    Statement::new(
        "select customers",
        format!(
            "SELECT customer_id, customer_name, schema_name, status, created_at FROM {}.{}",
            SHARED_CONFIG_SCHEMA, CUSTOMERS.name
        ),
    )
}

pub fn update_status(tenant_id: &TenantId, status: TenantStatus) -> Statement {
    Statement::new(
        format!("set {} {}", tenant_id, status),
        format!(
            "UPDATE {}.{} SET status = ? WHERE customer_id = ?",
            SHARED_CONFIG_SCHEMA, CUSTOMERS.name
        ),
    )
    .bind(status.as_str())
    .bind(tenant_id.as_str())
}

/// Activate a tenant only from a state that allows it, so a RETIRED tenant
/// stays retired. The affected row count tells whether activation happened.
pub fn activate(tenant_id: &TenantId) -> Statement {
    Statement::new(
        format!("activate {}", tenant_id),
        format!(
            "UPDATE {}.{} SET status = ? WHERE customer_id = ? AND status IN (?, ?)",
            SHARED_CONFIG_SCHEMA, CUSTOMERS.name
        ),
    )
    .bind(TenantStatus::Active.as_str())
    .bind(tenant_id.as_str())
    .bind(TenantStatus::Created.as_str())
    .bind(TenantStatus::Active.as_str())
}

/// The SQL API returns timestamps either as epoch seconds (`1718000000.000000000`)
/// or as text, depending on the session's output format
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(secs) = raw.parse::<f64>() {
        return DateTime::from_timestamp(secs.trunc() as i64, (secs.fract() * 1e9) as u32);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Decode a registry row selected by `select_customers`
pub fn tenant_from_row(row: &Row) -> Result<Tenant, DomainError> {
    let id = TenantId::new(row.get_string(0))?;
    let status = match row.get_str(3) {
        Some(s) => s.parse()?,
        None => TenantStatus::default(),
    };

    let mut tenant = Tenant::new(id, row.get_string(1)).with_status(status);

    if let Some(namespace) = row.get_str(2).filter(|s| !s.is_empty()) {
        tenant.namespace = namespace.to_string();
    }

    if let Some(created_at) = row.get_str(4).and_then(parse_timestamp) {
        tenant = tenant.with_created_at(created_at);
    }

    Ok(tenant)
}
