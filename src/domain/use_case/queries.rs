//! Statements against a tenant's USE_CASES table

use super::UseCase;
use crate::domain::tenant::TenantId;
use crate::domain::warehouse::Statement;
use crate::domain::DomainError;

/// Column order shared by inserts, selects and `UseCase::from_row`
pub const USE_CASE_COLUMNS: &str = "use_case_id, use_case_name, description, topics_to_track, \
     business_value_context, confidence_threshold, is_active";

/// Insert one use case. `PARSE_JSON` is not allowed in a VALUES clause, hence INSERT ... SELECT.
pub fn insert_use_case(tenant: &TenantId, use_case: &UseCase) -> Result<Statement, DomainError> {
    let sql = format!(
        "INSERT INTO {}.USE_CASES ({}) SELECT ?, ?, ?, PARSE_JSON(?), ?, ?, ?",
        tenant.namespace(),
        USE_CASE_COLUMNS
    );

    Ok(Statement::new(format!("insert {}", use_case.use_case_id), sql)
        .bind(use_case.use_case_id.as_str())
        .bind(use_case.use_case_name.as_str())
        .bind(use_case.description.as_str())
        .bind(use_case.topics_json()?)
        .bind(use_case.business_value_context.as_str())
        .bind(use_case.confidence_threshold)
        .bind(use_case.is_active))
}

pub fn select_active_use_cases(tenant: &TenantId) -> Statement {
    Statement::new(
        "select use cases",
        format!(
            "SELECT {} FROM {}.USE_CASES WHERE is_active = TRUE",
            USE_CASE_COLUMNS,
            tenant.namespace()
        ),
    )
}

/// Soft delete; rows are never removed
pub fn deactivate_use_case(tenant: &TenantId, use_case_id: &str) -> Statement {
    Statement::new(
        format!("deactivate {}", use_case_id),
        format!(
            "UPDATE {}.USE_CASES SET is_active = FALSE WHERE use_case_id = ?",
            tenant.namespace()
        ),
    )
    .bind(use_case_id)
}
