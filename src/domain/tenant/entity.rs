//! Tenant domain entities

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::validate_tenant_id;
use crate::domain::DomainError;

/// Prefix of every per-tenant namespace
pub const NAMESPACE_PREFIX: &str = "CUSTOMER_";

/// Caller-supplied tenant identifier, validated to be safe inside a SQL identifier.
/// Stored uppercased: namespaces are case-insensitive, so `acme` and `ACME` are one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_tenant_id(&id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        Ok(Self(id.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace (schema) owned by this tenant, e.g. `TEST001` -> `CUSTOMER_TEST001`
    pub fn namespace(&self) -> String {
        format!("{}{}", NAMESPACE_PREFIX, self.0)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TenantId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl FromStr for TenantId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Lifecycle of a tenant namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    #[default]
    Created,
    Active,
    Retired,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Active => "ACTIVE",
            Self::Retired => "RETIRED",
        }
    }

    /// Status only moves forward; setting the current status again is allowed
    pub fn can_transition_to(&self, next: TenantStatus) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Created | Self::Active | Self::Retired)
                | (Self::Active, Self::Active | Self::Retired)
                | (Self::Retired, Self::Retired)
        )
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREATED" => Ok(Self::Created),
            "ACTIVE" => Ok(Self::Active),
            "RETIRED" => Ok(Self::Retired),
            other => Err(DomainError::validation(format!(
                "Unknown tenant status '{}'",
                other
            ))),
        }
    }
}

/// A customer with its own isolated namespace in the warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub display_name: String,
    pub namespace: String,
    pub status: TenantStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn new(id: TenantId, display_name: impl Into<String>) -> Self {
        let namespace = id.namespace();
        Self {
            id,
            display_name: display_name.into(),
            namespace,
            status: TenantStatus::Created,
            created_at: None,
        }
    }

    pub fn with_status(mut self, status: TenantStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_is_uppercased() {
        let id = TenantId::new("TEST001").unwrap();
        assert_eq!(id.namespace(), "CUSTOMER_TEST001");

        let id = TenantId::new("acme_corp").unwrap();
        assert_eq!(id.namespace(), "CUSTOMER_ACME_CORP");
    }

    #[test]
    fn test_ids_differing_in_case_are_one_tenant() {
        let lower = TenantId::new("acme").unwrap();
        let upper = TenantId::new("ACME").unwrap();

        assert_eq!(lower, upper);
        assert_eq!(lower.as_str(), "ACME");
        assert_eq!(lower.namespace(), upper.namespace());
    }

    #[test]
    fn test_invalid_tenant_id() {
        let result = TenantId::new("acme; DROP TABLE");
        assert!(matches!(result, Err(DomainError::InvalidId { .. })));
    }

    #[test]
    fn test_tenant_id_deserialization_validates() {
        let ok: TenantId = serde_json::from_str("\"TEST001\"").unwrap();
        assert_eq!(ok.as_str(), "TEST001");

        assert!(serde_json::from_str::<TenantId>("\"bad-id\"").is_err());
    }

    #[test]
    fn test_new_tenant_starts_created() {
        let tenant = Tenant::new(TenantId::new("TEST001").unwrap(), "Test Customer Inc");
        assert_eq!(tenant.namespace, "CUSTOMER_TEST001");
        assert_eq!(tenant.status, TenantStatus::Created);
    }

    #[test]
    fn test_status_transitions() {
        use TenantStatus::*;

        assert!(Created.can_transition_to(Active));
        assert!(Created.can_transition_to(Retired));
        assert!(Active.can_transition_to(Retired));
        assert!(Active.can_transition_to(Active));
        assert!(!Active.can_transition_to(Created));
        assert!(!Retired.can_transition_to(Active));
        assert!(!Retired.can_transition_to(Created));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("active".parse::<TenantStatus>().unwrap(), TenantStatus::Active);
        assert_eq!("RETIRED".parse::<TenantStatus>().unwrap(), TenantStatus::Retired);
        assert!("deleted".parse::<TenantStatus>().is_err());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TenantStatus::Active).unwrap();
        assert_eq!(json, "\"ACTIVE\"");
    }
}
