//! Tenant identifier validation

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for tenant IDs
pub const MAX_TENANT_ID_LENGTH: usize = 64;

/// Tenant IDs are spliced into SQL identifiers, so only word characters are allowed
static TENANT_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

/// Tenant validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum TenantValidationError {
    /// Tenant ID is empty
    EmptyId,
    /// Tenant ID exceeds maximum length
    IdTooLong { length: usize, max: usize },
    /// Tenant ID contains characters not allowed in an identifier
    InvalidIdFormat { id: String },
    /// Display name is blank
    EmptyDisplayName,
}

impl fmt::Display for TenantValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Tenant ID cannot be empty"),
            Self::IdTooLong { length, max } => {
                write!(f, "Tenant ID too long: {} characters (max {})", length, max)
            }
            Self::InvalidIdFormat { id } => write!(
                f,
                "Invalid tenant ID format '{}': only letters, digits and underscores are allowed",
                id
            ),
            Self::EmptyDisplayName => write!(f, "Display name cannot be empty"),
        }
    }
}

impl std::error::Error for TenantValidationError {}

/// Validate a tenant ID
pub fn validate_tenant_id(id: &str) -> Result<(), TenantValidationError> {
    if id.is_empty() {
        return Err(TenantValidationError::EmptyId);
    }

    if id.len() > MAX_TENANT_ID_LENGTH {
        return Err(TenantValidationError::IdTooLong {
            length: id.len(),
            max: MAX_TENANT_ID_LENGTH,
        });
    }

    if !TENANT_ID_PATTERN.is_match(id) {
        return Err(TenantValidationError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

/// Validate a tenant display name
pub fn validate_display_name(name: &str) -> Result<(), TenantValidationError> {
    if name.trim().is_empty() {
        return Err(TenantValidationError::EmptyDisplayName);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tenant_ids() {
        assert!(validate_tenant_id("TEST001").is_ok());
        assert!(validate_tenant_id("acme_corp").is_ok());
        assert!(validate_tenant_id("a").is_ok());
        assert!(validate_tenant_id(&"X".repeat(MAX_TENANT_ID_LENGTH)).is_ok());
    }

    #[test]
    fn test_empty_tenant_id() {
        assert_eq!(validate_tenant_id(""), Err(TenantValidationError::EmptyId));
    }

    #[test]
    fn test_tenant_id_too_long() {
        let id = "X".repeat(MAX_TENANT_ID_LENGTH + 1);
        assert!(matches!(
            validate_tenant_id(&id),
            Err(TenantValidationError::IdTooLong { .. })
        ));
    }

    #[test]
    fn test_tenant_id_rejects_sql_metacharacters() {
        for id in ["acme-corp", "acme corp", "a;DROP", "a.b", "x'y", "ünicode"] {
            assert!(
                matches!(
                    validate_tenant_id(id),
                    Err(TenantValidationError::InvalidIdFormat { .. })
                ),
                "expected {id:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_display_name() {
        assert!(validate_display_name("Test Customer Inc").is_ok());
        assert_eq!(
            validate_display_name("   "),
            Err(TenantValidationError::EmptyDisplayName)
        );
    }
}
