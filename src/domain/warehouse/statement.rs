//! SQL statements with positional bindings

use serde::{Deserialize, Serialize};

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SqlValue {
    Text(String),
    Fixed(i64),
    Real(f64),
    Boolean(bool),
    Null,
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Binding type name understood by the SQL API
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) | Self::Null => "TEXT",
            Self::Fixed(_) => "FIXED",
            Self::Real(_) => "REAL",
            Self::Boolean(_) => "BOOLEAN",
        }
    }

    /// Bindings travel as strings; `None` binds SQL NULL
    pub fn to_wire(&self) -> Option<String> {
        match self {
            Self::Text(v) => Some(v.clone()),
            Self::Fixed(v) => Some(v.to_string()),
            Self::Real(v) => Some(v.to_string()),
            Self::Boolean(v) => Some(v.to_string()),
            Self::Null => None,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Fixed(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// One statement sent to the warehouse as a single request
///
/// Statements are always constructed whole. Bodies such as task definitions
/// contain `;` inside `BEGIN ... END` blocks, so multi-statement text is never
/// split back apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Short human-readable name used in logs and reports
    pub label: String,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<SqlValue>,
}

impl Statement {
    pub fn new(label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.bindings.push(value.into());
        self
    }

    /// First line of the SQL, trimmed, for log context
    pub fn summary(&self) -> String {
        let line = self.sql.trim().lines().next().unwrap_or_default().trim();
        line.chars().take(100).collect()
    }
}
