//! Warehouse client trait and result types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use super::Statement;
use crate::domain::DomainError;

/// One result row; the SQL API returns every cell as a nullable string
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<Option<String>>);

impl Row {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self(cells)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|c| c.as_deref())
    }

    pub fn get_string(&self, index: usize) -> String {
        self.get_str(index).unwrap_or_default().to_string()
    }

    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.get_str(index).and_then(|v| v.trim().parse().ok())
    }

    pub fn get_bool(&self, index: usize) -> Option<bool> {
        match self.get_str(index)?.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

/// Result of a single statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub statement_handle: Option<String>,
    pub message: Option<String>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            ..Default::default()
        }
    }

    pub fn first_value(&self) -> Option<&str> {
        self.rows.first().and_then(|r| r.get_str(0))
    }

    /// Row count reported by DML statements (first cell of the first row)
    pub fn rows_affected(&self) -> u64 {
        self.first_value()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Issues statements against the warehouse, one request per statement
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    async fn execute(&self, statement: &Statement) -> Result<QueryResult, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[Option<&str>]) -> Row {
        Row::new(cells.iter().map(|c| c.map(str::to_string)).collect())
    }

    #[test]
    fn test_row_accessors() {
        let row = row(&[Some("UC_1"), Some("0.75"), Some("true"), None]);

        assert_eq!(row.get_str(0), Some("UC_1"));
        assert_eq!(row.get_f64(1), Some(0.75));
        assert_eq!(row.get_bool(2), Some(true));
        assert_eq!(row.get_str(3), None);
        assert_eq!(row.get_string(3), "");
        assert_eq!(row.get_str(10), None);
    }

    #[test]
    fn test_rows_affected() {
        let result = QueryResult::with_rows(
            vec!["number of rows updated".to_string()],
            vec![row(&[Some("3")])],
        );
        assert_eq!(result.rows_affected(), 3);
        assert_eq!(QueryResult::empty().rows_affected(), 0);
    }

    #[test]
    fn test_row_deserializes_from_array() {
        let row: Row = serde_json::from_str(r#"["a", null, "1"]"#).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row.get_bool(2), Some(true));
    }
}
