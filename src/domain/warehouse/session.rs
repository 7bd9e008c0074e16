//! Session metadata resolved from the warehouse after connecting

use serde::{Deserialize, Serialize};

use super::Row;

/// Query that resolves the session context on first use
pub const SESSION_CONTEXT_QUERY: &str =
    "SELECT CURRENT_USER(), CURRENT_ROLE(), CURRENT_WAREHOUSE(), CURRENT_DATABASE(), CURRENT_SCHEMA()";

/// Connection metadata worth reusing across statements
///
/// Only names are held here, never credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user: Option<String>,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
}

impl SessionContext {
    pub fn from_row(row: &Row) -> Self {
        let cell = |i: usize| row.get_str(i).map(str::to_string);
        Self {
            user: cell(0),
            role: cell(1),
            warehouse: cell(2),
            database: cell(3),
            schema: cell(4),
        }
    }
}
