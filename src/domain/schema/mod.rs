//! Warehouse schema layout and bootstrap DDL

mod bootstrap;
mod catalog;

pub use bootstrap::{create_customer_schema_procedure, database_structure, quote_literal};
pub use catalog::*;
