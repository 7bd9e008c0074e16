//! Warehouse domain - statements, results and the client seam

mod client;
mod session;
mod statement;

pub use client::{QueryResult, Row, WarehouseClient};
pub use session::{SessionContext, SESSION_CONTEXT_QUERY};
pub use statement::{SqlValue, Statement};

#[cfg(test)]
pub use client::MockWarehouseClient;
