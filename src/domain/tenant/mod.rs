//! Tenant domain module - customer namespaces in the shared warehouse

mod entity;
pub mod queries;
mod validation;

pub use entity::*;
pub use validation::*;
