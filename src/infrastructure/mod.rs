//! Infrastructure layer - External service implementations

pub mod http_client;
pub mod logging;
pub mod research;
pub mod services;
pub mod warehouse;
pub mod workflow;
