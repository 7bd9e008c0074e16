//! Workflow server client

mod n8n_client;

pub use n8n_client::N8nClient;
