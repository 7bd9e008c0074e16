//! Research webhook client and campaign file storage

mod file_store;
mod webhook;

pub use file_store::FileCampaignStore;
pub use webhook::WebhookResearchClient;
