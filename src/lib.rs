//! Call Center Analytics Provisioner
//!
//! Provisions per-tenant analytics namespaces in a cloud data warehouse:
//! - Shared database structure and tenant registry
//! - Tenant namespaces created through a provisioning procedure
//! - Use case deployment into each tenant's configuration table
//! - A three stage task pipeline for topic detection over call transcripts
//! - Company research through a webhook, persisted per campaign
//! - Research workflow management on an n8n server

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
