//! Command line interface
//!
//! `serve` runs the HTTP API. Every other subcommand performs one operation
//! against the configured warehouse or research webhook, prints its report as
//! JSON on stdout and exits non-zero when any part of it failed.

pub mod research;
pub mod serve;
pub mod tenant;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Call center analytics provisioner
#[derive(Parser)]
#[command(name = "callcenter-analytics")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Record warehouse statements instead of sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve,

    /// Create the shared database, registry and provisioning procedure
    Bootstrap,

    /// Provision a tenant namespace
    Provision {
        #[arg(long)]
        tenant_id: String,
        /// Display name of the customer
        #[arg(long)]
        name: String,
    },

    /// Deploy use cases from a JSON file
    UseCases {
        #[arg(long)]
        tenant_id: String,
        /// Array of use cases, or an object with a `use_cases` array
        #[arg(long)]
        file: PathBuf,
    },

    /// Generate, deploy or re-drive the topic detection pipeline
    Pipeline {
        #[command(subcommand)]
        action: PipelineAction,
    },

    /// Provision, deploy use cases and pipeline, then activate the tenant
    Onboard {
        #[arg(long)]
        tenant_id: String,
        #[arg(long)]
        name: String,
        /// JSON file with the use cases to deploy
        #[arg(long)]
        use_cases: PathBuf,
    },

    /// Research a company through the research webhook
    Research {
        #[arg(long)]
        company: String,
        /// Campaign directory; the configured default when omitted
        #[arg(long)]
        campaign: Option<String>,
    },
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum PipelineAction {
    /// Print the pipeline script without touching the warehouse
    Render {
        #[arg(long)]
        tenant_id: String,
    },
    /// Create and resume the pipeline tasks
    Deploy {
        #[arg(long)]
        tenant_id: String,
    },
    /// Requeue FAILED transcripts
    Redrive {
        #[arg(long)]
        tenant_id: String,
    },
}

/// Load `.env` and layered configuration, then install logging
pub fn load_config(dry_run: bool) -> AppConfig {
    dotenvy::dotenv().ok();

    let loaded = AppConfig::load();
    let mut config = loaded.as_ref().cloned().unwrap_or_default();
    if dry_run {
        config.warehouse.dry_run = true;
    }

    logging::init_logging(&config.logging);
    if let Err(e) = loaded {
        tracing::warn!(error = %e, "Failed to load configuration, using defaults");
    }
    config
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
