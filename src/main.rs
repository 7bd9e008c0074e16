use clap::Parser;
use callcenter_analytics::cli::{self, research, serve, tenant, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::load_config(cli.dry_run);

    match cli.command {
        Command::Serve => serve::run(config).await,
        Command::Bootstrap => tenant::bootstrap(config).await,
        Command::Provision { tenant_id, name } => tenant::provision(config, &tenant_id, &name).await,
        Command::UseCases { tenant_id, file } => tenant::use_cases(config, &tenant_id, &file).await,
        Command::Pipeline { action } => tenant::pipeline(config, action).await,
        Command::Onboard {
            tenant_id,
            name,
            use_cases,
        } => tenant::onboard(config, &tenant_id, &name, &use_cases).await,
        Command::Research { company, campaign } => {
            research::run(config, &company, campaign.as_deref()).await
        }
    }
}
