// fabric-provisioner/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use fabric_provisioner_core::infrastructure::config::ProvisionerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // stdout carries the JSON response, logs go to stderr.
    // RUST_LOG=debug fabric-provisioner provision ... for the details
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    // 2. Load the Config (Infra)
    let config = ProvisionerConfig::load(cli.config.as_deref())?;

    // 3. Dispatch to use case handlers
    match cli.command {
        Commands::Provision {
            descriptor,
            component_id,
        } => commands::provision::execute(&config, descriptor, component_id).await,

        Commands::Unprovision {
            descriptor,
            component_id,
        } => commands::unprovision::execute(&config, descriptor, component_id).await,

        Commands::UpdateAcl {
            descriptor,
            component_id,
            subjects,
        } => commands::update_acl::execute(&config, descriptor, component_id, subjects).await,

        Commands::Validate { descriptor } => commands::validate::execute(descriptor).await,

        Commands::Status { token } => commands::status::execute(token).await,
    }
}
