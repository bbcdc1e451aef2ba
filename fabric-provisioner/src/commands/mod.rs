// fabric-provisioner/src/commands/mod.rs

pub mod provision;
pub mod status;
pub mod unprovision;
pub mod update_acl;
pub mod validate;

use std::sync::Arc;
use tracing::info;

use fabric_provisioner_core::application::{DirectoryResolver, Provisioner, WarehouseClient};
use fabric_provisioner_core::domain::status::ValidationResponse;
use fabric_provisioner_core::domain::ProvisioningResponse;
use fabric_provisioner_core::infrastructure::adapters::{
    EntraTokenProvider, FabricRestClient, GraphDirectoryClient, TdsDriver, build_client,
};
use fabric_provisioner_core::infrastructure::config::ProvisionerConfig;
use fabric_provisioner_core::ports::TokenProvider;

/// Wires the platform adapters into the orchestrator (dependency injection).
pub fn build_provisioner(config: &ProvisionerConfig) -> anyhow::Result<Provisioner> {
    let credentials = config.client_credentials()?;
    let http = build_client(config.http_timeout())?;

    let tokens: Arc<dyn TokenProvider> = Arc::new(EntraTokenProvider::new(
        http.clone(),
        &config.endpoints.authority_host,
        credentials,
    ));
    let directory = Arc::new(GraphDirectoryClient::new(
        http.clone(),
        &config.endpoints.graph_base_url,
    ));
    let workspaces = Arc::new(FabricRestClient::new(
        http,
        &config.endpoints.powerbi_base_url,
        &config.endpoints.fabric_base_url,
    ));

    let resolver = DirectoryResolver::new(tokens.clone(), directory);
    let warehouse = WarehouseClient::new(
        workspaces,
        Arc::new(TdsDriver::new(config.sql.port)),
        tokens,
        config.warehouse_settings(),
    );
    info!(
        fabric = %config.endpoints.fabric_base_url,
        access_role = %config.access_role_name,
        "Platform clients ready"
    );
    Ok(Provisioner::new(resolver, Arc::new(warehouse)))
}

/// Prints the response as JSON. Anything but COMPLETED exits with code 1.
pub fn report(response: &ProvisioningResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if !response.is_completed() {
        std::process::exit(1);
    }
    Ok(())
}

pub fn report_validation(response: &ValidationResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if !matches!(response, ValidationResponse::Result(r) if r.valid) {
        std::process::exit(1);
    }
    Ok(())
}
