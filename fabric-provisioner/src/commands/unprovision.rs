// fabric-provisioner/src/commands/unprovision.rs
//
// USE CASE: Unprovision an output port.

use std::path::PathBuf;

use anyhow::Context;
use fabric_provisioner_core::infrastructure::config::{ProvisionerConfig, ProvisioningRequest};

use super::{build_provisioner, report};

pub async fn execute(
    config: &ProvisionerConfig,
    descriptor: PathBuf,
    component_id: Option<String>,
) -> anyhow::Result<()> {
    let request = ProvisioningRequest::from_file(&descriptor)
        .with_context(|| format!("Failed to load descriptor {:?}", descriptor))?;
    let component = request.component_id(component_id.as_deref())?;
    let provisioner = build_provisioner(config)?;

    let response = provisioner.unprovision(&request.data_product, component).await;
    report(&response)
}
