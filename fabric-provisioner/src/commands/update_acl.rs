// fabric-provisioner/src/commands/update_acl.rs
//
// USE CASE: Grant read access on an output port.

use std::path::PathBuf;

use anyhow::Context;
use fabric_provisioner_core::infrastructure::config::{ProvisionerConfig, ProvisioningRequest};

use super::{build_provisioner, report};

pub async fn execute(
    config: &ProvisionerConfig,
    descriptor: PathBuf,
    component_id: Option<String>,
    subjects: Vec<String>,
) -> anyhow::Result<()> {
    let request = ProvisioningRequest::from_file(&descriptor)
        .with_context(|| format!("Failed to load descriptor {:?}", descriptor))?;
    let component = request.component_id(component_id.as_deref())?;
    let provisioner = build_provisioner(config)?;

    let response = provisioner
        .update_acl(&request.data_product, component, &subjects)
        .await;
    report(&response)
}
