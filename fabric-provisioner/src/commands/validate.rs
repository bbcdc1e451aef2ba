// fabric-provisioner/src/commands/validate.rs
//
// USE CASE: Validate a provisioning request.

use std::path::PathBuf;

use anyhow::Context;
use fabric_provisioner_core::application::Provisioner;
use fabric_provisioner_core::infrastructure::config::ProvisioningRequest;

use super::report_validation;

pub async fn execute(descriptor: PathBuf) -> anyhow::Result<()> {
    let request = ProvisioningRequest::from_file(&descriptor)
        .with_context(|| format!("Failed to load descriptor {:?}", descriptor))?;

    let response = Provisioner::validate(&request.data_product).await;
    report_validation(&response)
}
