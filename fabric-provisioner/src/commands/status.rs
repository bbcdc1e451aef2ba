// fabric-provisioner/src/commands/status.rs
//
// USE CASE: Poll the status of a provisioning request.

use fabric_provisioner_core::application::Provisioner;

use super::report;

pub async fn execute(token: String) -> anyhow::Result<()> {
    let response = Provisioner::provisioning_status(&token).await;
    report(&response)
}
