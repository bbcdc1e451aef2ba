// fabric-provisioner-core/src/ports/warehouse.rs
//
// The warehouse/lakehouse operations the orchestrator drives. Boolean results
// carry business outcomes; errors carry infrastructure failures.

use async_trait::async_trait;

use crate::domain::acl::ResolvedGrantee;
use crate::domain::endpoint::{EndpointHandle, EndpointTarget};
use crate::error::ProvisionerError;

#[async_trait]
pub trait WarehouseGateway: Send + Sync {
    async fn resolve_endpoint(
        &self,
        workspace: &str,
        target: &EndpointTarget,
    ) -> Result<EndpointHandle, ProvisionerError>;

    /// Opens a session on the endpoint. The SQL connection is established
    /// lazily by the first statement.
    fn session(&self, handle: EndpointHandle) -> Box<dyn TableSession + '_>;

    async fn apply_lakehouse_access_role(
        &self,
        workspace: &str,
        lakehouse: &str,
        grantees: &[ResolvedGrantee],
        read_all: bool,
    ) -> Result<(), ProvisionerError>;

    async fn load_table(
        &self,
        workspace: &str,
        lakehouse: &str,
        table: &str,
        relative_path: &str,
        file_format: &str,
    ) -> Result<bool, ProvisionerError>;
}

#[async_trait]
pub trait TableSession: Send {
    async fn create_table(&mut self, name: &str, columns: &str) -> Result<bool, ProvisionerError>;

    async fn drop_table_if_exists(&mut self, name: &str) -> Result<bool, ProvisionerError>;

    async fn grant_table_privileges(
        &mut self,
        name: &str,
        grantees: &[ResolvedGrantee],
        all_privileges: bool,
    ) -> Result<bool, ProvisionerError>;

    /// Releases the connection, if one was opened.
    async fn close(self: Box<Self>) -> Result<(), ProvisionerError>;
}
