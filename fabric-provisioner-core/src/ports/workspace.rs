// fabric-provisioner-core/src/ports/workspace.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::access_role::DataAccessRoles;
use crate::domain::identity::AccessToken;
use crate::error::ProvisionerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseItem {
    pub id: String,
    pub display_name: String,
    /// Only filled when the item is fetched individually.
    pub connection_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LakehouseItem {
    pub id: String,
    pub display_name: String,
    /// SQL analytics endpoint, absent while it is still being provisioned.
    pub sql_endpoint: Option<String>,
}

/// Body of a lakehouse "load table" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTableRequest {
    pub relative_path: String,
    pub path_type: String,
    pub mode: String,
    pub recursive: bool,
    pub format_options: FormatOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatOptions {
    pub format: String,
    pub header: bool,
    pub delimiter: String,
}

impl LoadTableRequest {
    /// Overwrites the table from a single file with a header row.
    pub fn overwrite_from_file(relative_path: &str, file_format: &str) -> Self {
        Self {
            relative_path: relative_path.to_string(),
            path_type: "File".into(),
            mode: "Overwrite".into(),
            recursive: false,
            format_options: FormatOptions {
                format: file_format.to_string(),
                header: true,
                delimiter: ",".into(),
            },
        }
    }
}

/// Workspace-level control plane (Power BI / Fabric REST).
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    async fn list_workspaces(&self, token: &AccessToken)
    -> Result<Vec<WorkspaceRef>, ProvisionerError>;

    async fn list_warehouses(
        &self,
        token: &AccessToken,
        workspace_id: &str,
    ) -> Result<Vec<WarehouseItem>, ProvisionerError>;

    async fn get_warehouse(
        &self,
        token: &AccessToken,
        workspace_id: &str,
        warehouse_id: &str,
    ) -> Result<WarehouseItem, ProvisionerError>;

    async fn list_lakehouses(
        &self,
        token: &AccessToken,
        workspace_id: &str,
    ) -> Result<Vec<LakehouseItem>, ProvisionerError>;

    async fn get_data_access_roles(
        &self,
        token: &AccessToken,
        workspace_id: &str,
        item_id: &str,
    ) -> Result<DataAccessRoles, ProvisionerError>;

    async fn put_data_access_roles(
        &self,
        token: &AccessToken,
        workspace_id: &str,
        item_id: &str,
        roles: &DataAccessRoles,
    ) -> Result<(), ProvisionerError>;

    /// Returns `Ok(false)` when the platform rejects the load.
    async fn load_table(
        &self,
        token: &AccessToken,
        workspace_id: &str,
        lakehouse_id: &str,
        table_name: &str,
        request: &LoadTableRequest,
    ) -> Result<bool, ProvisionerError>;
}
