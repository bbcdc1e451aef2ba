// fabric-provisioner-core/src/infrastructure/adapters/fabric.rs

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::http::ensure_success;
use crate::domain::access_role::DataAccessRoles;
use crate::domain::identity::AccessToken;
use crate::error::ProvisionerError;
use crate::ports::{LakehouseItem, LoadTableRequest, WarehouseItem, WorkspaceApi, WorkspaceRef};

/// Power BI / Fabric REST control plane.
///
/// Workspaces are listed through the Power BI `groups` API; items, access
/// roles and table loads go through Fabric v1.
pub struct FabricRestClient {
    http: Client,
    powerbi_base_url: String,
    fabric_base_url: String,
}

// --- WIRE TYPES ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(default)]
    continuation_uri: Option<String>,
}

#[derive(Deserialize)]
struct GroupDto {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemDto {
    id: String,
    display_name: String,
    #[serde(default)]
    properties: Option<ItemProperties>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ItemProperties {
    #[serde(default)]
    connection_string: Option<String>,
    #[serde(default)]
    sql_endpoint_properties: Option<SqlEndpointProperties>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SqlEndpointProperties {
    #[serde(default)]
    connection_string: Option<String>,
}

impl From<ItemDto> for WarehouseItem {
    fn from(dto: ItemDto) -> Self {
        WarehouseItem {
            id: dto.id,
            display_name: dto.display_name,
            connection_string: dto.properties.and_then(|p| p.connection_string),
        }
    }
}

impl From<ItemDto> for LakehouseItem {
    fn from(dto: ItemDto) -> Self {
        LakehouseItem {
            id: dto.id,
            display_name: dto.display_name,
            sql_endpoint: dto
                .properties
                .and_then(|p| p.sql_endpoint_properties)
                .and_then(|s| s.connection_string),
        }
    }
}

impl FabricRestClient {
    pub fn new(http: Client, powerbi_base_url: &str, fabric_base_url: &str) -> Self {
        Self {
            http,
            powerbi_base_url: powerbi_base_url.trim_end_matches('/').to_string(),
            fabric_base_url: fabric_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        url: &str,
        context: &str,
    ) -> Result<T, ProvisionerError> {
        debug!(url = %url, "GET");
        let response = self.http.get(url).bearer_auth(token.secret()).send().await?;
        Ok(ensure_success(response, context).await?.json().await?)
    }

    /// Follows `continuationUri` until the listing is exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        url: String,
        context: &str,
    ) -> Result<Vec<T>, ProvisionerError> {
        let mut items = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            let page: Page<T> = self.get_json(token, &url, context).await?;
            items.extend(page.value);
            next = page.continuation_uri;
        }
        Ok(items)
    }

    fn roles_url(&self, workspace_id: &str, item_id: &str) -> String {
        format!(
            "{}/workspaces/{}/items/{}/dataAccessRoles",
            self.fabric_base_url, workspace_id, item_id
        )
    }
}

#[async_trait]
impl WorkspaceApi for FabricRestClient {
    async fn list_workspaces(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<WorkspaceRef>, ProvisionerError> {
        let url = format!("{}/groups", self.powerbi_base_url);
        let groups: Page<GroupDto> = self
            .get_json(token, &url, "Failed to retrieve workspaces")
            .await?;
        Ok(groups
            .value
            .into_iter()
            .map(|g| WorkspaceRef {
                id: g.id,
                name: g.name,
            })
            .collect())
    }

    async fn list_warehouses(
        &self,
        token: &AccessToken,
        workspace_id: &str,
    ) -> Result<Vec<WarehouseItem>, ProvisionerError> {
        let url = format!("{}/workspaces/{}/warehouses", self.fabric_base_url, workspace_id);
        let items: Vec<ItemDto> = self
            .get_all(token, url, "Failed to retrieve warehouses")
            .await?;
        Ok(items.into_iter().map(WarehouseItem::from).collect())
    }

    async fn get_warehouse(
        &self,
        token: &AccessToken,
        workspace_id: &str,
        warehouse_id: &str,
    ) -> Result<WarehouseItem, ProvisionerError> {
        let url = format!(
            "{}/workspaces/{}/warehouses/{}",
            self.fabric_base_url, workspace_id, warehouse_id
        );
        let item: ItemDto = self
            .get_json(token, &url, "Failed to retrieve warehouse")
            .await?;
        Ok(item.into())
    }

    async fn list_lakehouses(
        &self,
        token: &AccessToken,
        workspace_id: &str,
    ) -> Result<Vec<LakehouseItem>, ProvisionerError> {
        let url = format!("{}/workspaces/{}/lakehouses", self.fabric_base_url, workspace_id);
        let items: Vec<ItemDto> = self
            .get_all(token, url, "Failed to retrieve lakehouses")
            .await?;
        Ok(items.into_iter().map(LakehouseItem::from).collect())
    }

    async fn get_data_access_roles(
        &self,
        token: &AccessToken,
        workspace_id: &str,
        item_id: &str,
    ) -> Result<DataAccessRoles, ProvisionerError> {
        let url = self.roles_url(workspace_id, item_id);
        self.get_json(token, &url, "Failed to retrieve data access roles")
            .await
    }

    async fn put_data_access_roles(
        &self,
        token: &AccessToken,
        workspace_id: &str,
        item_id: &str,
        roles: &DataAccessRoles,
    ) -> Result<(), ProvisionerError> {
        let url = self.roles_url(workspace_id, item_id);
        let response = self
            .http
            .put(&url)
            .bearer_auth(token.secret())
            .json(roles)
            .send()
            .await?;
        ensure_success(response, "Failed to update data access roles").await?;
        Ok(())
    }

    async fn load_table(
        &self,
        token: &AccessToken,
        workspace_id: &str,
        lakehouse_id: &str,
        table_name: &str,
        request: &LoadTableRequest,
    ) -> Result<bool, ProvisionerError> {
        let url = format!(
            "{}/workspaces/{}/lakehouses/{}/tables/{}/load",
            self.fabric_base_url, workspace_id, lakehouse_id, table_name
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(token.secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::ACCEPTED || status.is_success() {
            return Ok(true);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "Table load rejected");
        Ok(false)
    }
}
