// fabric-provisioner-core/src/ports/directory.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::identity::AccessToken;
use crate::error::ProvisionerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryGroup {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mail_nickname: Option<String>,
}

/// Identity directory lookups (Microsoft Graph).
///
/// `find_*` return `Ok(None)` when the filter matched nothing; `get_*` fail
/// when the object cannot be fetched by id.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn find_user_by_principal_name(
        &self,
        token: &AccessToken,
        principal_name: &str,
    ) -> Result<Option<DirectoryUser>, ProvisionerError>;

    async fn find_group_by_display_name(
        &self,
        token: &AccessToken,
        display_name: &str,
    ) -> Result<Option<DirectoryGroup>, ProvisionerError>;

    async fn get_user(&self, token: &AccessToken, id: &str)
    -> Result<DirectoryUser, ProvisionerError>;

    async fn get_group(
        &self,
        token: &AccessToken,
        id: &str,
    ) -> Result<DirectoryGroup, ProvisionerError>;
}
