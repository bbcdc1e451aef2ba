// fabric-provisioner-core/src/infrastructure/adapters/graph.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::http::ensure_success;
use crate::domain::identity::AccessToken;
use crate::error::ProvisionerError;
use crate::ports::{DirectoryApi, DirectoryGroup, DirectoryUser};

const USER_FIELDS: &str = "id,displayName,userPrincipalName,mail";
const GROUP_FIELDS: &str = "id,displayName,mailNickname";

/// Microsoft Graph `users` / `groups` lookups.
pub struct GraphDirectoryClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ODataList<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

impl GraphDirectoryClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T, ProvisionerError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "Graph request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token.secret())
            .query(query)
            .send()
            .await?;
        Ok(ensure_success(response, context).await?.json().await?)
    }

    async fn find_first<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        collection: &str,
        property: &str,
        value: &str,
        fields: &str,
    ) -> Result<Option<T>, ProvisionerError> {
        let list: ODataList<T> = self
            .get(
                token,
                collection,
                &[
                    ("$filter", equality_filter(property, value)),
                    ("$select", fields.to_string()),
                ],
                "Directory lookup failed",
            )
            .await?;
        Ok(list.value.into_iter().next())
    }
}

/// `<property> eq '<value>'` with the literal escaped for OData.
fn equality_filter(property: &str, value: &str) -> String {
    format!("{} eq '{}'", property, value.replace('\'', "''"))
}

#[async_trait]
impl DirectoryApi for GraphDirectoryClient {
    async fn find_user_by_principal_name(
        &self,
        token: &AccessToken,
        principal_name: &str,
    ) -> Result<Option<DirectoryUser>, ProvisionerError> {
        self.find_first(token, "users", "userPrincipalName", principal_name, USER_FIELDS)
            .await
    }

    async fn find_group_by_display_name(
        &self,
        token: &AccessToken,
        display_name: &str,
    ) -> Result<Option<DirectoryGroup>, ProvisionerError> {
        self.find_first(token, "groups", "displayName", display_name, GROUP_FIELDS)
            .await
    }

    async fn get_user(
        &self,
        token: &AccessToken,
        id: &str,
    ) -> Result<DirectoryUser, ProvisionerError> {
        self.get(
            token,
            &format!("users/{}", id),
            &[("$select", USER_FIELDS.to_string())],
            "Failed to validate user",
        )
        .await
    }

    async fn get_group(
        &self,
        token: &AccessToken,
        id: &str,
    ) -> Result<DirectoryGroup, ProvisionerError> {
        self.get(
            token,
            &format!("groups/{}", id),
            &[("$select", GROUP_FIELDS.to_string())],
            "Failed to validate group",
        )
        .await
    }
}
