// fabric-provisioner-core/src/infrastructure/adapters/entra.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::http::ensure_success;
use crate::domain::identity::{AccessToken, TokenScope};
use crate::error::ProvisionerError;
use crate::infrastructure::config::ClientCredentials;
use crate::ports::TokenProvider;

/// OAuth2 client-credentials flow against Microsoft Entra ID.
pub struct EntraTokenProvider {
    http: Client,
    token_url: String,
    credentials: ClientCredentials,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl EntraTokenProvider {
    pub fn new(http: Client, authority_host: &str, credentials: ClientCredentials) -> Self {
        let token_url = token_url(authority_host, &credentials.tenant_id);
        Self {
            http,
            token_url,
            credentials,
        }
    }
}

fn token_url(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id
    )
}

#[async_trait]
impl TokenProvider for EntraTokenProvider {
    async fn token(&self, scope: TokenScope) -> Result<AccessToken, ProvisionerError> {
        debug!(scope = %scope, "Requesting access token");
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;

        let body: TokenResponse = ensure_success(response, "Token request failed")
            .await?
            .json()
            .await?;
        Ok(AccessToken::new(body.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url() {
        assert_eq!(
            token_url("https://login.microsoftonline.com/", "tenant-1"),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );
    }
}
