// fabric-provisioner-core/src/infrastructure/config/settings.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use validator::Validate;

use crate::application::warehouse::{DEFAULT_SQL_DRIVER, WarehouseSettings};
use crate::domain::access_role::DEFAULT_ROLE_NAME;
use crate::infrastructure::error::InfrastructureError;

pub const DEFAULT_CONFIG_FILE: &str = "provisioner.yaml";

pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
const ENV_AUTHORITY_HOST: &str = "FABRIC_PROVISIONER_AUTHORITY_HOST";
const ENV_SQL_DRIVER: &str = "FABRIC_PROVISIONER_SQL_DRIVER";
const ENV_ACCESS_ROLE: &str = "FABRIC_PROVISIONER_ACCESS_ROLE";
const ENV_HTTP_TIMEOUT: &str = "FABRIC_PROVISIONER_HTTP_TIMEOUT_SECS";

// --- CONFIGURATION STRUCTS ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProvisionerConfig {
    #[validate(nested)]
    pub credentials: CredentialsConfig,

    #[validate(nested)]
    pub endpoints: EndpointsConfig,

    #[validate(nested)]
    pub sql: SqlConfig,

    /// Lakehouse data-access role that receives the grantees.
    #[validate(length(min = 1, message = "Access role name cannot be empty"))]
    pub access_role_name: String,

    #[validate(range(min = 1, max = 600))]
    pub http_timeout_secs: u64,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            credentials: CredentialsConfig::default(),
            endpoints: EndpointsConfig::default(),
            sql: SqlConfig::default(),
            access_role_name: DEFAULT_ROLE_NAME.to_string(),
            http_timeout_secs: 30,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CredentialsConfig {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EndpointsConfig {
    #[validate(url)]
    pub authority_host: String,
    #[validate(url)]
    pub graph_base_url: String,
    #[validate(url)]
    pub powerbi_base_url: String,
    #[validate(url)]
    pub fabric_base_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            authority_host: "https://login.microsoftonline.com".into(),
            graph_base_url: "https://graph.microsoft.com/v1.0".into(),
            powerbi_base_url: "https://api.powerbi.com/v1.0/myorg".into(),
            fabric_base_url: "https://api.fabric.microsoft.com/v1".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SqlConfig {
    #[validate(length(min = 1, message = "SQL driver name cannot be empty"))]
    pub driver: String,
    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            driver: DEFAULT_SQL_DRIVER.to_string(),
            port: 1433,
        }
    }
}

/// Service-principal credentials, all three present.
#[derive(Clone)]
pub struct ClientCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

impl ProvisionerConfig {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, `provisioner.yaml` in the
    /// working directory is used when present, defaults otherwise. Environment
    /// overrides are applied last, then the result is validated.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, InfrastructureError> {
        let mut config = match path {
            Some(p) if !p.exists() => {
                return Err(InfrastructureError::ConfigNotFound(p.display().to_string()));
            }
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, InfrastructureError> {
        info!(path = ?path, "Loading provisioner configuration");
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Layers environment values over the file values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), InfrastructureError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_TENANT_ID) {
            self.credentials.tenant_id = Some(val);
        }
        if let Some(val) = lookup(ENV_CLIENT_ID) {
            self.credentials.client_id = Some(val);
        }
        if let Some(val) = lookup(ENV_CLIENT_SECRET) {
            self.credentials.client_secret = Some(val);
        }
        if let Some(val) = lookup(ENV_AUTHORITY_HOST) {
            info!(
                old = ?self.endpoints.authority_host,
                new = ?val,
                "Overriding authority host via ENV"
            );
            self.endpoints.authority_host = val;
        }
        if let Some(val) = lookup(ENV_SQL_DRIVER) {
            info!(old = ?self.sql.driver, new = ?val, "Overriding SQL driver via ENV");
            self.sql.driver = val;
        }
        if let Some(val) = lookup(ENV_ACCESS_ROLE) {
            info!(old = ?self.access_role_name, new = ?val, "Overriding access role via ENV");
            self.access_role_name = val;
        }
        if let Some(val) = lookup(ENV_HTTP_TIMEOUT) {
            self.http_timeout_secs = val.parse().map_err(|_| {
                InfrastructureError::ConfigError(format!(
                    "{} must be a number of seconds, got '{}'",
                    ENV_HTTP_TIMEOUT, val
                ))
            })?;
        }
        Ok(())
    }

    pub fn check(&self) -> Result<(), InfrastructureError> {
        self.validate()
            .map_err(|e| InfrastructureError::ConfigError(e.to_string()))
    }

    /// The service principal to authenticate with. Every part is required.
    pub fn client_credentials(&self) -> Result<ClientCredentials, InfrastructureError> {
        fn required(value: &Option<String>, key: &str) -> Result<String, InfrastructureError> {
            value.clone().filter(|v| !v.is_empty()).ok_or_else(|| {
                InfrastructureError::ConfigError(format!(
                    "Required environment key {} not found",
                    key
                ))
            })
        }

        Ok(ClientCredentials {
            tenant_id: required(&self.credentials.tenant_id, ENV_TENANT_ID)?,
            client_id: required(&self.credentials.client_id, ENV_CLIENT_ID)?,
            client_secret: required(&self.credentials.client_secret, ENV_CLIENT_SECRET)?,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn warehouse_settings(&self) -> WarehouseSettings {
        WarehouseSettings {
            sql_driver: self.sql.driver.clone(),
            access_role_name: self.access_role_name.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ProvisionerConfig::default();
        assert!(config.check().is_ok());
        assert_eq!(config.access_role_name, "Admin");
        assert_eq!(config.sql.driver, "ODBC Driver 18 for SQL Server");
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "access_role_name: DataReaders\nsql:\n  port: 1444\ncredentials:\n  tenant_id: t-1"
        )?;

        let config = ProvisionerConfig::from_file(file.path())?;
        assert_eq!(config.access_role_name, "DataReaders");
        assert_eq!(config.sql.port, 1444);
        assert_eq!(config.sql.driver, "ODBC Driver 18 for SQL Server");
        assert_eq!(config.credentials.tenant_id.as_deref(), Some("t-1"));
        assert_eq!(config.endpoints.fabric_base_url, "https://api.fabric.microsoft.com/v1");
        Ok(())
    }

    #[test]
    fn test_explicit_missing_file_is_not_found() {
        let result = ProvisionerConfig::load(Some(Path::new("/definitely/not/here.yaml")));
        assert!(matches!(result, Err(InfrastructureError::ConfigNotFound(_))));
    }

    #[test]
    fn test_env_overrides_win() -> anyhow::Result<()> {
        let mut config = ProvisionerConfig::default();
        config.credentials.client_id = Some("from-file".into());

        config.apply_env_overrides(env(&[
            ("AZURE_TENANT_ID", "tenant"),
            ("AZURE_CLIENT_ID", "client"),
            ("AZURE_CLIENT_SECRET", "secret"),
            ("FABRIC_PROVISIONER_ACCESS_ROLE", "Readers"),
            ("FABRIC_PROVISIONER_HTTP_TIMEOUT_SECS", "90"),
        ]))?;

        let creds = config.client_credentials()?;
        assert_eq!(creds.client_id, "client");
        assert_eq!(creds.client_secret, "secret");
        assert_eq!(config.access_role_name, "Readers");
        assert_eq!(config.http_timeout_secs, 90);
        assert!(!format!("{:?}", creds).contains("secret\""));
        Ok(())
    }

    #[test]
    fn test_bad_timeout_override() {
        let mut config = ProvisionerConfig::default();
        let result =
            config.apply_env_overrides(env(&[("FABRIC_PROVISIONER_HTTP_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(InfrastructureError::ConfigError(_))));
    }

    #[test]
    fn test_missing_credentials_name_the_key() {
        let mut config = ProvisionerConfig::default();
        config.credentials.tenant_id = Some("tenant".into());

        match config.client_credentials() {
            Err(InfrastructureError::ConfigError(msg)) => {
                assert_eq!(msg, "Required environment key AZURE_CLIENT_ID not found")
            }
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ProvisionerConfig::default();
        config.access_role_name = String::new();
        assert!(config.check().is_err());

        let mut config = ProvisionerConfig::default();
        config.endpoints.graph_base_url = "not a url".into();
        assert!(config.check().is_err());

        let mut config = ProvisionerConfig::default();
        config.http_timeout_secs = 0;
        assert!(config.check().is_err());
    }
}
