// fabric-provisioner-core/src/infrastructure/config/request.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::domain::descriptor::DataProduct;
use crate::domain::error::DomainError;
use crate::error::ProvisionerError;
use crate::infrastructure::error::InfrastructureError;

/// A provisioning request file: the data product plus, optionally, the id of
/// the component to act on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningRequest {
    pub data_product: DataProduct,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id_to_provision: Option<String>,
}

impl ProvisioningRequest {
    #[instrument]
    pub fn from_file(path: &Path) -> Result<Self, InfrastructureError> {
        if !path.exists() {
            return Err(InfrastructureError::ConfigNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let request: Self = serde_yaml::from_str(&content)?;
        info!(
            data_product = %request.data_product.id,
            components = request.data_product.components.len(),
            "Descriptor loaded"
        );
        Ok(request)
    }

    /// An explicit id wins over the one carried by the request.
    pub fn component_id<'a>(
        &'a self,
        explicit: Option<&'a str>,
    ) -> Result<&'a str, ProvisionerError> {
        explicit
            .or(self.component_id_to_provision.as_deref())
            .ok_or_else(|| {
                DomainError::InvalidDescriptor(
                    "No component id given and the descriptor has no componentIdToProvision"
                        .into(),
                )
                .into()
            })
    }
}
