// fabric-provisioner-core/src/application/orchestrator.rs

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::application::resolver::DirectoryResolver;
use crate::domain::acl::AclSubject;
use crate::domain::descriptor::{ComponentDescriptor, DataProduct, SinkKind};
use crate::domain::error::DomainError;
use crate::domain::schema::SchemaMapper;
use crate::domain::status::{
    ProvisioningResponse, ProvisioningStatus, SystemErr, ValidationResponse,
};
use crate::error::ProvisionerError;
use crate::ports::{TableSession, WarehouseGateway};

const PROVISIONING_COMPLETED: &str = "Provisioning completed";
const PROVISIONING_NOT_COMPLETED: &str = "Provisioning not completed";
const UNPROVISIONING_COMPLETED: &str = "Unprovisioning completed";
const UNPROVISIONING_NOT_COMPLETED: &str = "Unprovisioning not completed";
const ACL_UPDATED: &str = "Acl updated";
const ACL_NOT_UPDATED: &str = "Acl not updated";
const NOT_IMPLEMENTED: &str = "Response not yet implemented";

/// Drives provision / unprovision / update-ACL to a terminal response.
///
/// Every call is self-contained: nothing survives between operations, and
/// any SQL session opened along the way is closed before returning.
pub struct Provisioner {
    resolver: DirectoryResolver,
    warehouse: Arc<dyn WarehouseGateway>,
}

impl Provisioner {
    pub fn new(resolver: DirectoryResolver, warehouse: Arc<dyn WarehouseGateway>) -> Self {
        Self {
            resolver,
            warehouse,
        }
    }

    #[instrument(skip(self, product), fields(data_product = %product.id))]
    pub async fn provision(
        &self,
        product: &DataProduct,
        component_id: &str,
    ) -> ProvisioningResponse {
        info!("Provisioning component '{}'", component_id);
        let outcome = match product.output_port(component_id) {
            Ok(descriptor) => match descriptor.sink {
                SinkKind::Warehouse => self.provision_warehouse(&descriptor).await,
                SinkKind::Lakehouse => self.provision_lakehouse(&descriptor).await,
            },
            Err(e) => Err(e.into()),
        };
        respond(outcome, PROVISIONING_NOT_COMPLETED)
    }

    #[instrument(skip(self, product), fields(data_product = %product.id))]
    pub async fn unprovision(
        &self,
        product: &DataProduct,
        component_id: &str,
    ) -> ProvisioningResponse {
        info!("Unprovisioning component '{}'", component_id);
        respond(
            self.try_unprovision(product, component_id).await,
            UNPROVISIONING_NOT_COMPLETED,
        )
    }

    #[instrument(skip(self, product, subjects), fields(data_product = %product.id))]
    pub async fn update_acl(
        &self,
        product: &DataProduct,
        component_id: &str,
        subjects: &[String],
    ) -> ProvisioningResponse {
        info!("Updating ACL of component '{}' for {:?}", component_id, subjects);
        respond(
            self.try_update_acl(product, component_id, subjects).await,
            ACL_NOT_UPDATED,
        )
    }

    // Validation and status polling hold no state and need no platform access.

    pub async fn validate(_product: &DataProduct) -> ValidationResponse {
        ValidationResponse::SystemError(SystemErr::new(NOT_IMPLEMENTED))
    }

    pub async fn provisioning_status(_token: &str) -> ProvisioningResponse {
        ProvisioningResponse::SystemError(SystemErr::new(NOT_IMPLEMENTED))
    }

    pub async fn validation_status(_token: &str) -> ValidationResponse {
        ValidationResponse::SystemError(SystemErr::new(NOT_IMPLEMENTED))
    }

    async fn provision_warehouse(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<ProvisioningStatus, ProvisionerError> {
        let target = descriptor.endpoint_target()?;
        let handle = self
            .warehouse
            .resolve_endpoint(&descriptor.workspace, &target)
            .await?;

        let mut session = self.warehouse.session(handle);
        let outcome = self.create_and_grant(session.as_mut(), descriptor).await;
        close_session(session).await;
        outcome
    }

    async fn create_and_grant(
        &self,
        session: &mut dyn TableSession,
        descriptor: &ComponentDescriptor,
    ) -> Result<ProvisioningStatus, ProvisionerError> {
        let columns = SchemaMapper::map_schema(&descriptor.schema, true);
        if !session.create_table(&descriptor.table, &columns).await? {
            return Ok(ProvisioningStatus::failed(PROVISIONING_NOT_COMPLETED));
        }

        let owners = self
            .resolver
            .resolve(&[AclSubject::dev_group(&descriptor.dev_group)?])
            .await?;
        if !session
            .grant_table_privileges(&descriptor.table, &owners, true)
            .await?
        {
            return Ok(ProvisioningStatus::failed(PROVISIONING_NOT_COMPLETED));
        }

        Ok(ProvisioningStatus::completed(PROVISIONING_COMPLETED))
    }

    async fn provision_lakehouse(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<ProvisioningStatus, ProvisionerError> {
        let target = descriptor.endpoint_target()?;
        let (relative_path, file_format) =
            match (descriptor.file_path.as_deref(), descriptor.file_format.as_deref()) {
                (Some(path), Some(format)) => (path, format),
                _ => {
                    return Err(DomainError::Configuration(format!(
                        "Lakehouse output port '{}' needs both filePath and fileFormat",
                        descriptor.component_id
                    ))
                    .into());
                }
            };

        let loaded = self
            .warehouse
            .load_table(
                &descriptor.workspace,
                target.name(),
                &descriptor.table,
                relative_path,
                file_format,
            )
            .await?;
        if !loaded {
            return Ok(ProvisioningStatus::failed(PROVISIONING_NOT_COMPLETED));
        }

        let owners = self
            .resolver
            .resolve(&[AclSubject::dev_group(&descriptor.dev_group)?])
            .await?;
        self.warehouse
            .apply_lakehouse_access_role(&descriptor.workspace, target.name(), &owners, true)
            .await?;

        Ok(ProvisioningStatus::completed(PROVISIONING_COMPLETED))
    }

    async fn try_unprovision(
        &self,
        product: &DataProduct,
        component_id: &str,
    ) -> Result<ProvisioningStatus, ProvisionerError> {
        let descriptor = product.output_port(component_id)?;
        let target = descriptor.endpoint_target()?;
        let handle = self
            .warehouse
            .resolve_endpoint(&descriptor.workspace, &target)
            .await?;

        let mut session = self.warehouse.session(handle);
        let dropped = session.drop_table_if_exists(&descriptor.table).await;
        close_session(session).await;

        Ok(if dropped? {
            ProvisioningStatus::completed(UNPROVISIONING_COMPLETED)
        } else {
            ProvisioningStatus::failed(UNPROVISIONING_NOT_COMPLETED)
        })
    }

    async fn try_update_acl(
        &self,
        product: &DataProduct,
        component_id: &str,
        subjects: &[String],
    ) -> Result<ProvisioningStatus, ProvisionerError> {
        let descriptor = product.output_port(component_id)?;
        let target = descriptor.endpoint_target()?;

        match descriptor.sink {
            SinkKind::Warehouse => {
                let handle = self
                    .warehouse
                    .resolve_endpoint(&descriptor.workspace, &target)
                    .await?;
                let readers = self.resolver.resolve_raw(subjects).await?;
                let mut session = self.warehouse.session(handle);
                let granted = session
                    .grant_table_privileges(&descriptor.table, &readers, false)
                    .await;
                close_session(session).await;

                Ok(if granted? {
                    ProvisioningStatus::completed(ACL_UPDATED)
                } else {
                    ProvisioningStatus::failed(ACL_NOT_UPDATED)
                })
            }
            SinkKind::Lakehouse => {
                let readers = self.resolver.resolve_raw(subjects).await?;
                self.warehouse
                    .apply_lakehouse_access_role(
                        &descriptor.workspace,
                        target.name(),
                        &readers,
                        false,
                    )
                    .await?;
                Ok(ProvisioningStatus::completed(ACL_UPDATED))
            }
        }
    }
}

fn respond(
    outcome: Result<ProvisioningStatus, ProvisionerError>,
    failure_prefix: &str,
) -> ProvisioningResponse {
    match outcome {
        Ok(status) => {
            info!(status = %status.status, "{}", status.result);
            ProvisioningResponse::Status(status)
        }
        Err(e) => {
            error!("{}: {}", failure_prefix, e);
            ProvisioningResponse::SystemError(SystemErr::new(format!(
                "{}, the error is: {}",
                failure_prefix, e
            )))
        }
    }
}

async fn close_session(session: Box<dyn TableSession + '_>) {
    if let Err(e) = session.close().await {
        warn!("Failed to close SQL session: {}", e);
    }
}
