// fabric-provisioner-core/src/ports/sql.rs

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::infrastructure::error::InfrastructureError;

/// What a driver needs to open a connection: the connection string plus
/// pre-connect attributes (attribute id -> raw bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub connection_string: String,
    pub attributes: BTreeMap<i32, Vec<u8>>,
}

#[async_trait]
pub trait SqlDriver: Send + Sync {
    async fn connect(
        &self,
        request: &ConnectRequest,
    ) -> Result<Box<dyn SqlConnection>, InfrastructureError>;
}

#[async_trait]
pub trait SqlConnection: Send {
    async fn execute(&mut self, statement: &str) -> Result<(), InfrastructureError>;

    async fn commit(&mut self) -> Result<(), InfrastructureError>;

    async fn close(self: Box<Self>) -> Result<(), InfrastructureError>;
}
