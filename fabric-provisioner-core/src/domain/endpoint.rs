// fabric-provisioner-core/src/domain/endpoint.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::DomainError;

/// The named SQL-reachable item inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointTarget {
    Warehouse(String),
    Lakehouse(String),
}

impl EndpointTarget {
    /// Exactly one of the two names must be set.
    pub fn from_names(
        warehouse: Option<&str>,
        lakehouse: Option<&str>,
    ) -> Result<Self, DomainError> {
        match (warehouse, lakehouse) {
            (Some(w), None) => Ok(EndpointTarget::Warehouse(w.to_string())),
            (None, Some(l)) => Ok(EndpointTarget::Lakehouse(l.to_string())),
            (Some(_), Some(_)) => Err(DomainError::Configuration(
                "Both a warehouse and a lakehouse were given, expected exactly one".into(),
            )),
            (None, None) => Err(DomainError::Configuration(
                "Neither a warehouse nor a lakehouse was given, expected exactly one".into(),
            )),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EndpointTarget::Warehouse(n) | EndpointTarget::Lakehouse(n) => n,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EndpointTarget::Warehouse(_) => "Warehouse",
            EndpointTarget::Lakehouse(_) => "Lakehouse",
        }
    }
}

impl fmt::Display for EndpointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.name())
    }
}

/// Resolved coordinates of a warehouse or lakehouse SQL surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointHandle {
    pub workspace_id: String,
    pub item_id: String,
    pub target: EndpointTarget,
    /// Host of the SQL endpoint (`*.datawarehouse.fabric.microsoft.com`).
    pub sql_endpoint: String,
}

impl EndpointHandle {
    /// ODBC-style connection string; the access token travels out of band.
    pub fn connection_string(&self, driver: &str) -> String {
        format!(
            "Driver={{{}}};Server={};Database={};TrustServerCertificate=Yes;",
            driver,
            self.sql_endpoint,
            self.target.name()
        )
    }
}
