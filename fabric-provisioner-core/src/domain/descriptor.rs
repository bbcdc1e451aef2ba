// fabric-provisioner-core/src/domain/descriptor.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::endpoint::EndpointTarget;
use crate::domain::error::DomainError;
use crate::domain::schema::ColumnDefinition;

/// Where an output port lands its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkKind {
    #[serde(rename = "WAREHOUSE", alias = "DWH")]
    Warehouse,
    #[serde(rename = "LAKEHOUSE")]
    Lakehouse,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Warehouse => f.write_str("WAREHOUSE"),
            SinkKind::Lakehouse => f.write_str("LAKEHOUSE"),
        }
    }
}

/// A data product as carried by a provisioning request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProduct {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub version: String,
    pub dev_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_product_owner: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_contract: Option<DataContract>,
    #[serde(default)]
    pub specific: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataContract {
    #[serde(default)]
    pub schema: Vec<ColumnDefinition>,
}

/// The `specific` block of a Fabric output port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPortSpecific {
    pub sink: SinkKind,
    pub table: String,
    pub workspace: String,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub lakehouse: Option<String>,
    #[serde(default, alias = "file_path")]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_format: Option<String>,
}

/// Typed view of the component to operate on.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDescriptor {
    pub data_product_id: String,
    pub component_id: String,
    pub sink: SinkKind,
    pub table: String,
    pub workspace: String,
    pub warehouse: Option<String>,
    pub lakehouse: Option<String>,
    pub schema: Vec<ColumnDefinition>,
    pub file_path: Option<String>,
    pub file_format: Option<String>,
    pub dev_group: String,
}

impl DataProduct {
    /// Extracts the output port identified by `component_id`.
    pub fn output_port(&self, component_id: &str) -> Result<ComponentDescriptor, DomainError> {
        let component = self
            .components
            .iter()
            .find(|c| c.id == component_id)
            .ok_or_else(|| {
                DomainError::InvalidDescriptor(format!(
                    "Component '{}' not found in data product '{}'",
                    component_id, self.id
                ))
            })?;

        let specific: OutputPortSpecific = serde_json::from_value(component.specific.clone())
            .map_err(|e| {
                DomainError::InvalidDescriptor(format!(
                    "Component '{}' is not a Fabric output port: {}",
                    component_id, e
                ))
            })?;

        Ok(ComponentDescriptor {
            data_product_id: self.id.clone(),
            component_id: component.id.clone(),
            sink: specific.sink,
            table: specific.table,
            workspace: specific.workspace,
            warehouse: specific.warehouse,
            lakehouse: specific.lakehouse,
            schema: component
                .data_contract
                .as_ref()
                .map(|dc| dc.schema.clone())
                .unwrap_or_default(),
            file_path: specific.file_path,
            file_format: specific.file_format,
            dev_group: self.dev_group.clone(),
        })
    }
}

impl ComponentDescriptor {
    /// The SQL-reachable object this component targets, chosen by sink kind.
    ///
    /// Older lakehouse descriptors carry the lakehouse name in `warehouse`.
    pub fn endpoint_target(&self) -> Result<EndpointTarget, DomainError> {
        match (self.sink, self.warehouse.as_deref(), self.lakehouse.as_deref()) {
            (SinkKind::Warehouse, warehouse, None) => EndpointTarget::from_names(warehouse, None),
            (SinkKind::Lakehouse, None, lakehouse) => EndpointTarget::from_names(None, lakehouse),
            (SinkKind::Lakehouse, Some(legacy), None) => {
                EndpointTarget::from_names(None, Some(legacy))
            }
            (SinkKind::Warehouse, _, Some(_)) => Err(DomainError::Configuration(format!(
                "Output port '{}' has a WAREHOUSE sink but names a lakehouse",
                self.component_id
            ))),
            (SinkKind::Lakehouse, Some(_), Some(_)) => Err(DomainError::Configuration(format!(
                "Output port '{}' names both a warehouse and a lakehouse, expected exactly one",
                self.component_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::DataType;

    const PRODUCT: &str = r#"
id: urn:dmb:dp:finance:payments:0
name: payments
domain: finance
environment: development
version: 0.1.0
devGroup: finance-devs
components:
  - id: urn:dmb:cmp:finance:payments:0:transactions
    name: transactions
    kind: outputport
    dataContract:
      schema:
        - name: id
          dataType: INT
        - name: amount
          dataType: DECIMAL
          precision: 10
          scale: 2
    specific:
      sink: DWH
      table: dbo.transactions
      workspace: finance-ws
      warehouse: finance_dwh
  - id: urn:dmb:cmp:finance:payments:0:raw
    kind: outputport
    specific:
      sink: LAKEHOUSE
      table: raw_payments
      workspace: finance-ws
      warehouse: finance_lake
      file_path: Files/raw/payments.csv
      fileFormat: CSV
  - id: urn:dmb:cmp:finance:payments:0:workload
    kind: workload
    specific:
      job: nightly
"#;

    fn product() -> anyhow::Result<DataProduct> {
        Ok(serde_yaml::from_str(PRODUCT)?)
    }

    #[test]
    fn test_extract_warehouse_port() -> anyhow::Result<()> {
        let port = product()?.output_port("urn:dmb:cmp:finance:payments:0:transactions")?;
        assert_eq!(port.sink, SinkKind::Warehouse);
        assert_eq!(port.table, "dbo.transactions");
        assert_eq!(port.dev_group, "finance-devs");
        assert_eq!(port.schema.len(), 2);
        assert_eq!(port.schema[1].data_type, DataType::Decimal);
        assert_eq!(
            port.endpoint_target()?,
            EndpointTarget::Warehouse("finance_dwh".into())
        );
        Ok(())
    }

    #[test]
    fn test_lakehouse_port_reads_legacy_warehouse_field() -> anyhow::Result<()> {
        let port = product()?.output_port("urn:dmb:cmp:finance:payments:0:raw")?;
        assert_eq!(port.sink, SinkKind::Lakehouse);
        assert_eq!(port.file_path.as_deref(), Some("Files/raw/payments.csv"));
        assert_eq!(port.file_format.as_deref(), Some("CSV"));
        assert!(port.schema.is_empty());
        assert_eq!(
            port.endpoint_target()?,
            EndpointTarget::Lakehouse("finance_lake".into())
        );
        Ok(())
    }

    #[test]
    fn test_unknown_or_mistyped_component() -> anyhow::Result<()> {
        let dp = product()?;
        assert!(matches!(
            dp.output_port("nope"),
            Err(DomainError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            dp.output_port("urn:dmb:cmp:finance:payments:0:workload"),
            Err(DomainError::InvalidDescriptor(_))
        ));
        Ok(())
    }

    #[test]
    fn test_warehouse_sink_with_both_names_is_configuration_error() -> anyhow::Result<()> {
        let mut port = product()?.output_port("urn:dmb:cmp:finance:payments:0:transactions")?;
        port.lakehouse = Some("lake".into());
        assert!(matches!(
            port.endpoint_target(),
            Err(DomainError::Configuration(_))
        ));
        Ok(())
    }

    #[test]
    fn test_warehouse_sink_never_targets_a_lakehouse() -> anyhow::Result<()> {
        let mut port = product()?.output_port("urn:dmb:cmp:finance:payments:0:transactions")?;
        port.warehouse = None;
        port.lakehouse = Some("lake".into());
        assert!(matches!(
            port.endpoint_target(),
            Err(DomainError::Configuration(_))
        ));

        port.lakehouse = None;
        assert!(matches!(
            port.endpoint_target(),
            Err(DomainError::Configuration(_))
        ));
        Ok(())
    }

    #[test]
    fn test_lakehouse_sink_with_both_names_is_configuration_error() -> anyhow::Result<()> {
        let mut port = product()?.output_port("urn:dmb:cmp:finance:payments:0:raw")?;
        port.lakehouse = Some("other_lake".into());
        assert!(matches!(
            port.endpoint_target(),
            Err(DomainError::Configuration(_))
        ));

        port.warehouse = None;
        assert_eq!(
            port.endpoint_target()?,
            EndpointTarget::Lakehouse("other_lake".into())
        );
        Ok(())
    }
}
