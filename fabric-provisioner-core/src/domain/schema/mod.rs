// fabric-provisioner-core/src/domain/schema/mod.rs

pub mod column;
pub mod mapper;

pub use column::{ColumnDefinition, DataType};
pub use mapper::{SchemaMapper, quote_identifier};
