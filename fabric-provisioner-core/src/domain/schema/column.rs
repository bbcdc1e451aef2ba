// fabric-provisioner-core/src/domain/schema/column.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical column types accepted in a data contract (OpenMetadata type list).
///
/// Unknown type names are rejected when the descriptor is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Number,
    Tinyint,
    Smallint,
    Int,
    Bigint,
    Byteint,
    Bytes,
    Float,
    Double,
    Decimal,
    Numeric,
    Timestamp,
    Timestampz,
    Time,
    Date,
    Datetime,
    Interval,
    String,
    Mediumtext,
    Text,
    Char,
    Long,
    Varchar,
    Boolean,
    Binary,
    Varbinary,
    Array,
    Blob,
    Longblob,
    Mediumblob,
    Map,
    Struct,
    Union,
    Set,
    Geography,
    Enum,
    Json,
    Uuid,
    Variant,
    Geometry,
    Point,
    Polygon,
    Bytea,
}

impl DataType {
    /// Every supported type, in declaration order.
    pub const ALL: [DataType; 43] = [
        Self::Number,
        Self::Tinyint,
        Self::Smallint,
        Self::Int,
        Self::Bigint,
        Self::Byteint,
        Self::Bytes,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Numeric,
        Self::Timestamp,
        Self::Timestampz,
        Self::Time,
        Self::Date,
        Self::Datetime,
        Self::Interval,
        Self::String,
        Self::Mediumtext,
        Self::Text,
        Self::Char,
        Self::Long,
        Self::Varchar,
        Self::Boolean,
        Self::Binary,
        Self::Varbinary,
        Self::Array,
        Self::Blob,
        Self::Longblob,
        Self::Mediumblob,
        Self::Map,
        Self::Struct,
        Self::Union,
        Self::Set,
        Self::Geography,
        Self::Enum,
        Self::Json,
        Self::Uuid,
        Self::Variant,
        Self::Geometry,
        Self::Point,
        Self::Polygon,
        Self::Bytea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::Tinyint => "TINYINT",
            Self::Smallint => "SMALLINT",
            Self::Int => "INT",
            Self::Bigint => "BIGINT",
            Self::Byteint => "BYTEINT",
            Self::Bytes => "BYTES",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Timestamp => "TIMESTAMP",
            Self::Timestampz => "TIMESTAMPZ",
            Self::Time => "TIME",
            Self::Date => "DATE",
            Self::Datetime => "DATETIME",
            Self::Interval => "INTERVAL",
            Self::String => "STRING",
            Self::Mediumtext => "MEDIUMTEXT",
            Self::Text => "TEXT",
            Self::Char => "CHAR",
            Self::Long => "LONG",
            Self::Varchar => "VARCHAR",
            Self::Boolean => "BOOLEAN",
            Self::Binary => "BINARY",
            Self::Varbinary => "VARBINARY",
            Self::Array => "ARRAY",
            Self::Blob => "BLOB",
            Self::Longblob => "LONGBLOB",
            Self::Mediumblob => "MEDIUMBLOB",
            Self::Map => "MAP",
            Self::Struct => "STRUCT",
            Self::Union => "UNION",
            Self::Set => "SET",
            Self::Geography => "GEOGRAPHY",
            Self::Enum => "ENUM",
            Self::Json => "JSON",
            Self::Uuid => "UUID",
            Self::Variant => "VARIANT",
            Self::Geometry => "GEOMETRY",
            Self::Point => "POINT",
            Self::Polygon => "POLYGON",
            Self::Bytea => "BYTEA",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a component's data contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            data_length: None,
            precision: None,
            scale: None,
            description: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.data_length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }
}
