// fabric-provisioner-core/src/domain/schema/mapper.rs

use super::column::{ColumnDefinition, DataType};

/// Translates a data-contract schema into the column list of a T-SQL
/// `CREATE TABLE` statement.
pub struct SchemaMapper;

impl SchemaMapper {
    /// SQL type for a single logical column.
    pub fn map_data_type(column: &ColumnDefinition) -> String {
        match column.data_type {
            DataType::Text => match column.data_length {
                Some(len) => format!("varchar({})", len),
                None => "varchar(max)".to_string(),
            },
            DataType::Int => "int".to_string(),
            DataType::Decimal => match (column.precision, column.scale) {
                (Some(p), Some(s)) => format!("decimal({},{})", p, s),
                _ => "decimal".to_string(),
            },
            DataType::Date => "date".to_string(),
            other => other.as_str().to_lowercase(),
        }
    }

    /// Renders every column as `\t[name] [type] NULL|NOT NULL`, joined by `,\n`.
    ///
    /// The target dialect wants type arguments outside the identifier
    /// brackets, so `varchar` and `decimal` come out as `[varchar](200)` and
    /// `[decimal](10,2)`.
    pub fn map_schema(columns: &[ColumnDefinition], nullable: bool) -> String {
        let nullability = if nullable { "NULL" } else { "NOT NULL" };

        columns
            .iter()
            .map(|col| {
                let name = quote_identifier(&col.name);
                let sql_type = Self::map_data_type(col);

                if sql_type.starts_with("varchar") {
                    let length = col
                        .data_length
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "max".to_string());
                    format!("\t{} [varchar]({}) {}", name, length, nullability)
                } else if sql_type.contains("decimal") {
                    match (col.precision, col.scale) {
                        (Some(p), Some(s)) => {
                            format!("\t{} [decimal]({},{}) {}", name, p, s, nullability)
                        }
                        _ => format!("\t{} [decimal] {}", name, nullability),
                    }
                } else {
                    format!("\t{} [{}] {}", name, sql_type, nullability)
                }
            })
            .collect::<Vec<_>>()
            .join(",\n")
    }
}

/// Bracket-quotes a T-SQL identifier, doubling any closing bracket.
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}
