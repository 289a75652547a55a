//! Schema models as reported by the backend.

use serde::{Deserialize, Serialize};

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Data type as reported by the database (e.g., "VARCHAR(100)").
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether this column is part of the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Referenced column as `table.column`, if this is a foreign key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

/// A table and its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Primary key columns.
    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

/// Body of `GET /api/schema` and `POST /api/schema/refresh`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaResponse {
    /// All tables visible to the session.
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_optional_key_flags() {
        let schema: SchemaResponse = serde_json::from_str(
            r#"{"tables":[{"name":"orders","columns":[
                {"name":"id","type":"INTEGER","primary_key":true},
                {"name":"user_id","type":"INTEGER","foreign_key":"users.id"},
                {"name":"total","type":"DECIMAL(10,2)"}
            ]}]}"#,
        )
        .unwrap();

        let orders = &schema.tables[0];
        assert_eq!(orders.columns.len(), 3);
        assert_eq!(orders.primary_keys().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["id"]);
        assert_eq!(orders.columns[1].foreign_key.as_deref(), Some("users.id"));
        assert!(!orders.columns[2].primary_key);
    }
}
