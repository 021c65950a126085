//! Per-table configuration.

use crate::codec::UrlCodec;
use crate::debounce::DEFAULT_SEARCH_DELAY;
use crate::error::TableError;
use crate::record::{FieldAliases, IngestOptions, Schema};
use crate::state::{TableState, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for one table instance. Deserializes from camelCase JSON with
/// every field optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableConfig {
    /// Namespace for this table's URL parameters (`p` → `p_search`).
    pub prefix: String,
    pub page_size: usize,
    pub search_debounce_ms: u64,
    /// Upstream field holding each record's identifier.
    pub id_field: String,
    pub aliases: FieldAliases,
    /// Declared columns; empty means schema-less.
    pub schema: Schema,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            prefix: "p".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DELAY.as_millis() as u64,
            id_field: "id".to_string(),
            aliases: FieldAliases::default(),
            schema: Schema::default(),
        }
    }
}

impl TableConfig {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let config: TableConfig =
            serde_json::from_str(json).map_err(|e| TableError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject a zero page size, a prefix with query syntax in it and an
    /// empty id field.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        if self.prefix.contains(['&', '=', '?', '#']) {
            return Err(TableError::Config(format!(
                "prefix '{}' contains a reserved query character",
                self.prefix
            )));
        }
        if self.id_field.is_empty() {
            return Err(TableError::Config("id field must not be empty".to_string()));
        }
        Ok(())
    }

    /// Default state for this table.
    pub fn defaults(&self) -> TableState {
        TableState::with_page_size(self.page_size)
    }

    /// Codec for this table's prefix, with [`TableConfig::defaults`] left
    /// out of the query.
    pub fn codec(&self) -> UrlCodec {
        UrlCodec::new(self.prefix.clone(), self.defaults())
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            id_field: self.id_field.clone(),
            aliases: self.aliases.clone(),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert_eq!(config.prefix, "p");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
        assert_eq!(config.codec().key("search"), "p_search");
    }

    #[test]
    fn test_from_json_partial() {
        let config = TableConfig::from_json(
            r#"{"prefix": "orders", "pageSize": 10, "schema": [{"name": "amount", "kind": "number"}]}"#,
        )
        .unwrap();
        assert_eq!(config.prefix, "orders");
        assert_eq!(config.defaults().page_size, 10);
        assert_eq!(config.schema.len(), 1);
        assert_eq!(config.id_field, "id");
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert_eq!(
            TableConfig::from_json(r#"{"pageSize": 0}"#),
            Err(TableError::InvalidPageSize)
        );
        assert!(matches!(
            TableConfig::from_json(r#"{"prefix": "a&b"}"#),
            Err(TableError::Config(_))
        ));
        assert!(matches!(TableConfig::from_json("not json"), Err(TableError::Config(_))));
    }
}
