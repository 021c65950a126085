//! Records, identifiers and the column schema.
//!
//! A record is a schema-less mapping of field name to [`Value`] with a stable
//! identifier. Upstream rows arrive as JSON objects and go through
//! [`RecordSet::from_json`], which coalesces field-name variants, assigns
//! identifiers and coerces values to the declared column kinds.
//!
//! # Examples
//!
//! ```
//! use gridstate::{ColumnDef, IngestOptions, RecordSet, Schema, ValueKind};
//! use serde_json::json;
//!
//! let schema = Schema::new(vec![
//!     ColumnDef::new("propertyName", ValueKind::Text),
//!     ColumnDef::new("amount", ValueKind::Number),
//! ]);
//! let rows = vec![
//!     json!({"id": 1, "propertyName": "Sunset Villa", "amount": "5300"}),
//!     json!({"propertyName": "Oceanview Apartment", "amount": -1200}),
//! ];
//!
//! let set = RecordSet::from_json(&rows, &schema, &IngestOptions::default()).unwrap();
//! assert_eq!(set.len(), 2);
//! assert_eq!(set.get(0).unwrap().id().as_str(), "1");
//! assert_eq!(set.get(1).unwrap().id().as_str(), "row-1");
//! assert_eq!(set.get(0).unwrap().get("amount").and_then(|v| v.as_f64()), Some(5300.0));
//! ```

use crate::error::TableError;
use crate::value::{Value, ValueKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Stable unique identifier of a record. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(RecordId(id))
        }
    }

    /// Identifier synthesized from a record's position in its source array.
    pub fn synthesized(index: usize) -> Self {
        RecordId(format!("row-{}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RecordId::new(raw).ok_or_else(|| serde::de::Error::custom("record id must not be empty"))
    }
}

/// A declared column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ValueKind,
    /// Display header; falls back to the field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        ColumnDef {
            name: name.into(),
            kind,
            header: None,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn header(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.name)
    }
}

/// The set of known fields for one table instance.
///
/// An empty schema means "schema-less": every field is accepted with its
/// natural type and column validation is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Schema { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        self.column(name).map(|c| c.kind)
    }

    /// Accepts any column when the schema is empty.
    pub fn check_column(&self, name: &str) -> Result<(), TableError> {
        if self.is_empty() || self.column(name).is_some() {
            Ok(())
        } else {
            Err(TableError::UnknownColumn(name.to_string()))
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// One row of tabular data.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new(id: RecordId, fields: HashMap<String, Value>) -> Self {
        Record { id, fields }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    pub fn to_json(&self) -> Map<String, JsonValue> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

/// Backend variants of field names, coalesced to one canonical name.
///
/// Variants are tried in order; the first present, non-null one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldAliases {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldAliases {
    pub fn none() -> Self {
        FieldAliases { entries: Vec::new() }
    }

    pub fn with(mut self, canonical: impl Into<String>, variants: &[&str]) -> Self {
        self.entries.push((
            canonical.into(),
            variants.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn apply(&self, row: &mut Map<String, JsonValue>) {
        for (canonical, variants) in &self.entries {
            let winner = variants
                .iter()
                .filter_map(|v| row.get(v))
                .find(|v| !v.is_null())
                .cloned();

            for variant in variants {
                if variant != canonical {
                    row.remove(variant);
                }
            }

            match winner {
                Some(value) => {
                    row.insert(canonical.clone(), value);
                }
                None => {
                    row.remove(canonical);
                }
            }
        }
    }
}

impl Default for FieldAliases {
    fn default() -> Self {
        FieldAliases::none().with("bgcolor", &["bg_color", "bgcolor", "bgColor"])
    }
}

/// How upstream rows are turned into records.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOptions {
    pub id_field: String,
    pub aliases: FieldAliases,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            id_field: "id".to_string(),
            aliases: FieldAliases::default(),
        }
    }
}

/// The unfiltered source collection of one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-typed records, rejecting duplicate identifiers.
    pub fn from_records(records: Vec<Record>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(TableError::DuplicateId(record.id().to_string()));
            }
        }
        Ok(RecordSet { records })
    }

    /// Ingest upstream JSON rows.
    ///
    /// Every row must be an object. Identifiers come from `id_field` when it
    /// holds a non-empty string or number, otherwise they are synthesized
    /// from the row's position in `rows`. With a declared schema only the
    /// declared columns are kept, coerced to their kinds.
    pub fn from_json(
        rows: &[JsonValue],
        schema: &Schema,
        options: &IngestOptions,
    ) -> Result<Self, TableError> {
        let mut records = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let mut object = match row {
                JsonValue::Object(map) => map.clone(),
                other => {
                    return Err(TableError::InvalidRecord {
                        index,
                        reason: format!("expected an object, got {}", json_type_name(other)),
                    })
                }
            };
            options.aliases.apply(&mut object);

            let id = object
                .get(&options.id_field)
                .and_then(json_id)
                .unwrap_or_else(|| RecordId::synthesized(index));

            let fields: HashMap<String, Value> = if schema.is_empty() {
                object
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v, None)))
                    .collect()
            } else {
                schema
                    .columns()
                    .iter()
                    .map(|col| {
                        let value = object
                            .get(&col.name)
                            .map(|v| Value::from_json(v, Some(col.kind)))
                            .unwrap_or(Value::Null);
                        (col.name.clone(), value)
                    })
                    .collect()
            };

            records.push(Record::new(id, fields));
        }

        let set = Self::from_records(records)?;
        log::debug!("ingested {} records", set.len());
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn ids(&self) -> HashSet<RecordId> {
        self.records.iter().map(|r| r.id().clone()).collect()
    }

    pub fn contains_id(&self, id: &RecordId) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    /// Drop every record whose id is listed. Returns how many were removed.
    pub fn remove_ids(&mut self, ids: &HashSet<RecordId>) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !ids.contains(r.id()));
        before - self.records.len()
    }
}

fn json_id(value: &JsonValue) -> Option<RecordId> {
    match value {
        JsonValue::String(s) => RecordId::new(s.clone()),
        JsonValue::Number(n) => RecordId::new(n.to_string()),
        _ => None,
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("id", ValueKind::Number),
            ColumnDef::new("name", ValueKind::Text),
            ColumnDef::new("amount", ValueKind::Number).with_header("Amount"),
        ])
    }

    #[test]
    fn test_record_id_rejects_empty() {
        assert!(RecordId::new("").is_none());
        assert!(RecordId::new("   ").is_none());
        assert_eq!(RecordId::new("7").unwrap().as_str(), "7");
        assert!(serde_json::from_str::<RecordId>("\"\"").is_err());
    }

    #[test]
    fn test_schema_lookup() {
        let schema = schema();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.kind_of("amount"), Some(ValueKind::Number));
        assert_eq!(schema.column("amount").unwrap().header(), "Amount");
        assert_eq!(schema.column("name").unwrap().header(), "name");
        assert!(schema.check_column("name").is_ok());
        assert_eq!(
            schema.check_column("agent"),
            Err(TableError::UnknownColumn("agent".to_string()))
        );
        assert!(Schema::default().check_column("anything").is_ok());
    }

    #[test]
    fn test_ingest_synthesizes_positional_ids() {
        let rows = vec![
            json!({"name": "a"}),
            json!({"id": "", "name": "b"}),
            json!({"id": 9, "name": "c"}),
        ];
        let set = RecordSet::from_json(&rows, &Schema::default(), &IngestOptions::default()).unwrap();
        let ids: Vec<&str> = set.records().iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["row-0", "row-1", "9"]);
    }

    #[test]
    fn test_ingest_keeps_declared_columns_only() {
        let rows = vec![json!({"id": 1, "name": "Villa", "amount": "12.5", "extra": true})];
        let set = RecordSet::from_json(&rows, &schema(), &IngestOptions::default()).unwrap();
        let record = set.get(0).unwrap();
        assert_eq!(record.fields().len(), 3);
        assert!(record.get("extra").is_none());
        assert_eq!(record.get("amount"), Some(&Value::Number(12.5)));
    }

    #[test]
    fn test_ingest_rejects_non_objects_and_duplicates() {
        let rows = vec![json!({"id": 1}), json!(42)];
        assert!(matches!(
            RecordSet::from_json(&rows, &Schema::default(), &IngestOptions::default()),
            Err(TableError::InvalidRecord { index: 1, .. })
        ));

        let rows = vec![json!({"id": 1}), json!({"id": "1"})];
        assert_eq!(
            RecordSet::from_json(&rows, &Schema::default(), &IngestOptions::default()),
            Err(TableError::DuplicateId("1".to_string()))
        );
    }

    #[test]
    fn test_alias_coalescing() {
        let rows = vec![
            json!({"id": 1, "bg_color": "#fff", "bgColor": "#000"}),
            json!({"id": 2, "bg_color": null, "bgcolor": "#abc"}),
            json!({"id": 3, "bgColor": "#123"}),
            json!({"id": 4}),
        ];
        let set = RecordSet::from_json(&rows, &Schema::default(), &IngestOptions::default()).unwrap();

        let colors: Vec<Option<&str>> = set
            .records()
            .iter()
            .map(|r| r.get("bgcolor").and_then(Value::as_str))
            .collect();
        assert_eq!(colors, vec![Some("#fff"), Some("#abc"), Some("#123"), None]);

        for record in set.records() {
            assert!(record.get("bg_color").is_none());
            assert!(record.get("bgColor").is_none());
        }
    }

    #[test]
    fn test_remove_ids() {
        let rows = vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})];
        let mut set = RecordSet::from_json(&rows, &Schema::default(), &IngestOptions::default()).unwrap();

        let doomed: HashSet<RecordId> = [RecordId::new("2").unwrap()].into_iter().collect();
        assert_eq!(set.remove_ids(&doomed), 1);
        assert_eq!(set.len(), 2);
        assert!(!set.contains_id(&RecordId::new("2").unwrap()));
    }
}
