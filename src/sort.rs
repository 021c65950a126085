//! Sort engine: a single active (field, direction) key over row indices.

use crate::error::TableError;
use crate::record::{Record, Schema};
use crate::value::{compare_as, Value, ValueKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Sort direction. Ascending is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active sort column and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    pub fn validate(&self, schema: &Schema) -> Result<(), TableError> {
        schema.check_column(&self.field)
    }

    /// Compare two records under this key, reading the field as `kind`.
    /// Descending reverses the comparator itself so ties still resolve to
    /// input order.
    pub fn compare(&self, a: &Record, b: &Record, kind: Option<ValueKind>) -> Ordering {
        let a = a.get(&self.field).unwrap_or(&Value::Null);
        let b = b.get(&self.field).unwrap_or(&Value::Null);
        let ord = compare_as(a, b, kind);
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Stable sort of `rows` (indices into `records`). `None` leaves the order
/// untouched. The key's column kind comes from `schema`; an unknown column
/// sorts by each value's own kind.
pub fn apply_sort(
    records: &[Record],
    mut rows: Vec<usize>,
    key: Option<&SortKey>,
    schema: &Schema,
) -> Vec<usize> {
    if let Some(key) = key {
        let kind = schema.kind_of(&key.field);
        rows.sort_by(|&a, &b| key.compare(&records[a], &records[b], kind));
    }
    rows
}
