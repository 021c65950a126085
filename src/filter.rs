//! Filter engine: global free-text search plus per-column operator filters.
//!
//! A record survives when it matches the global text (any field contains it,
//! case-insensitively) and every active column filter. Output keeps the
//! input order.

use crate::error::TableError;
use crate::record::{Record, Schema};
use crate::value::parse_number;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Comparison rule of a column filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Contains,
    Equals,
    /// Prefix of the text form. Dates render as `YYYY-MM-DDTHH:MM:SS`, so
    /// `2024-10` keeps one month and `2024` one year.
    StartsWith,
    EndsWith,
    NotContains,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::Contains,
        Operator::Equals,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::NotContains,
        Operator::NotEquals,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterThanOrEqual,
        Operator::LessThanOrEqual,
    ];

    /// Numeric operators compare as numbers; the rest compare text.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::LessThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThanOrEqual
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Contains => "contains",
            Operator::Equals => "equals",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::NotContains => "notContains",
            Operator::NotEquals => "notEquals",
            Operator::GreaterThan => "greaterThan",
            Operator::LessThan => "lessThan",
            Operator::GreaterThanOrEqual => "greaterThanOrEqual",
            Operator::LessThanOrEqual => "lessThanOrEqual",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `field <operator> value` condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

impl ColumnFilter {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        ColumnFilter {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// A filter with an empty value is the same as no filter.
    pub fn is_active(&self) -> bool {
        !self.value.is_empty()
    }

    pub fn validate(&self, schema: &Schema) -> Result<(), TableError> {
        schema.check_column(&self.field)?;
        if self.operator.is_numeric() && parse_number(&self.value).is_none() {
            return Err(TableError::NonNumericThreshold {
                field: self.field.clone(),
                operator: self.operator.to_string(),
                value: self.value.clone(),
            });
        }
        Ok(())
    }

    /// Evaluate against one record. Type mismatches fail closed.
    pub fn matches(&self, record: &Record) -> bool {
        let value = record.get(&self.field);

        if self.operator.is_numeric() {
            let (Some(actual), Some(threshold)) =
                (value.and_then(|v| v.as_f64()), parse_number(&self.value))
            else {
                return false;
            };
            return match self.operator {
                Operator::GreaterThan => actual > threshold,
                Operator::LessThan => actual < threshold,
                Operator::GreaterThanOrEqual => actual >= threshold,
                Operator::LessThanOrEqual => actual <= threshold,
                _ => unreachable!("text operators handled below"),
            };
        }

        let actual = value.map(|v| v.to_text().to_lowercase()).unwrap_or_default();
        let expected = self.value.to_lowercase();
        match self.operator {
            Operator::Contains => actual.contains(&expected),
            Operator::NotContains => !actual.contains(&expected),
            Operator::Equals => actual == expected,
            Operator::NotEquals => actual != expected,
            Operator::StartsWith => actual.starts_with(&expected),
            Operator::EndsWith => actual.ends_with(&expected),
            _ => unreachable!("numeric operators handled above"),
        }
    }
}

/// Active column filters keyed by field. At most one filter per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ColumnFilters(BTreeMap<String, ColumnFilter>);

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the filter for its field. Inactive filters remove it.
    pub fn set(&mut self, filter: ColumnFilter) {
        if filter.is_active() {
            self.0.insert(filter.field.clone(), filter);
        } else {
            self.0.remove(&filter.field);
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<ColumnFilter> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&ColumnFilter> {
        self.0.get(field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, ColumnFilter> {
        self.0.values()
    }

    /// First malformed filter, if any.
    pub fn validate(&self, schema: &Schema) -> Result<(), TableError> {
        self.iter().try_for_each(|f| f.validate(schema))
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.iter().all(|f| f.matches(record))
    }
}

impl FromIterator<ColumnFilter> for ColumnFilters {
    fn from_iter<I: IntoIterator<Item = ColumnFilter>>(iter: I) -> Self {
        let mut filters = ColumnFilters::new();
        for filter in iter {
            filters.set(filter);
        }
        filters
    }
}

/// Case-insensitive "any field contains" test. `needle` must be lowercase.
fn matches_global(record: &Record, needle: &str) -> bool {
    record
        .fields()
        .values()
        .any(|v| v.to_text().to_lowercase().contains(needle))
}

/// Indices of `records` that pass the global text and all column filters,
/// in input order.
pub fn apply_filters(records: &[Record], global_text: &str, filters: &ColumnFilters) -> Vec<usize> {
    let needle = global_text.to_lowercase();

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| needle.is_empty() || matches_global(record, &needle))
        .filter(|(_, record)| filters.matches(record))
        .map(|(index, _)| index)
        .collect()
}

/// Sorted distinct string forms of `field`, skipping empty values.
pub fn distinct_values(records: &[Record], field: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.get(field))
        .map(|v| v.to_text().into_owned())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
