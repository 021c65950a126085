//! Cell values.
//!
//! A record field holds one of a small set of value types. Filters work on
//! the value's string form, sorting compares by type (numbers numerically,
//! dates by instant, text case-insensitively, mixed types by a fixed kind
//! rank).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::cmp::Ordering;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Number,
    Date,
    Bool,
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Bool(bool),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Text(_) => Some(ValueKind::Text),
            Value::Number(_) => Some(ValueKind::Number),
            Value::Date(_) => Some(ValueKind::Date),
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Null => None,
        }
    }

    /// Numeric reading of the value. Text that parses as a number counts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Instant reading of the value. Text that parses as a date counts.
    pub fn as_instant(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Text(s) => parse_date(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// String form used by text filters, CSV export and display.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Text(s) => Cow::Borrowed(s),
            Value::Number(n) => Cow::Owned(format_number(*n)),
            Value::Date(d) => Cow::Owned(d.format(DISPLAY_FORMAT).to_string()),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Null => Cow::Borrowed(""),
        }
    }

    /// Convert a JSON value, coercing to the declared kind when one is given.
    ///
    /// Values that cannot be coerced are kept in their natural type; arrays
    /// and objects become their JSON text.
    pub fn from_json(value: &JsonValue, kind: Option<ValueKind>) -> Value {
        let natural = match value {
            JsonValue::Null => return Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_f64() {
                Some(f) => Value::Number(f),
                None => Value::Text(n.to_string()),
            },
            JsonValue::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        };

        match kind {
            Some(ValueKind::Number) => natural.as_f64().map(Value::Number).unwrap_or(natural),
            Some(ValueKind::Date) => natural.as_instant().map(Value::Date).unwrap_or(natural),
            Some(ValueKind::Bool) => match natural.as_str().map(str::to_ascii_lowercase).as_deref() {
                Some("true") => Value::Bool(true),
                Some("false") => Value::Bool(false),
                _ => natural,
            },
            Some(ValueKind::Text) => match natural {
                Value::Text(_) | Value::Null => natural,
                other => Value::Text(other.to_text().into_owned()),
            },
            None => natural,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Date(_) => JsonValue::String(self.to_text().into_owned()),
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Null => JsonValue::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

/// Type-aware ascending comparison.
///
/// A total order: values of different kinds never compare by content.
/// Numbers come first, then dates, text and booleans, and nulls sort after
/// every other value. Within a kind numbers compare numerically, dates by
/// instant and text case-insensitively.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => compare_text(x, y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Compare as values of a declared column kind.
///
/// Text is read as a number only in a `Number` column and as an instant only
/// in a `Date` column. Whatever does not parse keeps its own kind.
pub fn compare_as(a: &Value, b: &Value, kind: Option<ValueKind>) -> Ordering {
    match kind {
        Some(ValueKind::Number) | Some(ValueKind::Date) => compare(&a.coerced(kind), &b.coerced(kind)),
        _ => compare(a, b),
    }
}

impl Value {
    fn coerced(&self, kind: Option<ValueKind>) -> Cow<'_, Value> {
        let parsed = match (kind, self) {
            (Some(ValueKind::Number), Value::Text(s)) => parse_number(s).map(Value::Number),
            (Some(ValueKind::Date), Value::Text(s)) => parse_date(s).map(Value::Date),
            _ => None,
        };
        parsed.map_or(Cow::Borrowed(self), Cow::Owned)
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::Date(_) => 1,
        Value::Text(_) => 2,
        Value::Bool(_) => 3,
        Value::Null => 4,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Finite number from trimmed text.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// RFC 3339, ISO-like date-times or a bare `YYYY-MM-DD`. Offsets are
/// normalized to UTC.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_forms() {
        assert_eq!(Value::Number(5300.0).to_text(), "5300");
        assert_eq!(Value::Number(-12.5).to_text(), "-12.5");
        assert_eq!(Value::Bool(true).to_text(), "true");
        assert_eq!(Value::Null.to_text(), "");

        let date = parse_date("2024-10-20T10:04:00").unwrap();
        assert_eq!(Value::Date(date).to_text(), "2024-10-20T10:04:00");
    }

    #[test]
    fn test_parse_date_variants() {
        assert!(parse_date("2024-10-20").is_some());
        assert!(parse_date("2024-10-20T10:04:00Z").is_some());
        assert!(parse_date("2024-10-20 10:04").is_some());
        assert!(parse_date("Sunset Villa").is_none());

        let with_offset = parse_date("2024-10-20T12:00:00+02:00").unwrap();
        assert_eq!(with_offset, parse_date("2024-10-20T10:00:00").unwrap());
    }

    #[test]
    fn test_from_json_coercion() {
        assert_eq!(Value::from_json(&json!("5300"), Some(ValueKind::Number)), Value::Number(5300.0));
        assert_eq!(Value::from_json(&json!("n/a"), Some(ValueKind::Number)), Value::Text("n/a".to_string()));
        assert_eq!(Value::from_json(&json!(42), Some(ValueKind::Text)), Value::Text("42".to_string()));
        assert_eq!(Value::from_json(&json!("TRUE"), Some(ValueKind::Bool)), Value::Bool(true));
        assert!(matches!(
            Value::from_json(&json!("2024-10-20T10:04:00"), Some(ValueKind::Date)),
            Value::Date(_)
        ));
        assert_eq!(Value::from_json(&json!(null), Some(ValueKind::Date)), Value::Null);
        assert_eq!(Value::from_json(&json!("2024-10-20"), None), Value::Text("2024-10-20".to_string()));
    }

    #[test]
    fn test_compare_typed() {
        // Numeric, not lexicographic
        assert_eq!(compare(&Value::Number(9.0), &Value::Number(10.0)), Ordering::Less);
        // Case-insensitive text
        assert_eq!(compare(&Value::from("apple"), &Value::from("Banana")), Ordering::Less);
        assert_eq!(compare(&Value::from("ABC"), &Value::from("abc")), Ordering::Equal);

        let early = Value::Date(parse_date("2024-10-03").unwrap());
        let late = Value::Date(parse_date("2024-10-20").unwrap());
        assert_eq!(compare(&early, &late), Ordering::Less);
    }

    #[test]
    fn test_compare_nulls_last() {
        assert_eq!(compare(&Value::Null, &Value::Number(1.0)), Ordering::Greater);
        assert_eq!(compare(&Value::from("a"), &Value::Null), Ordering::Less);
        assert_eq!(compare(&Value::Null, &Value::Null), Ordering::Equal);
    }

    #[test]
    fn test_compare_mixed_ranks_by_kind() {
        // "10" is text without a declared kind, so it follows every number
        assert_eq!(compare(&Value::from("10"), &Value::Number(9.0)), Ordering::Greater);
        assert_eq!(compare(&Value::from("3"), &Value::Number(5.0)), Ordering::Greater);
        assert_eq!(compare(&Value::from("20"), &Value::Number(5.0)), Ordering::Greater);
        assert_eq!(compare(&Value::from("x"), &Value::Bool(false)), Ordering::Less);

        let date = Value::Date(parse_date("2024-10-03").unwrap());
        assert_eq!(compare(&Value::Number(1e9), &date), Ordering::Less);
        assert_eq!(compare(&date, &Value::from("a")), Ordering::Less);
    }

    #[test]
    fn test_compare_nan_is_ordered() {
        let nan = Value::Number(f64::NAN);
        assert_eq!(compare(&nan, &nan), Ordering::Equal);
        assert_eq!(compare(&Value::Number(1.0), &nan), Ordering::Less);
        assert_eq!(compare(&nan, &Value::Number(1.0)), Ordering::Greater);
    }

    #[test]
    fn test_compare_as_declared_kind() {
        let ten = Value::from("10");
        let nine = Value::Number(9.0);
        assert_eq!(compare_as(&ten, &nine, Some(ValueKind::Number)), Ordering::Greater);
        assert_eq!(compare_as(&Value::from("2"), &nine, Some(ValueKind::Number)), Ordering::Less);
        // Unparseable text in a number column still follows the numbers
        assert_eq!(compare_as(&Value::from("5x"), &nine, Some(ValueKind::Number)), Ordering::Greater);
        assert_eq!(compare_as(&ten, &nine, Some(ValueKind::Text)), Ordering::Greater);

        let early = Value::from("2024-10-03");
        let late = Value::Date(parse_date("2024-10-20").unwrap());
        assert_eq!(compare_as(&early, &late, Some(ValueKind::Date)), Ordering::Less);
        assert_eq!(compare_as(&early, &late, None), Ordering::Greater);
    }
}
