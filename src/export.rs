//! CSV export of the filtered and sorted rows (all pages).

use crate::error::TableError;
use crate::pipeline::PipelineOutput;
use crate::record::{Record, Schema};
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Column order for export: the schema's when declared, otherwise every
/// field seen in the records, sorted by name.
pub fn export_columns(schema: &Schema, records: &[Record]) -> Vec<String> {
    if !schema.is_empty() {
        return schema.column_names().into_iter().map(str::to_string).collect();
    }
    records
        .iter()
        .flat_map(|r| r.fields().keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Write `rows` (indices into `records`) as CSV with a header row.
/// Values containing delimiters, quotes or newlines are quoted.
pub fn write_csv(records: &[Record], rows: &[usize], columns: &[String]) -> Result<String, TableError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for &index in rows {
        let record = &records[index];
        writer.write_record(
            columns
                .iter()
                .map(|c| record.get(c).map(|v| v.to_text().into_owned()).unwrap_or_default()),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TableError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TableError::Export(e.to_string()))
}

/// `Property Transactions` on 2024-10-21 → `property_transactions_2024-10-21.csv`.
pub fn export_filename(title: &str, date: NaiveDate) -> String {
    let slug = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    format!("{}_{}.csv", slug, date.format("%Y-%m-%d"))
}

pub fn export(
    records: &[Record],
    output: &PipelineOutput,
    schema: &Schema,
    title: &str,
    date: NaiveDate,
) -> Result<CsvExport, TableError> {
    let columns = export_columns(schema, records);
    Ok(CsvExport {
        filename: export_filename(title, date),
        content: write_csv(records, &output.rows, &columns)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordId;
    use crate::value::Value;
    use std::collections::HashMap;

    fn record(id: usize, name: &str, amount: f64) -> Record {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), Value::from(name));
        fields.insert("amount".to_string(), Value::Number(amount));
        Record::new(RecordId::synthesized(id), fields)
    }

    #[test]
    fn test_quotes_values_with_delimiters() {
        let records = vec![
            record(0, "Plain", 10.0),
            record(1, "Villa, \"Sunset\"", -2.5),
        ];
        let columns = vec!["name".to_string(), "amount".to_string()];
        let csv = write_csv(&records, &[1, 0], &columns).unwrap();
        assert_eq!(csv, "name,amount\n\"Villa, \"\"Sunset\"\"\",-2.5\nPlain,10\n");
    }

    #[test]
    fn test_schema_less_columns_sorted() {
        let records = vec![record(0, "a", 1.0)];
        assert_eq!(
            export_columns(&Schema::default(), &records),
            vec!["amount".to_string(), "name".to_string()]
        );
    }

    #[test]
    fn test_header_only_when_empty() {
        let columns = vec!["name".to_string()];
        assert_eq!(write_csv(&[], &[], &columns).unwrap(), "name\n");
    }

    #[test]
    fn test_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 21).unwrap();
        assert_eq!(
            export_filename("Property  Transactions", date),
            "property_transactions_2024-10-21.csv"
        );
    }
}
