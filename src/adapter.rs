//! Shapes engine output into what a display grid renders.

use crate::export::export_columns;
use crate::filter::ColumnFilter;
use crate::paginate::PageInfo;
use crate::pipeline::PipelineOutput;
use crate::record::{Record, RecordId, Schema};
use crate::sort::SortDirection;
use crate::source::SourceStatus;
use crate::state::TableState;
use crate::value::ValueKind;
use serde::Serialize;

/// Column header as the grid renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridColumn {
    pub field: String,
    pub header: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValueKind>,
    /// Set on the active sort column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ColumnFilter>,
}

/// One row of the current page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub id: RecordId,
    pub selected: bool,
    /// Display text, aligned with [`GridModel::columns`].
    pub cells: Vec<String>,
}

/// Why there are no rows to show. Users need to tell "adjust your filters"
/// apart from "there is nothing here yet".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EmptyState {
    /// The first load has not finished.
    Loading,
    /// Records exist but none match the current filters.
    NoMatches,
    /// The source loaded and holds no records.
    NoData,
    /// The source could not be loaded.
    Unavailable { reason: String },
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::Loading => "Loading",
            EmptyState::NoMatches => "No records match the current filters",
            EmptyState::NoData => "No data available",
            EmptyState::Unavailable { .. } => "Data is currently unavailable",
        }
    }
}

/// Everything a grid needs to render the current page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridModel {
    pub columns: Vec<GridColumn>,
    pub rows: Vec<GridRow>,
    pub page: PageInfo,
    pub source_count: usize,
    pub filtered_count: usize,
    pub selected_count: usize,
    /// Every filtered record is selected.
    pub all_filtered_selected: bool,
    /// Every row on the current page is selected.
    pub page_selected: bool,
    pub search: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty: Option<EmptyState>,
}

pub fn build_grid(
    records: &[Record],
    schema: &Schema,
    state: &TableState,
    output: &PipelineOutput,
    status: &SourceStatus,
) -> GridModel {
    let sort_key = state.sort_key();

    let columns: Vec<GridColumn> = export_columns(schema, records)
        .into_iter()
        .map(|field| {
            let def = schema.column(&field);
            GridColumn {
                header: def.map(|d| d.header().to_string()).unwrap_or_else(|| field.clone()),
                kind: def.map(|d| d.kind),
                sort: sort_key
                    .as_ref()
                    .filter(|k| k.field == field)
                    .map(|k| k.direction),
                filter: state.column_filters.get(&field).cloned(),
                field,
            }
        })
        .collect();

    let rows: Vec<GridRow> = output
        .page_rows()
        .iter()
        .map(|&index| {
            let record = &records[index];
            GridRow {
                id: record.id().clone(),
                selected: state.selection.contains(record.id()),
                cells: columns
                    .iter()
                    .map(|c| record.get(&c.field).map(|v| v.to_text().into_owned()).unwrap_or_default())
                    .collect(),
            }
        })
        .collect();

    let empty = match status {
        SourceStatus::Unavailable(reason) => Some(EmptyState::Unavailable {
            reason: reason.clone(),
        }),
        _ if !output.rows.is_empty() => None,
        SourceStatus::Pending => Some(EmptyState::Loading),
        SourceStatus::Ready if records.is_empty() => Some(EmptyState::NoData),
        SourceStatus::Ready => Some(EmptyState::NoMatches),
    };

    GridModel {
        all_filtered_selected: state
            .selection
            .covers(output.rows.iter().map(|&i| records[i].id())),
        page_selected: state.selection.covers(rows.iter().map(|r| &r.id)),
        columns,
        rows,
        page: output.page,
        source_count: records.len(),
        filtered_count: output.filtered_count(),
        selected_count: state.selection.len(),
        search: state.global_filter.clone(),
        empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordingSink;
    use crate::filter::Operator;
    use crate::fixtures::{transaction_rows, transaction_schema};
    use crate::pipeline::run;
    use crate::record::{IngestOptions, RecordSet};
    use crate::state::TableAction;

    fn source() -> RecordSet {
        RecordSet::from_json(&transaction_rows(), &transaction_schema(), &IngestOptions::default()).unwrap()
    }

    fn grid(set: &RecordSet, state: &TableState, status: &SourceStatus) -> GridModel {
        let schema = transaction_schema();
        let output = run(set.records(), &schema, state, &RecordingSink::new());
        build_grid(set.records(), &schema, state, &output, status)
    }

    #[test]
    fn test_columns_carry_sort_and_filter() {
        let set = source();
        let mut state = TableState::with_page_size(5);
        state.apply(TableAction::SortBy("amount".to_string()));
        state.apply(TableAction::SetColumnFilter(ColumnFilter::new("status", Operator::Equals, "completed")));

        let model = grid(&set, &state, &SourceStatus::Ready);
        assert_eq!(model.columns.len(), 10);
        let amount = model.columns.iter().find(|c| c.field == "amount").unwrap();
        assert_eq!(amount.sort, Some(SortDirection::Asc));
        assert_eq!(amount.header, "Amount");
        let status = model.columns.iter().find(|c| c.field == "status").unwrap();
        assert_eq!(status.filter.as_ref().map(|f| f.value.as_str()), Some("completed"));

        assert_eq!(model.filtered_count, 5);
        assert_eq!(model.rows.len(), 5);
        assert_eq!(model.rows[0].cells[6], "5300");
        assert!(model.empty.is_none());
    }

    #[test]
    fn test_selection_flags() {
        let set = source();
        let mut state = TableState::with_page_size(5);
        let ids: Vec<RecordId> = set.records()[..5].iter().map(|r| r.id().clone()).collect();
        state.apply(TableAction::SelectIds(ids));

        let model = grid(&set, &state, &SourceStatus::Ready);
        assert!(model.page_selected);
        assert!(!model.all_filtered_selected);
        assert_eq!(model.selected_count, 5);
        assert!(model.rows.iter().all(|r| r.selected));

        state.apply(TableAction::SetGlobalFilter("villa".to_string()));
        let model = grid(&set, &state, &SourceStatus::Ready);
        assert!(model.all_filtered_selected);
    }

    #[test]
    fn test_empty_states_are_distinct() {
        let set = source();
        let mut state = TableState::default();
        state.apply(TableAction::SetGlobalFilter("no such thing".to_string()));
        assert_eq!(grid(&set, &state, &SourceStatus::Ready).empty, Some(EmptyState::NoMatches));

        let empty = RecordSet::new();
        assert_eq!(
            grid(&empty, &TableState::default(), &SourceStatus::Ready).empty,
            Some(EmptyState::NoData)
        );

        assert_eq!(
            grid(&empty, &TableState::default(), &SourceStatus::Pending).empty,
            Some(EmptyState::Loading)
        );

        let model = grid(&empty, &TableState::default(), &SourceStatus::Unavailable("timeout".to_string()));
        assert_eq!(
            model.empty,
            Some(EmptyState::Unavailable {
                reason: "timeout".to_string()
            })
        );
        assert_ne!(EmptyState::NoMatches.message(), EmptyState::NoData.message());
    }

    #[test]
    fn test_serializes_camel_case() {
        let set = source();
        let model = grid(&set, &TableState::with_page_size(2), &SourceStatus::Ready);
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["page"]["totalPages"], 4);
        assert_eq!(json["filteredCount"], 8);
        assert_eq!(json["rows"][0]["id"], "1");
        assert!(json.get("empty").is_none());
    }
}
