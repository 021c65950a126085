//! Filter → sort → paginate.
//!
//! The pipeline works on row indices into the source, the same way a
//! filtered or sorted view keeps a mapping to its parent rows. A malformed
//! stage is skipped: its input passes through untouched and the error goes
//! to the [`ErrorSink`].

use crate::error::{ErrorSink, PipelineStage, TableError};
use crate::filter::{apply_filters, ColumnFilters};
use crate::paginate::PageInfo;
use crate::record::{Record, RecordId, Schema};
use crate::sort::{apply_sort, SortKey};
use crate::state::TableState;
use std::rc::Rc;

/// Result of one filter, sort and paginate pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Filtered and sorted indices into the source records.
    pub rows: Vec<usize>,
    pub page: PageInfo,
    /// Stages that were skipped, with the reason.
    pub skipped: Vec<(PipelineStage, TableError)>,
}

impl PipelineOutput {
    /// Indices of the rows on the current page.
    pub fn page_rows(&self) -> &[usize] {
        &self.rows[self.page.range()]
    }

    pub fn filtered_ids(&self, records: &[Record]) -> Vec<RecordId> {
        self.rows.iter().map(|&i| records[i].id().clone()).collect()
    }

    pub fn page_ids(&self, records: &[Record]) -> Vec<RecordId> {
        self.page_rows().iter().map(|&i| records[i].id().clone()).collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.rows.len()
    }
}

/// Run the full pipeline for `state` over `records`.
pub fn run(
    records: &[Record],
    schema: &Schema,
    state: &TableState,
    sink: &dyn ErrorSink,
) -> PipelineOutput {
    let mut skipped = Vec::new();

    let rows = match state.column_filters.validate(schema) {
        Ok(()) => apply_filters(records, &state.global_filter, &state.column_filters),
        Err(err) => {
            sink.report(PipelineStage::Filter, &err);
            skipped.push((PipelineStage::Filter, err));
            (0..records.len()).collect()
        }
    };

    let key = state.sort_key();
    let rows = match key.as_ref().map(|k| k.validate(schema)) {
        Some(Err(err)) => {
            sink.report(PipelineStage::Sort, &err);
            skipped.push((PipelineStage::Sort, err));
            rows
        }
        _ => apply_sort(records, rows, key.as_ref(), schema),
    };

    let page = PageInfo::new(rows.len(), state.page, state.page_size);

    PipelineOutput { rows, page, skipped }
}

/// Everything the pipeline output depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoKey {
    source_generation: u64,
    global_filter: String,
    column_filters: ColumnFilters,
    sort: Option<SortKey>,
    page: usize,
    page_size: usize,
}

impl MemoKey {
    pub fn new(source_generation: u64, state: &TableState) -> Self {
        MemoKey {
            source_generation,
            global_filter: state.global_filter.clone(),
            column_filters: state.column_filters.clone(),
            sort: state.sort_key(),
            page: state.page,
            page_size: state.page_size,
        }
    }
}

/// Single-entry cache of the last pipeline run.
#[derive(Debug, Default)]
pub struct Memo {
    entry: Option<(MemoKey, Rc<PipelineOutput>)>,
    computations: u64,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached output for `key`, running `compute` only when the key changed.
    pub fn get_or_compute<F>(&mut self, key: MemoKey, compute: F) -> Rc<PipelineOutput>
    where
        F: FnOnce() -> PipelineOutput,
    {
        if let Some((cached_key, output)) = &self.entry {
            if *cached_key == key {
                log::trace!("pipeline memo hit");
                return Rc::clone(output);
            }
        }

        let output = Rc::new(compute());
        self.computations += 1;
        self.entry = Some((key, Rc::clone(&output)));
        output
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// How many times the pipeline actually ran.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
