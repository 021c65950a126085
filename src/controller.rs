//! Table state controller.
//!
//! Owns one table's [`TableState`] and its source records. Every mutation
//! runs the same cycle:
//!
//! ```text
//! Idle ──input──▶ Updating ──pipeline, clamp, reconcile, write──▶ Synced
//!   ▲                                                               │
//!   └──────────────────────── next input ───────────────────────────┘
//! ```
//!
//! A navigation event (back/forward) re-reads the store and runs the cycle
//! again from the hydrated state.

use crate::adapter::{build_grid, GridModel};
use crate::codec::UrlCodec;
use crate::config::TableConfig;
use crate::debounce::Debouncer;
use crate::error::{ErrorSink, LogSink, TableError};
use crate::export::{export, CsvExport};
use crate::filter::distinct_values;
use crate::location::{MemoryStore, StateStore};
use crate::pipeline::{run, Memo, MemoKey, PipelineOutput};
use crate::record::{RecordId, RecordSet};
use crate::source::{LoadSequencer, LoadTicket, SourceStatus};
use crate::state::{SelectScope, TableAction, TableState};
use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

/// Where the controller is in its update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Updating,
    Synced,
}

/// One mounted table: its state, its source records and the store the
/// state is published to.
///
/// Every change runs one cycle: apply the action, clamp against the
/// pipeline output, write the query, land in [`Phase::Synced`].
pub struct TableController {
    config: TableConfig,
    codec: UrlCodec,
    state: TableState,
    phase: Phase,
    syncs: u64,
    source: RecordSet,
    source_generation: u64,
    status: SourceStatus,
    loads: LoadSequencer,
    store: StateStore,
    query: String,
    memo: Memo,
    sink: Rc<dyn ErrorSink>,
    search: Debouncer<String>,
    mounted: bool,
}

impl TableController {
    /// Validate `config` and build an unmounted controller publishing to
    /// `store`. Nothing is read until [`TableController::mount`].
    pub fn new(config: TableConfig, store: StateStore) -> Result<Self, TableError> {
        config.validate()?;
        Ok(TableController {
            codec: config.codec(),
            state: config.defaults(),
            phase: Phase::Idle,
            syncs: 0,
            source: RecordSet::new(),
            source_generation: 0,
            status: SourceStatus::Pending,
            loads: LoadSequencer::new(),
            store,
            query: String::new(),
            memo: Memo::new(),
            sink: Rc::new(LogSink),
            search: Debouncer::new(config.search_debounce()),
            mounted: false,
            config,
        })
    }

    /// Controller persisting to a private in-memory store.
    pub fn in_memory(config: TableConfig) -> Result<Self, TableError> {
        let store = StateStore::detached(Rc::new(RefCell::new(MemoryStore::new())), &config.prefix);
        Self::new(config, store)
    }

    /// Send skipped-stage reports somewhere other than the log.
    pub fn with_sink(mut self, sink: Rc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Configuration the controller was built with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Codec for this table's prefix and defaults.
    pub fn codec(&self) -> &UrlCodec {
        &self.codec
    }

    /// Current state, as of the last completed cycle.
    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Current update phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Completed update cycles.
    pub fn syncs(&self) -> u64 {
        self.syncs
    }

    /// Records the pipeline runs over.
    pub fn source(&self) -> &RecordSet {
        &self.source
    }

    /// Whether the source has loaded, is pending or failed.
    pub fn status(&self) -> &SourceStatus {
        &self.status
    }

    /// True between [`TableController::mount`] and
    /// [`TableController::unmount`].
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The query written by the last cycle.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Hydrate from the store and publish the result.
    pub fn mount(&mut self) {
        self.mounted = true;
        self.hydrate();
        self.sync();
    }

    /// Cancel pending input. The state itself is dropped with the controller.
    pub fn unmount(&mut self) {
        if self.search.cancel() {
            log::debug!("[{}] dropped pending search on unmount", self.codec.prefix());
        }
        self.mounted = false;
        self.transition(Phase::Idle);
    }

    /// Back/forward navigation: whatever the store now holds wins.
    pub fn on_navigate(&mut self) {
        self.search.cancel();
        self.hydrate();
        self.sync();
    }

    /// Apply one action and run a full cycle.
    ///
    /// [`TableAction::SelectAll`] is resolved against the current pipeline
    /// output before it reaches the state.
    pub fn dispatch(&mut self, action: TableAction) {
        let action = match action {
            TableAction::SelectAll(scope) => {
                let output = self.output();
                let records = self.source.records();
                TableAction::SelectIds(match scope {
                    SelectScope::Filtered => output.filtered_ids(records),
                    SelectScope::Page => output.page_ids(records),
                })
            }
            other => other,
        };

        if matches!(action, TableAction::SetGlobalFilter(_) | TableAction::ResetFilters) {
            self.search.cancel();
        }

        log::trace!("[{}] {:?}", self.codec.prefix(), action);
        self.state.apply(action);
        self.sync();
    }

    /// Buffer a search keystroke. It is applied by [`tick`](Self::tick)
    /// once the input has been quiet for the configured delay.
    pub fn input_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search.input(text.into(), now);
    }

    /// When the pending search fires, if any.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Apply the pending search if it is due. Returns whether it was applied.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(text) => {
                self.state.apply(TableAction::SetGlobalFilter(text));
                self.sync();
                true
            }
            None => false,
        }
    }

    /// Start a load. Only the most recently started load may publish.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.loads.begin()
    }

    /// Publish a finished load unless a newer one was started since.
    /// Returns whether the result was used.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<JsonValue>, TableError>,
    ) -> bool {
        let Some(result) = self.loads.accept(ticket, result) else {
            return false;
        };

        let ingested = result.and_then(|rows| {
            RecordSet::from_json(&rows, &self.config.schema, &self.config.ingest_options())
        });
        match ingested {
            Ok(records) => self.set_source(records),
            Err(err) => self.mark_unavailable(err.to_string()),
        }
        true
    }

    /// Replace the source records.
    pub fn set_source(&mut self, records: RecordSet) {
        log::info!(
            "[{}] source replaced: {} records",
            self.codec.prefix(),
            records.len()
        );
        self.source = records;
        self.status = SourceStatus::Ready;
        self.source_generation += 1;
        self.sync();
    }

    /// The load failed: render an empty, distinguishable state.
    pub fn mark_unavailable(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("[{}] source unavailable: {}", self.codec.prefix(), reason);
        self.source = RecordSet::new();
        self.status = SourceStatus::Unavailable(reason);
        self.source_generation += 1;
        self.sync();
    }

    /// Drop records whose deletion the backend has confirmed. Returns how
    /// many were removed.
    pub fn confirm_removed(&mut self, ids: &[RecordId]) -> usize {
        let ids: HashSet<RecordId> = ids.iter().cloned().collect();
        let removed = self.source.remove_ids(&ids);
        if removed > 0 {
            self.source_generation += 1;
            self.sync();
        }
        removed
    }

    /// Filtered and sorted rows for the current state, memoized.
    pub fn output(&mut self) -> Rc<PipelineOutput> {
        let key = MemoKey::new(self.source_generation, &self.state);
        let records = self.source.records();
        let schema = &self.config.schema;
        let state = &self.state;
        let sink = &*self.sink;
        self.memo.get_or_compute(key, || run(records, schema, state, sink))
    }

    /// Grid for the current page, ready to render.
    pub fn view(&mut self) -> GridModel {
        let output = self.output();
        build_grid(
            self.source.records(),
            &self.config.schema,
            &self.state,
            &output,
            &self.status,
        )
    }

    /// CSV of every filtered row in the current order, across all pages.
    pub fn export_csv(&mut self, title: &str, date: NaiveDate) -> Result<CsvExport, TableError> {
        let output = self.output();
        export(self.source.records(), &output, &self.config.schema, title, date)
    }

    /// Choices for a per-column filter picker.
    pub fn distinct_values(&self, field: &str) -> Vec<String> {
        distinct_values(self.source.records(), field)
    }

    fn hydrate(&mut self) {
        let query = self.store.read();
        self.state = self.codec.decode(&query);
        log::debug!("[{}] hydrated from {:?}", self.codec.prefix(), query);
    }

    fn sync(&mut self) {
        if self.phase == Phase::Synced {
            self.transition(Phase::Idle);
        }
        self.transition(Phase::Updating);

        // Bookmarked page and selection must survive until the first load.
        if self.status != SourceStatus::Pending {
            let output = self.output();
            if output.page.page != self.state.page {
                log::debug!(
                    "[{}] page {} out of range, clamped to {}",
                    self.codec.prefix(),
                    self.state.page,
                    output.page.page
                );
                self.state.page = output.page.page;
            }

            let dropped = self.state.selection.reconcile(&self.source.ids());
            if dropped > 0 {
                log::debug!("[{}] dropped {} stale selections", self.codec.prefix(), dropped);
            }
        }

        self.query = self.store.write(&self.codec, &self.state);
        self.syncs += 1;
        self.transition(Phase::Synced);
    }

    fn transition(&mut self, to: Phase) {
        if self.phase != to {
            log::trace!("[{}] {:?} -> {:?}", self.codec.prefix(), self.phase, to);
            self.phase = to;
        }
    }
}

impl std::fmt::Debug for TableController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableController")
            .field("prefix", &self.codec.prefix())
            .field("phase", &self.phase)
            .field("records", &self.source.len())
            .field("status", &self.status)
            .field("state", &self.state)
            .finish()
    }
}
