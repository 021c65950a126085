//! GridState - tabular data engine with URL-synchronized state
//!
//! Filters, sorts, paginates and selects rows of a record collection, and
//! keeps the complete table state in a shareable query string. Pipelines
//! work on row indices into the source, so the records themselves are never
//! copied or reordered.
//!
//! ```
//! use gridstate::{ColumnDef, IngestOptions, RecordSet, Schema, ValueKind};
//! use gridstate::{TableAction, TableConfig, TableController};
//! use serde_json::json;
//!
//! let schema = Schema::new(vec![
//!     ColumnDef::new("name", ValueKind::Text),
//!     ColumnDef::new("amount", ValueKind::Number),
//! ]);
//! let rows = vec![
//!     json!({"id": 1, "name": "Sunset Villa", "amount": 5300}),
//!     json!({"id": 2, "name": "Oceanview Apartment", "amount": -1200}),
//! ];
//! let records = RecordSet::from_json(&rows, &schema, &IngestOptions::default()).unwrap();
//!
//! let mut table = TableController::in_memory(TableConfig::default().with_schema(schema)).unwrap();
//! table.mount();
//! table.set_source(records);
//! table.dispatch(TableAction::SetGlobalFilter("villa".to_string()));
//!
//! assert_eq!(table.view().filtered_count, 1);
//! assert_eq!(table.query(), "?p_search=villa");
//! ```

pub mod value;
pub mod record;
pub mod filter;
pub mod sort;
pub mod paginate;
pub mod selection;
pub mod state;
pub mod codec;
pub mod location;
pub mod pipeline;
pub mod debounce;
pub mod source;
pub mod export;
pub mod adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod fixtures;

pub use value::{Value, ValueKind};
pub use record::{ColumnDef, FieldAliases, IngestOptions, Record, RecordId, RecordSet, Schema};
pub use filter::{apply_filters, distinct_values, ColumnFilter, ColumnFilters, Operator};
pub use sort::{apply_sort, SortDirection, SortKey};
pub use paginate::{paginate, Page, PageInfo};
pub use selection::Selection;
pub use state::{SelectScope, TableAction, TableState, DEFAULT_PAGE_SIZE};
pub use codec::UrlCodec;
pub use location::{KeyValueStore, Location, MemoryHistory, MemoryStore, StateStore, SyncTarget};
pub use pipeline::{Memo, MemoKey, PipelineOutput};
pub use debounce::{Debouncer, DEFAULT_SEARCH_DELAY};
pub use source::{resolve_rows, LoadOrigin, LoadSequencer, LoadTicket, LoadedRows, SourceStatus};
pub use export::{export_filename, write_csv, CsvExport};
pub use adapter::{build_grid, EmptyState, GridColumn, GridModel, GridRow};
pub use config::TableConfig;
pub use controller::{Phase, TableController};
pub use error::{ErrorSink, LogSink, PipelineStage, RecordingSink, TableError};

// HTTP server modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod messages;
#[cfg(feature = "server")]
pub mod server;
