//! HTTP server exposing configured tables.
//!
//! Each request carries the table's state in its query string, exactly as
//! the browser address bar would. The server decodes it, runs the pipeline
//! and answers with the grid plus the canonical query.

use actix_web::{http::header, middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::adapter::{build_grid, GridModel};
use crate::config::TableConfig;
use crate::error::{LogSink, TableError};
use crate::export::{export, CsvExport};
use crate::fixtures::{transaction_rows, transaction_schema, TRANSACTIONS_TITLE};
use crate::messages::ServerMessage;
use crate::pipeline::run;
use crate::record::RecordSet;
use crate::source::{http::load_with_fallback, resolve_rows, LoadOrigin, SourceStatus};
use crate::state::TableState;

/// One table served over HTTP.
#[derive(Debug, Clone)]
pub struct TableData {
    pub title: String,
    pub config: TableConfig,
    pub records: RecordSet,
    pub origin: LoadOrigin,
}

impl TableData {
    /// Decode `query`, clamp the page and prune unknown selections, the
    /// same way a controller would on hydration.
    fn resolve(&self, query: &str) -> TableState {
        let mut state = self.config.codec().decode(query);
        state.selection.reconcile(&self.records.ids());
        state
    }

    /// The grid for `query` and the canonical form of that query.
    pub fn render(&self, query: &str) -> (String, GridModel) {
        let mut state = self.resolve(query);
        let output = run(self.records.records(), &self.config.schema, &state, &LogSink);
        state.page = output.page.page;

        let grid = build_grid(
            self.records.records(),
            &self.config.schema,
            &state,
            &output,
            &SourceStatus::Ready,
        );
        (self.config.codec().encode(&state), grid)
    }

    /// CSV of every row matching `query`, ignoring pagination.
    pub fn export(&self, query: &str, date: NaiveDate) -> Result<CsvExport, TableError> {
        let state = self.resolve(query);
        let output = run(self.records.records(), &self.config.schema, &state, &LogSink);
        export(self.records.records(), &output, &self.config.schema, &self.title, date)
    }
}

/// Shared state for all workers.
#[derive(Clone, Default)]
pub struct AppState {
    pub tables: Arc<RwLock<HashMap<String, TableData>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `table` under `name`, replacing any table already there.
    pub fn insert(&self, name: impl Into<String>, table: TableData) {
        if let Ok(mut tables) = self.tables.write() {
            tables.insert(name.into(), table);
        }
    }

    /// Registered table names in sorted order.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.tables.read() {
            Ok(tables) => tables.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    fn with_table<T>(&self, name: &str, f: impl FnOnce(&TableData) -> T) -> Option<T> {
        self.tables.read().ok()?.get(name).map(f)
    }
}

/// Load the transactions table from `source_url`, or the bundled rows when
/// there is none or it fails.
pub async fn load_transactions(config: TableConfig, source_url: Option<&str>) -> TableData {
    let loaded = match source_url {
        Some(url) => {
            let client = reqwest::Client::new();
            load_with_fallback(&client, url, transaction_rows).await
        }
        None => resolve_rows(
            Err(TableError::SourceUnavailable("no source configured".to_string())),
            transaction_rows,
        ),
    };

    let options = config.ingest_options();
    let (records, origin) = match RecordSet::from_json(&loaded.rows, &config.schema, &options) {
        Ok(records) => (records, loaded.origin),
        Err(err) => {
            log::warn!("rejecting source rows: {}", err);
            let records = RecordSet::from_json(&transaction_rows(), &config.schema, &options)
                .unwrap_or_default();
            (records, LoadOrigin::Fallback { reason: err.to_string() })
        }
    };
    log::info!("transactions table ready with {} records", records.len());

    TableData {
        title: TRANSACTIONS_TITLE.to_string(),
        config,
        records,
        origin,
    }
}

/// Configuration for the transactions table when none is supplied.
pub fn default_config() -> TableConfig {
    TableConfig::default().with_schema(transaction_schema())
}

async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ServerMessage::Health {
        status: "ok".to_string(),
        tables: state.table_names(),
    })
}

async fn table_view(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let name = path.into_inner();
    let query = req.query_string();

    let message = state.with_table(&name, |table| {
        let (query, grid) = table.render(query);
        ServerMessage::TableView {
            table: name.clone(),
            query,
            origin: table.origin.clone(),
            grid,
        }
    });

    match message {
        Some(message) => HttpResponse::Ok().json(message),
        None => HttpResponse::NotFound().json(ServerMessage::error(format!("unknown table '{}'", name))),
    }
}

async fn table_export(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let name = path.into_inner();
    let today = Local::now().date_naive();

    match state.with_table(&name, |table| table.export(req.query_string(), today)) {
        Some(Ok(csv)) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", csv.filename),
            ))
            .body(csv.content),
        Some(Err(err)) => {
            log::error!("export of '{}' failed: {}", name, err);
            HttpResponse::InternalServerError().json(ServerMessage::error(err.to_string()))
        }
        None => HttpResponse::NotFound().json(ServerMessage::error(format!("unknown table '{}'", name))),
    }
}

/// Start the HTTP server.
pub async fn run_server(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);

    log::info!("grid server listening on http://{}:{}", host, port);
    for name in state.table_names() {
        log::info!("  table: http://{}:{}/api/{}", host, port, name);
    }

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(
                actix_cors::Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(health_check))
            .route("/api/{table}", web::get().to(table_view))
            .route("/api/{table}/export.csv", web::get().to(table_export))
    })
    .bind((host, port))?
    .run()
    .await
}
