//! Grid server
//!
//! Serves the transactions table over HTTP. The upstream record source and
//! the table configuration come from the environment.

use gridstate::server::{default_config, load_transactions, run_server, AppState};
use gridstate::TableConfig;
use std::io;

fn config_from_env() -> io::Result<TableConfig> {
    let Ok(path) = std::env::var("GRID_CONFIG") else {
        return Ok(default_config());
    };
    let json = std::fs::read_to_string(&path)?;
    let mut config = TableConfig::from_json(&json)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{}: {}", path, e)))?;
    if config.schema.is_empty() {
        config.schema = default_config().schema;
    }
    Ok(config)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("PORT: {}", e)))?;

    let config = config_from_env()?;
    let source_url = std::env::var("GRID_SOURCE_URL").ok();

    let state = AppState::new();
    state.insert("transactions", load_transactions(config, source_url.as_deref()).await);

    run_server(&host, port, state).await
}
