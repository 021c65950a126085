//! Record source loading.
//!
//! Loads are asynchronous and may overlap. Each one takes a [`LoadTicket`]
//! from a [`LoadSequencer`]; only the most recently issued ticket may
//! publish its rows, so a slow stale response can never overwrite a newer
//! one. A failed, timed-out or empty remote load falls back to a static
//! dataset.

use crate::error::TableError;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Handle for one in-flight load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Issues load tickets; the newest one wins.
#[derive(Debug, Clone, Default)]
pub struct LoadSequencer {
    latest: u64,
}

impl LoadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket {
            generation: self.latest,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.latest
    }

    /// Pass `result` through only if `ticket` is still the newest load.
    pub fn accept<T>(&self, ticket: LoadTicket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            log::warn!(
                "discarding stale load {} (latest is {})",
                ticket.generation,
                self.latest
            );
            None
        }
    }
}

/// Whether the table has data to work with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceStatus {
    /// No load has completed yet.
    #[default]
    Pending,
    Ready,
    /// The load failed and no records could be supplied.
    Unavailable(String),
}

/// Where a set of rows came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LoadOrigin {
    Remote,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRows {
    pub rows: Vec<JsonValue>,
    pub origin: LoadOrigin,
}

/// Use the remote rows when they arrived and are not empty, otherwise the
/// fallback dataset.
pub fn resolve_rows<F>(remote: Result<Vec<JsonValue>, TableError>, fallback: F) -> LoadedRows
where
    F: FnOnce() -> Vec<JsonValue>,
{
    match remote {
        Ok(rows) if !rows.is_empty() => LoadedRows {
            rows,
            origin: LoadOrigin::Remote,
        },
        Ok(_) => {
            log::info!("record source returned no rows, using fallback data");
            LoadedRows {
                rows: fallback(),
                origin: LoadOrigin::Fallback {
                    reason: "no data received".to_string(),
                },
            }
        }
        Err(err) => {
            log::info!("record source unavailable ({}), using fallback data", err);
            LoadedRows {
                rows: fallback(),
                origin: LoadOrigin::Fallback {
                    reason: err.to_string(),
                },
            }
        }
    }
}

#[cfg(feature = "server")]
pub mod http {
    use super::{resolve_rows, LoadedRows};
    use crate::error::TableError;
    use serde_json::Value as JsonValue;
    use std::time::Duration;

    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

    /// GET a JSON array of rows.
    pub async fn fetch_rows(client: &reqwest::Client, url: &str) -> Result<Vec<JsonValue>, TableError> {
        let request = async {
            let response = client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| TableError::SourceUnavailable(e.to_string()))?;
            response
                .json::<Vec<JsonValue>>()
                .await
                .map_err(|e| TableError::SourceUnavailable(e.to_string()))
        };

        match tokio::time::timeout(FETCH_TIMEOUT, request).await {
            Ok(result) => result,
            Err(_) => Err(TableError::SourceUnavailable(format!(
                "no response from {} within {}s",
                url,
                FETCH_TIMEOUT.as_secs()
            ))),
        }
    }

    pub async fn load_with_fallback<F>(client: &reqwest::Client, url: &str, fallback: F) -> LoadedRows
    where
        F: FnOnce() -> Vec<JsonValue>,
    {
        resolve_rows(fetch_rows(client, url).await, fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_latest_ticket_wins() {
        let mut sequencer = LoadSequencer::new();
        let slow = sequencer.begin();
        let fast = sequencer.begin();

        assert_eq!(sequencer.accept(fast, "fresh"), Some("fresh"));
        // The earlier request resolves afterwards and is dropped
        assert_eq!(sequencer.accept(slow, "stale"), None);
        assert!(sequencer.is_current(fast));
        assert_eq!(fast.generation(), 2);
    }

    #[test]
    fn test_resolve_prefers_remote() {
        let loaded = resolve_rows(Ok(vec![json!({"id": 1})]), || vec![json!({"id": 99})]);
        assert_eq!(loaded.origin, LoadOrigin::Remote);
        assert_eq!(loaded.rows, vec![json!({"id": 1})]);
    }

    #[test]
    fn test_resolve_falls_back() {
        let loaded = resolve_rows(Ok(Vec::new()), || vec![json!({"id": 99})]);
        assert_eq!(
            loaded.origin,
            LoadOrigin::Fallback {
                reason: "no data received".to_string()
            }
        );

        let loaded = resolve_rows(
            Err(TableError::SourceUnavailable("timed out".to_string())),
            || vec![json!({"id": 99})],
        );
        assert!(matches!(loaded.origin, LoadOrigin::Fallback { ref reason } if reason.contains("timed out")));
        assert_eq!(loaded.rows.len(), 1);
    }
}
