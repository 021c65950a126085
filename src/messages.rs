//! JSON bodies returned by the HTTP surface.

use crate::adapter::GridModel;
use crate::source::LoadOrigin;
use serde::Serialize;

#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Health {
        status: String,
        tables: Vec<String>,
    },

    /// One page of a table in response to `GET /api/{table}`.
    #[serde(rename_all = "camelCase")]
    TableView {
        table: String,
        /// Canonical query for the state that was served; the client can
        /// put it in its address bar as is.
        query: String,
        origin: LoadOrigin,
        grid: GridModel,
    },

    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
