//! Where encoded table state is persisted.
//!
//! A navigable runtime exposes a [`Location`] (the address bar). Writes use
//! history *replace*, so typing into a filter does not add back-button
//! entries. Without a location the same encoded query is kept in a
//! [`KeyValueStore`] under a per-table key instead.

use crate::codec::UrlCodec;
use crate::state::TableState;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// The query part of a navigable URL.
pub trait Location {
    /// Current query string, with or without the leading `?`.
    fn query(&self) -> String;

    /// Replace the current history entry's query without navigating.
    fn replace_query(&mut self, query: &str);
}

/// Local key-value persistence for runtimes without a URL.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory browser history with back/forward navigation.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryHistory {
    /// History with a single entry holding `initial_query`.
    pub fn new(initial_query: impl Into<String>) -> Self {
        MemoryHistory {
            entries: vec![initial_query.into()],
            cursor: 0,
        }
    }

    /// Navigate to a new entry, discarding any forward entries.
    pub fn push(&mut self, query: impl Into<String>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(query.into());
        self.cursor = self.entries.len() - 1;
    }

    /// Returns false when already at the oldest entry.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Returns false when already at the newest entry.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Number of entries, including any forward ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location for MemoryHistory {
    fn query(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn replace_query(&mut self, query: &str) {
        self.entries[self.cursor] = query.to_string();
    }
}

/// [`KeyValueStore`] backed by a map, standing in for session storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Which side of a [`StateStore`] holds the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    Location,
    Fallback,
}

/// Reads and writes one table's encoded state.
pub struct StateStore {
    location: Option<Rc<RefCell<dyn Location>>>,
    fallback: Rc<RefCell<dyn KeyValueStore>>,
    key: String,
    last_written: Option<SyncTarget>,
}

impl StateStore {
    /// Store writing to `location` when there is one, else to `fallback`
    /// under `gridstate.{prefix}`.
    pub fn new(
        location: Option<Rc<RefCell<dyn Location>>>,
        fallback: Rc<RefCell<dyn KeyValueStore>>,
        prefix: &str,
    ) -> Self {
        StateStore {
            location,
            fallback,
            key: format!("gridstate.{}", prefix),
            last_written: None,
        }
    }

    /// Store with a fallback only, for runtimes with no URL.
    pub fn detached(fallback: Rc<RefCell<dyn KeyValueStore>>, prefix: &str) -> Self {
        Self::new(None, fallback, prefix)
    }

    /// Key used in the fallback store.
    pub fn fallback_key(&self) -> &str {
        &self.key
    }

    /// Target of the most recent write, if any.
    pub fn last_written(&self) -> Option<SyncTarget> {
        self.last_written
    }

    /// Where the next read comes from: whichever target wrote last, else
    /// the location when there is one.
    pub fn read_target(&self) -> SyncTarget {
        match (self.last_written, &self.location) {
            (Some(target), _) => target,
            (None, Some(_)) => SyncTarget::Location,
            (None, None) => SyncTarget::Fallback,
        }
    }

    /// Encoded state from the current read target. Empty when nothing has
    /// been stored.
    pub fn read(&self) -> String {
        match (self.read_target(), &self.location) {
            (SyncTarget::Location, Some(location)) => location.borrow().query(),
            _ => self.fallback.borrow().get(&self.key).unwrap_or_default(),
        }
    }

    /// Write `state` and return the query that was stored.
    pub fn write(&mut self, codec: &UrlCodec, state: &TableState) -> String {
        match &self.location {
            Some(location) => {
                let mut location = location.borrow_mut();
                let query = codec.merge_into(&location.query(), state);
                location.replace_query(&query);
                self.last_written = Some(SyncTarget::Location);
                query
            }
            None => {
                let query = codec.encode(state);
                let mut fallback = self.fallback.borrow_mut();
                if query.is_empty() {
                    fallback.remove(&self.key);
                } else {
                    fallback.set(&self.key, query.clone());
                }
                self.last_written = Some(SyncTarget::Fallback);
                query
            }
        }
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("has_location", &self.location.is_some())
            .field("key", &self.key)
            .field("last_written", &self.last_written)
            .finish()
    }
}
