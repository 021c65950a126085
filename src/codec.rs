//! Query-string codec for [`TableState`].
//!
//! Only fields that differ from the defaults are written, each under a
//! parameter name namespaced by the table's prefix (`p_search`,
//! `p_columnFilters`, `p_sortField`, `p_sortDirection`, `p_page`,
//! `p_pageSize`, `p_selected`). Decoding never fails: anything malformed
//! falls back to the default for that field.
//!
//! ```
//! use gridstate::{TableAction, TableState, UrlCodec};
//!
//! let codec = UrlCodec::new("p", TableState::default());
//! let mut state = TableState::default();
//! state.apply(TableAction::SetGlobalFilter("villa".to_string()));
//! state.apply(TableAction::SetPage(1));
//!
//! assert_eq!(codec.encode(&state), "?p_search=villa&p_page=1");
//! assert_eq!(codec.decode("?p_search=villa&p_page=1"), state);
//! ```

use crate::filter::{ColumnFilter, ColumnFilters};
use crate::record::RecordId;
use crate::selection::Selection;
use crate::sort::SortDirection;
use crate::state::TableState;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::BTreeMap;
use url::form_urlencoded;

const SEARCH: &str = "search";
const COLUMN_FILTERS: &str = "columnFilters";
const SORT_FIELD: &str = "sortField";
const SORT_DIRECTION: &str = "sortDirection";
const PAGE: &str = "page";
const PAGE_SIZE: &str = "pageSize";
const SELECTED: &str = "selected";

const PARAMS: [&str; 7] = [
    SEARCH,
    COLUMN_FILTERS,
    SORT_FIELD,
    SORT_DIRECTION,
    PAGE,
    PAGE_SIZE,
    SELECTED,
];

/// Characters escaped inside one identifier of the comma-joined list.
const ID_ESCAPES: &AsciiSet = &CONTROLS.add(b',').add(b'%');

/// Encodes one table's state as prefixed query parameters.
///
/// Values equal to `defaults` are left out, so a fresh table has an empty
/// query and a bookmark only carries what the user changed.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlCodec {
    prefix: String,
    defaults: TableState,
}

impl UrlCodec {
    /// Codec for parameters named `{prefix}_{name}`. An empty prefix uses the
    /// bare names.
    pub fn new(prefix: impl Into<String>, defaults: TableState) -> Self {
        UrlCodec {
            prefix: prefix.into(),
            defaults,
        }
    }

    /// Namespace shared by every parameter this codec owns.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// State that encodes to nothing and fills in absent parameters.
    pub fn defaults(&self) -> &TableState {
        &self.defaults
    }

    /// Full parameter name for `name`, e.g. `p_search`.
    pub fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.prefix, name)
        }
    }

    /// True for the parameters this codec reads and writes.
    pub fn owns(&self, key: &str) -> bool {
        PARAMS.iter().any(|name| self.key(name) == key)
    }

    /// Parameter pairs for the non-default fields of `state`.
    pub fn pairs(&self, state: &TableState) -> Vec<(String, String)> {
        let defaults = &self.defaults;
        let mut pairs = Vec::new();

        if state.global_filter != defaults.global_filter {
            pairs.push((self.key(SEARCH), state.global_filter.clone()));
        }
        if state.column_filters != defaults.column_filters {
            match serde_json::to_string(&state.column_filters) {
                Ok(json) => pairs.push((self.key(COLUMN_FILTERS), json)),
                Err(err) => log::warn!("could not encode column filters: {}", err),
            }
        }
        if state.sort_field != defaults.sort_field {
            if let Some(field) = &state.sort_field {
                pairs.push((self.key(SORT_FIELD), field.clone()));
            }
        }
        if state.sort_direction != defaults.sort_direction {
            pairs.push((self.key(SORT_DIRECTION), state.sort_direction.to_string()));
        }
        if state.page != defaults.page {
            pairs.push((self.key(PAGE), state.page.to_string()));
        }
        if state.page_size != defaults.page_size {
            pairs.push((self.key(PAGE_SIZE), state.page_size.to_string()));
        }
        if state.selection != defaults.selection && !state.selection.is_empty() {
            pairs.push((self.key(SELECTED), encode_ids(&state.selection)));
        }

        pairs
    }

    /// Query string for `state`: `""` when everything is default,
    /// otherwise `?k=v&...`.
    pub fn encode(&self, state: &TableState) -> String {
        with_question_mark(serialize(self.pairs(state)))
    }

    /// Write `state` into an existing query string shared with other
    /// tables, keeping every parameter this codec does not own.
    pub fn merge_into(&self, existing: &str, state: &TableState) -> String {
        let foreign = parse(existing)
            .into_iter()
            .filter(|(key, _)| !self.owns(key));
        with_question_mark(serialize(foreign.chain(self.pairs(state))))
    }

    /// Parse a query string (with or without the leading `?`).
    pub fn decode(&self, query: &str) -> TableState {
        let mut state = self.defaults.clone();

        for (key, value) in parse(query) {
            let Some(name) = self.param_name(&key) else {
                continue;
            };
            match name {
                SEARCH => state.global_filter = value,
                COLUMN_FILTERS => state.column_filters = decode_filters(&value),
                SORT_FIELD => {
                    state.sort_field = if value.trim().is_empty() { None } else { Some(value) };
                }
                SORT_DIRECTION => {
                    state.sort_direction = SortDirection::parse(&value).unwrap_or_else(|| {
                        log::debug!("unrecognised sort direction '{}'", value);
                        self.defaults.sort_direction
                    });
                }
                PAGE => state.page = parse_or(&value, self.defaults.page, |_| true),
                PAGE_SIZE => state.page_size = parse_or(&value, self.defaults.page_size, |n| n > 0),
                SELECTED => state.selection = decode_ids(&value),
                _ => {}
            }
        }

        state
    }

    fn param_name(&self, key: &str) -> Option<&'static str> {
        PARAMS.iter().copied().find(|name| self.key(name) == key)
    }
}

fn parse(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn serialize<I: IntoIterator<Item = (String, String)>>(pairs: I) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn with_question_mark(query: String) -> String {
    if query.is_empty() {
        query
    } else {
        format!("?{}", query)
    }
}

fn parse_or(value: &str, default: usize, valid: impl Fn(usize) -> bool) -> usize {
    match value.trim().parse::<usize>() {
        Ok(n) if valid(n) => n,
        _ => {
            log::debug!("unusable numeric parameter '{}'", value);
            default
        }
    }
}

/// Unknown or malformed JSON yields an empty filter map.
fn decode_filters(json: &str) -> ColumnFilters {
    match serde_json::from_str::<BTreeMap<String, ColumnFilter>>(json) {
        Ok(map) => map.into_values().collect(),
        Err(err) => {
            log::debug!("dropping malformed column filters: {}", err);
            ColumnFilters::new()
        }
    }
}

fn encode_ids(selection: &Selection) -> String {
    selection
        .iter()
        .map(|id| utf8_percent_encode(id.as_str(), ID_ESCAPES).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_ids(value: &str) -> Selection {
    value
        .split(',')
        .filter_map(|part| {
            let decoded = percent_decode_str(part).decode_utf8_lossy();
            RecordId::new(decoded.into_owned())
        })
        .collect()
}
