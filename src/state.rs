//! Table state and the actions that mutate it.

use crate::filter::{ColumnFilter, ColumnFilters};
use crate::record::RecordId;
use crate::selection::Selection;
use crate::sort::{SortDirection, SortKey};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Everything needed to reproduce what one table shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableState {
    pub global_filter: String,
    pub column_filters: ColumnFilters,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    pub page: usize,
    /// Always greater than zero.
    pub page_size: usize,
    pub selection: Selection,
}

impl Default for TableState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

/// Which identifiers a "select all" covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectScope {
    /// Every record passing the current filters, across pages.
    Filtered,
    /// Only the rows on the visible page.
    Page,
}

/// A user interaction against one table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    SetGlobalFilter(String),
    SetColumnFilter(ColumnFilter),
    RemoveColumnFilter(String),
    /// Header click: a new column sorts ascending, the active one toggles.
    SortBy(String),
    SetSort(Option<SortKey>),
    SetPage(usize),
    SetPageSize(usize),
    ToggleRow(RecordId),
    SelectAll(SelectScope),
    SelectIds(Vec<RecordId>),
    ClearSelection,
    /// Clear search, column filters, sort, page and selection.
    ResetFilters,
}

impl TableAction {
    /// Actions that change the filtered set send the table back to page 0.
    pub fn resets_page(&self) -> bool {
        matches!(
            self,
            TableAction::SetGlobalFilter(_)
                | TableAction::SetColumnFilter(_)
                | TableAction::RemoveColumnFilter(_)
                | TableAction::ResetFilters
        )
    }
}

impl TableState {
    pub fn with_page_size(page_size: usize) -> Self {
        TableState {
            global_filter: String::new(),
            column_filters: ColumnFilters::new(),
            sort_field: None,
            sort_direction: SortDirection::Asc,
            page: 0,
            page_size: page_size.max(1),
            selection: Selection::new(),
        }
    }

    /// Active sort, if a field is set.
    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_field.as_ref().map(|field| SortKey {
            field: field.clone(),
            direction: self.sort_direction,
        })
    }

    /// Apply an action in place.
    ///
    /// [`TableAction::SelectAll`] needs the pipeline's output and is turned
    /// into [`TableAction::SelectIds`] by the controller; here it is a no-op.
    pub fn apply(&mut self, action: TableAction) {
        let resets_page = action.resets_page();

        match action {
            TableAction::SetGlobalFilter(text) => self.global_filter = text,
            TableAction::SetColumnFilter(filter) => self.column_filters.set(filter),
            TableAction::RemoveColumnFilter(field) => {
                self.column_filters.remove(&field);
            }
            TableAction::SortBy(field) => {
                if field.trim().is_empty() {
                    log::debug!("ignoring sort on an empty field name");
                } else if self.sort_field.as_deref() == Some(field.as_str()) {
                    self.sort_direction = self.sort_direction.toggled();
                } else {
                    self.sort_field = Some(field);
                    self.sort_direction = SortDirection::Asc;
                }
            }
            TableAction::SetSort(key) => match key {
                Some(key) if key.field.trim().is_empty() => {
                    log::debug!("ignoring sort on an empty field name");
                }
                Some(key) => {
                    self.sort_field = Some(key.field);
                    self.sort_direction = key.direction;
                }
                None => {
                    self.sort_field = None;
                    self.sort_direction = SortDirection::Asc;
                }
            },
            TableAction::SetPage(page) => self.page = page,
            TableAction::SetPageSize(size) => {
                if size == 0 {
                    log::debug!("ignoring page size of zero");
                } else {
                    self.page_size = size;
                }
            }
            TableAction::ToggleRow(id) => {
                self.selection.toggle(id);
            }
            TableAction::SelectAll(_) => {}
            TableAction::SelectIds(ids) => self.selection.select_all(ids),
            TableAction::ClearSelection => self.selection.clear(),
            TableAction::ResetFilters => {
                self.global_filter.clear();
                self.column_filters.clear();
                self.sort_field = None;
                self.sort_direction = SortDirection::Asc;
                self.selection.clear();
            }
        }

        if resets_page {
            self.page = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Operator;

    fn id(s: &str) -> RecordId {
        RecordId::new(s).unwrap()
    }

    #[test]
    fn test_defaults() {
        let state = TableState::default();
        assert_eq!(state.page_size, 25);
        assert_eq!(state.page, 0);
        assert!(state.sort_key().is_none());
        assert_eq!(TableState::with_page_size(0).page_size, 1);
    }

    #[test]
    fn test_sort_by_toggles_active_column() {
        let mut state = TableState::default();
        state.apply(TableAction::SortBy("date".to_string()));
        assert_eq!(state.sort_key(), Some(SortKey::ascending("date")));

        state.apply(TableAction::SortBy("date".to_string()));
        assert_eq!(state.sort_key(), Some(SortKey::descending("date")));

        // A different column replaces the key and starts ascending
        state.apply(TableAction::SortBy("amount".to_string()));
        assert_eq!(state.sort_key(), Some(SortKey::ascending("amount")));
    }

    #[test]
    fn test_empty_sort_field_is_ignored() {
        let mut state = TableState::default();
        state.apply(TableAction::SortBy(String::new()));
        assert!(state.sort_key().is_none());

        state.apply(TableAction::SortBy("date".to_string()));
        state.apply(TableAction::SortBy("  ".to_string()));
        state.apply(TableAction::SetSort(Some(SortKey::descending(""))));
        assert_eq!(state.sort_key(), Some(SortKey::ascending("date")));

        state.apply(TableAction::SetSort(None));
        assert!(state.sort_key().is_none());
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let mut state = TableState::default();
        state.apply(TableAction::SetPage(3));
        assert_eq!(state.page, 3);

        state.apply(TableAction::SetGlobalFilter("villa".to_string()));
        assert_eq!(state.page, 0);

        state.apply(TableAction::SetPage(2));
        state.apply(TableAction::SetColumnFilter(ColumnFilter::new("amount", Operator::GreaterThan, "0")));
        assert_eq!(state.page, 0);
        assert_eq!(state.column_filters.len(), 1);

        state.apply(TableAction::SetPage(2));
        state.apply(TableAction::SortBy("amount".to_string()));
        assert_eq!(state.page, 2);
    }

    #[test]
    fn test_page_size_zero_is_ignored() {
        let mut state = TableState::default();
        state.apply(TableAction::SetPageSize(0));
        assert_eq!(state.page_size, 25);
        state.apply(TableAction::SetPageSize(5));
        assert_eq!(state.page_size, 5);
    }

    #[test]
    fn test_reset_filters_keeps_page_size() {
        let mut state = TableState::with_page_size(10);
        state.apply(TableAction::SetGlobalFilter("x".to_string()));
        state.apply(TableAction::SortBy("name".to_string()));
        state.apply(TableAction::ToggleRow(id("1")));
        state.apply(TableAction::SetPage(4));

        state.apply(TableAction::ResetFilters);
        assert_eq!(state, TableState::with_page_size(10));
    }

    #[test]
    fn test_selection_actions() {
        let mut state = TableState::default();
        state.apply(TableAction::SelectIds(vec![id("1"), id("2")]));
        assert_eq!(state.selection.len(), 2);

        state.apply(TableAction::ToggleRow(id("2")));
        assert_eq!(state.selection.len(), 1);

        state.apply(TableAction::SelectAll(SelectScope::Filtered));
        assert_eq!(state.selection.len(), 1);

        state.apply(TableAction::ClearSelection);
        assert!(state.selection.is_empty());
    }
}
