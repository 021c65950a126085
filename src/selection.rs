//! Row selection.
//!
//! The selection is policy-free: callers decide whether "select all" means
//! the current page or the whole filtered result and pass the identifiers
//! in. [`RecordId`] cannot be empty, so nothing invalid can be stored.

use crate::record::RecordId;
use std::collections::{btree_set, BTreeSet, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    ids: BTreeSet<RecordId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add if absent, remove if present. Returns whether the id is now selected.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Toggle from raw input, rejecting empty identifiers.
    pub fn toggle_raw(&mut self, raw: &str) -> Option<bool> {
        RecordId::new(raw).map(|id| self.toggle(id))
    }

    /// Replace the selection with exactly `ids`.
    pub fn select_all<I: IntoIterator<Item = RecordId>>(&mut self, ids: I) {
        self.ids = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only identifiers that are still valid. Returns how many were dropped.
    pub fn reconcile(&mut self, valid: &HashSet<RecordId>) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| valid.contains(id));
        before - self.ids.len()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, RecordId> {
        self.ids.iter()
    }

    /// True when every id in `ids` is selected and `ids` is not empty.
    pub fn covers<'a, I: IntoIterator<Item = &'a RecordId>>(&self, ids: I) -> bool {
        let mut any = false;
        for id in ids {
            if !self.ids.contains(id) {
                return false;
            }
            any = true;
        }
        any
    }
}

impl FromIterator<RecordId> for Selection {
    fn from_iter<I: IntoIterator<Item = RecordId>>(iter: I) -> Self {
        Selection {
            ids: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a RecordId;
    type IntoIter = btree_set::Iter<'a, RecordId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}
