//! Pagination engine.

use serde::Serialize;
use std::ops::Range;

/// One page of a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub info: PageInfo,
}

/// Page position without the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Page actually shown; may be lower than the one requested.
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    /// Never less than one, even for an empty result.
    pub total_pages: usize,
}

impl PageInfo {
    /// Compute the page window, clamping `page` into range.
    ///
    /// A zero `page_size` is treated as one.
    pub fn new(total_count: usize, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(page_size).max(1);
        PageInfo {
            page: page.min(total_pages - 1),
            page_size,
            total_count,
            total_pages,
        }
    }

    /// Index range of the page within the full result.
    pub fn range(&self) -> Range<usize> {
        let start = (self.page * self.page_size).min(self.total_count);
        let end = (start + self.page_size).min(self.total_count);
        start..end
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }
}

/// Slice `items` into the requested page.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let info = PageInfo::new(items.len(), page, page_size);
    Page {
        items: &items[info.range()],
        info,
    }
}
