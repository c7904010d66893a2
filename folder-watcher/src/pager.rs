//! Page slicing for consumers that render snapshots as a grid.
//!
//! Pages list the newest files first, so page 0 always shows the latest
//! discoveries.

use crate::config::ViewSettings;
use crate::record::FileRecord;

/// Number of pages needed for `len` records.
pub fn page_count(len: usize, items_per_page: usize) -> usize {
    len.div_ceil(items_per_page.max(1))
}

/// Move `delta` pages from `page`, staying within `0..pages`.
pub fn step_page(page: usize, delta: isize, pages: usize) -> usize {
    let last = pages.saturating_sub(1);
    page.saturating_add_signed(delta).min(last)
}

/// A page of records, newest first.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    /// Zero-based page number.
    pub number: usize,

    /// Total pages for the snapshot.
    pub pages: usize,

    /// Records on this page.
    pub records: Vec<&'a FileRecord>,
}

impl<'a> Page<'a> {
    /// Slice `records` (oldest first) starting `first` records from the newest.
    pub fn of(records: &'a [FileRecord], first: usize, items_per_page: usize) -> Self {
        let items_per_page = items_per_page.max(1);
        Self {
            number: first / items_per_page,
            pages: page_count(records.len(), items_per_page),
            records: records
                .iter()
                .rev()
                .skip(first)
                .take(items_per_page)
                .collect(),
        }
    }

    /// Page number `page` using the given settings.
    pub fn numbered(records: &'a [FileRecord], page: usize, settings: &ViewSettings) -> Self {
        Self::of(
            records,
            page.saturating_mul(settings.items_per_page),
            settings.items_per_page,
        )
    }

    /// Records split into rows of `columns` cells.
    pub fn rows(&self, columns: usize) -> impl Iterator<Item = &[&'a FileRecord]> {
        self.records.chunks(columns.max(1))
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
