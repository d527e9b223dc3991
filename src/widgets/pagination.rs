//! Pagination controls derived from the server total

use crate::core::error::CollectionResult;
use crate::core::query::PaginationMeta;
use crate::core::state::PaginationState;
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Page-change event emitted by the controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PageChange {
    First,
    Previous,
    Next,
    Last,
    /// Jump to a zero-based page; clamped to the last page
    Index(usize),
    /// New page size; goes back to the first page
    Size(usize),
}

impl PageChange {
    /// Pagination after applying this change, given the total page count
    pub fn resolve(self, current: PaginationState, total_pages: usize) -> PaginationState {
        let last = total_pages.saturating_sub(1);
        match self {
            PageChange::First => current.first_page(),
            PageChange::Previous => PaginationState {
                page_index: current.page_index.saturating_sub(1),
                ..current
            },
            PageChange::Next => PaginationState {
                page_index: current.page_index.saturating_add(1).min(last),
                ..current
            },
            PageChange::Last => PaginationState {
                page_index: last,
                ..current
            },
            PageChange::Index(index) => PaginationState {
                page_index: index.min(last),
                ..current
            },
            PageChange::Size(size) => PaginationState::new(size),
        }
    }
}

pub struct PaginationWidget<'a, T> {
    table: Table<'a, T>,
    page_size_options: &'a [usize],
}

impl<'a, T> PaginationWidget<'a, T> {
    pub fn new(table: Table<'a, T>, page_size_options: &'a [usize]) -> Self {
        Self {
            table,
            page_size_options,
        }
    }

    pub fn meta(&self) -> PaginationMeta {
        let pagination = self.table.state().pagination;
        PaginationMeta::new(
            pagination.page_index,
            pagination.page_size,
            self.table.total_count(),
        )
    }

    /// `ceil(total / page_size)`; zero when there are no rows at all
    pub fn total_pages(&self) -> usize {
        self.meta().total_pages
    }

    pub fn page_index(&self) -> usize {
        self.table.state().pagination.page_index
    }

    pub fn page_size(&self) -> usize {
        self.table.state().pagination.page_size
    }

    pub fn page_size_options(&self) -> &[usize] {
        self.page_size_options
    }

    pub fn can_previous_page(&self) -> bool {
        self.meta().has_prev
    }

    pub fn can_next_page(&self) -> bool {
        self.meta().has_next
    }

    /// "Page 2 of 5"; an empty collection reads "Page 0 of 0"
    pub fn page_label(&self) -> String {
        let total = self.total_pages();
        let current = if total == 0 { 0 } else { self.page_index().saturating_add(1) };
        format!("Page {} of {}", current, total)
    }

    /// Selected rows among the loaded page, and the page row count
    pub fn selection_counts(&self) -> (usize, usize) {
        (self.table.selected_rows().len(), self.table.row_count())
    }

    pub fn selection_label(&self) -> String {
        let (selected, rows) = self.selection_counts();
        format!("{} of {} row(s) selected.", selected, rows)
    }

    /// Up to `width` zero-based page indices centred on the current page
    pub fn page_window(&self, width: usize) -> Vec<usize> {
        let total = self.total_pages();
        if total == 0 || width == 0 {
            return Vec::new();
        }
        let width = width.min(total);
        let start = self
            .page_index()
            .saturating_sub(width / 2)
            .min(total - width);
        (start..start + width).collect()
    }

    /// Apply a page-change event to the store
    pub fn apply(&mut self, change: PageChange) -> CollectionResult<bool> {
        let next = change.resolve(self.table.state().pagination, self.total_pages());
        self.table.store_mut().set_pagination(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adapter::QueryResult;
    use crate::core::state::RowSelectionState;
    use crate::core::store::ViewStateStore;
    use crate::table::TableBinding;
    use std::sync::Arc;

    fn total(n: u64) -> Arc<QueryResult<u32>> {
        Arc::new(QueryResult {
            items: vec![1, 2, 3],
            total_count: n,
        })
    }

    fn store(page_index: usize, page_size: usize) -> ViewStateStore {
        let mut store = ViewStateStore::default();
        store
            .set_pagination(PaginationState {
                page_index,
                page_size,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_total_pages() {
        let binding = TableBinding::default();
        let mut store = store(0, 20);
        let widget = PaginationWidget::new(binding.bind(&mut store, total(95)), &[10, 20]);
        assert_eq!(widget.total_pages(), 5);
        assert_eq!(widget.page_label(), "Page 1 of 5");
    }

    #[test]
    fn test_zero_total_renders() {
        let binding = TableBinding::default();
        let mut store = store(0, 20);
        let mut widget = PaginationWidget::new(binding.bind(&mut store, total(0)), &[10, 20]);
        assert_eq!(widget.total_pages(), 0);
        assert!(!widget.can_next_page());
        assert!(!widget.can_previous_page());
        assert_eq!(widget.page_label(), "Page 0 of 0");
        assert!(widget.page_window(5).is_empty());
        assert!(!widget.apply(PageChange::Last).unwrap());
    }

    #[test]
    fn test_navigation_is_clamped() {
        let binding = TableBinding::default();
        let mut store = store(3, 20);
        let mut widget = PaginationWidget::new(binding.bind(&mut store, total(95)), &[10, 20]);

        widget.apply(PageChange::Next).unwrap();
        assert_eq!(widget.page_index(), 4);
        assert!(!widget.can_next_page());
        assert!(!widget.apply(PageChange::Next).unwrap());

        widget.apply(PageChange::Index(40)).unwrap();
        assert_eq!(widget.page_index(), 4);
        widget.apply(PageChange::First).unwrap();
        assert_eq!(widget.page_index(), 0);
        assert!(!widget.apply(PageChange::Previous).unwrap());
    }

    #[test]
    fn test_size_change_goes_to_first_page() {
        let binding = TableBinding::default();
        let mut store = store(3, 20);
        let mut widget = PaginationWidget::new(binding.bind(&mut store, total(95)), &[10, 20]);
        widget.apply(PageChange::Size(10)).unwrap();
        assert_eq!(widget.page_index(), 0);
        assert_eq!(widget.page_size(), 10);
        assert_eq!(widget.total_pages(), 10);
    }

    #[test]
    fn test_page_window() {
        let binding = TableBinding::default();
        let mut store = store(8, 10);
        let widget = PaginationWidget::new(binding.bind(&mut store, total(95)), &[10]);
        assert_eq!(widget.page_window(5), vec![5, 6, 7, 8, 9]);
        assert_eq!(widget.page_window(20).len(), 10);
    }

    #[test]
    fn test_selection_label() {
        let binding = TableBinding::default();
        let mut store = store(0, 10);
        store
            .set_row_selection([("1".to_string(), true)].into_iter().collect::<RowSelectionState>())
            .unwrap();
        let widget = PaginationWidget::new(binding.bind(&mut store, total(3)), &[10]);
        assert_eq!(widget.selection_label(), "1 of 3 row(s) selected.");
    }

    #[test]
    fn test_page_change_serde() {
        let json = serde_json::to_string(&PageChange::Index(3)).unwrap();
        assert_eq!(json, r#"{"type":"index","value":3}"#);
        let parsed: PageChange = serde_json::from_str(r#"{"type":"next"}"#).unwrap();
        assert_eq!(parsed, PageChange::Next);
    }
}
