//! Table binding: fetched rows + column definitions + view-state

use crate::core::adapter::QueryResult;
use crate::core::error::CollectionResult;
use crate::core::filter::FilterConfiguration;
use crate::core::state::{ColumnSort, ViewState, with_column_filter};
use crate::core::store::ViewStateStore;
use crate::table::column::ColumnDef;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Derives a stable row id from a row and its position on the page
pub type RowIdFn<T> = Arc<dyn Fn(&T, usize) -> String + Send + Sync>;

/// Column definitions and row identity for one list view
pub struct TableBinding<T> {
    columns: Vec<ColumnDef<T>>,
    row_id: RowIdFn<T>,
}

impl<T> TableBinding<T> {
    /// Rows are identified by their position on the page until
    /// [`with_row_id`](Self::with_row_id) says otherwise
    pub fn new(columns: Vec<ColumnDef<T>>) -> Self {
        Self {
            columns,
            row_id: Arc::new(|_, index| index.to_string()),
        }
    }

    pub fn with_row_id(mut self, row_id: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.row_id = Arc::new(move |row, _| row_id(row));
        self
    }

    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDef<T>> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn row_id(&self, row: &T, index: usize) -> String {
        (self.row_id)(row, index)
    }

    /// Faceted filters whose column is not part of this table
    ///
    /// They are not an error: their filter simply never receives a value.
    pub fn inert_filters<'c>(&self, filters: &'c FilterConfiguration) -> Vec<&'c str> {
        let inert: Vec<&str> = filters
            .faceted_filters
            .iter()
            .filter(|f| self.column(&f.column_id).is_none())
            .map(|f| f.column_id.as_str())
            .collect();
        for column_id in &inert {
            tracing::debug!(column = %column_id, "faceted filter has no matching column, inert");
        }
        inert
    }

    /// Bind to the current rows and the store that owns the view-state
    pub fn bind<'a>(&'a self, store: &'a mut ViewStateStore, rows: Arc<QueryResult<T>>) -> Table<'a, T> {
        Table {
            binding: self,
            store,
            rows,
        }
    }
}

impl<T> Default for TableBinding<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Clone for TableBinding<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            row_id: Arc::clone(&self.row_id),
        }
    }
}

impl<T> fmt::Debug for TableBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableBinding")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

/// String form of a cell value used for facet counting and option matching
pub fn facet_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Interactive table over one fetched page
///
/// Reads come from the rows and the store; every mutation goes through the
/// store so the page-reset policy and URL mirroring apply.
pub struct Table<'a, T> {
    binding: &'a TableBinding<T>,
    store: &'a mut ViewStateStore,
    rows: Arc<QueryResult<T>>,
}

impl<'a, T> Table<'a, T> {
    pub fn state(&self) -> &ViewState {
        self.store.state()
    }

    pub fn store_mut(&mut self) -> &mut ViewStateStore {
        &mut *self.store
    }

    pub fn binding(&self) -> &TableBinding<T> {
        self.binding
    }

    /// Rows in the order the server returned them
    pub fn rows(&self) -> &[T] {
        &self.rows.items
    }

    /// Rows on this page, not the server total
    pub fn row_count(&self) -> usize {
        self.rows.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.items.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.rows.total_count
    }

    pub fn manual_filtering(&self) -> bool {
        true
    }

    pub fn manual_sorting(&self) -> bool {
        true
    }

    pub fn manual_pagination(&self) -> bool {
        true
    }

    pub fn enable_row_selection(&self) -> bool {
        true
    }

    // === Columns ===

    pub fn get_column(&self, id: &str) -> Option<&ColumnDef<T>> {
        self.binding.column(id)
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDef<T>> {
        let state = self.store.state();
        self.binding
            .columns()
            .iter()
            .filter(|c| state.is_column_visible(&c.id))
            .collect()
    }

    /// Columns the user may show or hide
    pub fn hideable_columns(&self) -> Vec<&ColumnDef<T>> {
        self.binding
            .columns()
            .iter()
            .filter(|c| c.enable_hiding && c.has_accessor())
            .collect()
    }

    pub fn cell(&self, row_index: usize, column_id: &str) -> Option<Value> {
        let row = self.rows.items.get(row_index)?;
        Some(self.get_column(column_id)?.value(row))
    }

    /// Distinct values of a column across the loaded rows, with counts
    ///
    /// Array cells contribute each element. Informational only: the rows
    /// are one page, not the whole collection.
    pub fn faceted_unique_values(&self, column_id: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        let Some(column) = self.get_column(column_id) else {
            return counts;
        };
        for row in &self.rows.items {
            match column.value(row) {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items.iter().filter(|v| !v.is_null()) {
                        *counts.entry(facet_key(item)).or_insert(0) += 1;
                    }
                }
                other => *counts.entry(facet_key(&other)).or_insert(0) += 1,
            }
        }
        counts
    }

    pub fn column_filter_value(&self, column_id: &str) -> Option<&Value> {
        self.store.state().column_filter(column_id)
    }

    /// Set (`Some`) or clear (`None`) a column filter
    ///
    /// Unknown columns are ignored.
    pub fn set_column_filter(&mut self, column_id: &str, value: Option<Value>) -> CollectionResult<bool> {
        if self.get_column(column_id).is_none() {
            tracing::debug!(column = %column_id, "ignoring filter on unknown column");
            return Ok(false);
        }
        let next = with_column_filter(self.store.column_filters(), column_id, value);
        self.store.set_column_filters(next)
    }

    /// Clear every column filter; sorting and pagination are kept
    pub fn reset_column_filters(&mut self) -> CollectionResult<bool> {
        self.store.set_column_filters(Vec::new())
    }

    // === Sorting ===

    /// Current direction for a column: `Some(true)` descending
    pub fn sort_direction(&self, column_id: &str) -> Option<bool> {
        self.store
            .sorting()
            .first()
            .filter(|s| s.id == column_id)
            .map(|s| s.desc)
    }

    /// Cycle unsorted -> ascending -> descending -> unsorted
    ///
    /// Sorting is single-column: sorting a new column replaces the old key.
    pub fn toggle_sorting(&mut self, column_id: &str) -> CollectionResult<bool> {
        match self.get_column(column_id) {
            Some(column) if column.enable_sorting => {}
            _ => return Ok(false),
        }
        let next = match self.sort_direction(column_id) {
            None => vec![ColumnSort::asc(column_id)],
            Some(false) => vec![ColumnSort::desc(column_id)],
            Some(true) => Vec::new(),
        };
        self.store.set_sorting(next)
    }

    // === Visibility ===

    pub fn toggle_column_visibility(&mut self, column_id: &str) -> CollectionResult<bool> {
        match self.get_column(column_id) {
            Some(column) if column.enable_hiding => {}
            _ => return Ok(false),
        }
        let shown = self.store.state().is_column_visible(column_id);
        let mut next = self.store.column_visibility().clone();
        next.insert(column_id.to_string(), !shown);
        self.store.set_column_visibility(next)
    }

    // === Selection ===

    pub fn row_ids(&self) -> Vec<String> {
        self.rows
            .items
            .iter()
            .enumerate()
            .map(|(i, row)| self.binding.row_id(row, i))
            .collect()
    }

    pub fn set_row_selected(&mut self, row_id: &str, selected: bool) -> CollectionResult<bool> {
        let mut next = self.store.row_selection().clone();
        next.insert(row_id.to_string(), selected);
        self.store.set_row_selection(next)
    }

    pub fn toggle_row_selected(&mut self, row_id: &str) -> CollectionResult<bool> {
        let selected = self.store.state().is_row_selected(row_id);
        self.set_row_selected(row_id, !selected)
    }

    /// Select or deselect every row on the current page
    pub fn toggle_all_page_rows_selected(&mut self, selected: bool) -> CollectionResult<bool> {
        let mut next = self.store.row_selection().clone();
        for id in self.row_ids() {
            next.insert(id, selected);
        }
        self.store.set_row_selection(next)
    }

    pub fn is_all_page_rows_selected(&self) -> bool {
        let state = self.store.state();
        let ids = self.row_ids();
        !ids.is_empty() && ids.iter().all(|id| state.is_row_selected(id))
    }

    pub fn is_some_page_rows_selected(&self) -> bool {
        let state = self.store.state();
        self.row_ids().iter().any(|id| state.is_row_selected(id))
    }

    /// Selected rows among the loaded ones
    pub fn selected_rows(&self) -> Vec<&T> {
        let state = self.store.state();
        self.rows
            .items
            .iter()
            .enumerate()
            .filter(|(i, row)| state.is_row_selected(&self.binding.row_id(row, *i)))
            .map(|(_, row)| row)
            .collect()
    }
}

impl<T> fmt::Debug for Table<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("row_count", &self.row_count())
            .field("total_count", &self.total_count())
            .field("state", self.store.state())
            .finish()
    }
}
