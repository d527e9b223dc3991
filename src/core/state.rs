//! Interactive view-state slices
//!
//! A list view carries six independent pieces of state. None of them know
//! about the network; the query adapter reads them, the store owns them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Page size used when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Current page and page size
///
/// `page_index * page_size` is the zero-based offset of the first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// Zero-based page index
    pub page_index: usize,

    /// Rows per page (always positive)
    pub page_size: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    /// Zero-based offset of the first row on this page
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Whether the first row of this page has an addressable offset
    pub fn is_addressable(&self) -> bool {
        self.page_index.checked_mul(self.page_size).is_some()
    }

    /// Same page size, first page
    pub fn first_page(self) -> Self {
        Self {
            page_index: 0,
            ..self
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    /// Column identifier
    pub id: String,

    /// Descending when true
    pub desc: bool,
}

impl ColumnSort {
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }
}

/// Ordered sort keys; only the first entry reaches the server
pub type SortingState = Vec<ColumnSort>;

/// Active filter on one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Column identifier
    pub id: String,

    /// Filter value (faceted filters use an array of selected values)
    pub value: Value,
}

impl ColumnFilter {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// One entry per active column filter; absence means no constraint
pub type ColumnFiltersState = Vec<ColumnFilter>;

/// Column id -> shown. Missing columns are visible.
pub type VisibilityState = BTreeMap<String, bool>;

/// Row id -> selected. Missing rows are not selected.
pub type RowSelectionState = BTreeMap<String, bool>;

/// Look up the filter value for a column
pub fn column_filter_value<'a>(filters: &'a ColumnFiltersState, id: &str) -> Option<&'a Value> {
    filters.iter().find(|f| f.id == id).map(|f| &f.value)
}

/// Replace, insert or remove (`None`) the filter for one column
///
/// Order of the remaining entries is preserved; a new entry goes last.
pub fn with_column_filter(
    filters: &ColumnFiltersState,
    id: &str,
    value: Option<Value>,
) -> ColumnFiltersState {
    let mut next: ColumnFiltersState = Vec::with_capacity(filters.len() + 1);
    let mut replaced = false;
    for filter in filters {
        if filter.id == id {
            if let Some(v) = &value {
                next.push(ColumnFilter::new(id, v.clone()));
            }
            replaced = true;
        } else {
            next.push(filter.clone());
        }
    }
    if !replaced {
        if let Some(v) = value {
            next.push(ColumnFilter::new(id, v));
        }
    }
    next
}

/// Drop `true` entries: visible is the default
pub fn normalize_visibility(visibility: VisibilityState) -> VisibilityState {
    visibility.into_iter().filter(|(_, shown)| !shown).collect()
}

/// Drop `false` entries: unselected is the default
pub fn normalize_selection(selection: RowSelectionState) -> RowSelectionState {
    selection.into_iter().filter(|(_, selected)| *selected).collect()
}

/// New value for a slice: either a replacement or a function of the previous value
///
/// Widgets that only know the previous state (a checkbox toggling one entry,
/// a "next page" button) use [`Updater::apply`]; everything else passes a value
/// directly thanks to the `From<T>` impl.
pub enum Updater<T> {
    Value(T),
    Apply(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Updater<T> {
    pub fn apply(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
        Updater::Apply(Box::new(f))
    }

    /// Compute the next value from the previous one
    pub fn resolve(self, previous: &T) -> T {
        match self {
            Updater::Value(v) => v,
            Updater::Apply(f) => f(previous),
        }
    }
}

impl<T> From<T> for Updater<T> {
    fn from(value: T) -> Self {
        Updater::Value(value)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Updater::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Updater::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// All six slices of one list view
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub pagination: PaginationState,
    pub sorting: SortingState,
    pub column_filters: ColumnFiltersState,
    pub column_visibility: VisibilityState,
    pub row_selection: RowSelectionState,
    pub global_filter: String,
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            pagination: PaginationState::new(page_size),
            ..Self::default()
        }
    }

    pub fn column_filter(&self, id: &str) -> Option<&Value> {
        column_filter_value(&self.column_filters, id)
    }

    pub fn is_column_visible(&self, id: &str) -> bool {
        self.column_visibility.get(id).copied().unwrap_or(true)
    }

    pub fn is_row_selected(&self, id: &str) -> bool {
        self.row_selection.get(id).copied().unwrap_or(false)
    }

    /// Canonical form: default-valued map entries removed
    pub fn normalized(mut self) -> Self {
        self.column_visibility = normalize_visibility(self.column_visibility);
        self.row_selection = normalize_selection(self.row_selection);
        self
    }
}
