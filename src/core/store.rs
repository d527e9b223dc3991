//! View-state store for one mounted list view
//!
//! Holds the six slices and exposes a getter/setter pair for each. In
//! URL-mirrored mode every effective mutation is written to the navigator,
//! and the initial state is read from it, so reload, back/forward and shared
//! links all reproduce the same view.
//!
//! Setting a slice to the value it already has is a no-op: no page reset,
//! no history entry.

use crate::config::PageResetPolicy;
use crate::core::error::CollectionResult;
use crate::core::navigation::{HistoryMode, Navigator};
use crate::core::state::{
    ColumnFiltersState, PaginationState, RowSelectionState, SortingState, Updater, ViewState,
    VisibilityState, normalize_selection, normalize_visibility,
};
use crate::core::url::UrlCodec;

/// Where the state lives
pub enum StoreMode {
    /// In memory only; lost when the view is dropped
    Local,
    /// Mirrored into the navigable URL
    UrlMirrored {
        navigator: Box<dyn Navigator>,
        codec: UrlCodec,
    },
}

impl std::fmt::Debug for StoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreMode::Local => f.write_str("Local"),
            StoreMode::UrlMirrored { navigator, .. } => f
                .debug_struct("UrlMirrored")
                .field("query", &navigator.query())
                .finish(),
        }
    }
}

#[derive(Debug)]
pub struct ViewStateStore {
    state: ViewState,
    mode: StoreMode,
    reset_policy: PageResetPolicy,
    version: u64,
}

impl ViewStateStore {
    /// In-memory store
    pub fn local(initial: ViewState) -> Self {
        Self {
            state: initial.normalized(),
            mode: StoreMode::Local,
            reset_policy: PageResetPolicy::default(),
            version: 0,
        }
    }

    /// Store initialised from, and mirrored to, the navigator's query string
    pub fn url_mirrored(navigator: impl Navigator + 'static, codec: UrlCodec) -> Self {
        let state = codec.from_query(&navigator.query()).normalized();
        Self {
            state,
            mode: StoreMode::UrlMirrored {
                navigator: Box::new(navigator),
                codec,
            },
            reset_policy: PageResetPolicy::default(),
            version: 0,
        }
    }

    pub fn with_reset_policy(mut self, reset_policy: PageResetPolicy) -> Self {
        self.reset_policy = reset_policy;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_url_mirrored(&self) -> bool {
        matches!(self.mode, StoreMode::UrlMirrored { .. })
    }

    /// Incremented on every effective change
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Current query string, when mirrored
    pub fn location_query(&self) -> Option<String> {
        match &self.mode {
            StoreMode::Local => None,
            StoreMode::UrlMirrored { navigator, .. } => Some(navigator.query()),
        }
    }

    // === Getters ===

    pub fn pagination(&self) -> PaginationState {
        self.state.pagination
    }

    pub fn sorting(&self) -> &SortingState {
        &self.state.sorting
    }

    pub fn column_filters(&self) -> &ColumnFiltersState {
        &self.state.column_filters
    }

    pub fn column_visibility(&self) -> &VisibilityState {
        &self.state.column_visibility
    }

    pub fn row_selection(&self) -> &RowSelectionState {
        &self.state.row_selection
    }

    pub fn global_filter(&self) -> &str {
        &self.state.global_filter
    }

    // === Setters ===
    //
    // Each returns whether the slice actually changed.

    pub fn set_pagination(
        &mut self,
        updater: impl Into<Updater<PaginationState>>,
    ) -> CollectionResult<bool> {
        let mut value = updater.into().resolve(&self.state.pagination);
        value.page_size = value.page_size.max(1);
        if value == self.state.pagination {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.pagination = value;
        self.commit(next, HistoryMode::Push)
    }

    pub fn set_sorting(&mut self, updater: impl Into<Updater<SortingState>>) -> CollectionResult<bool> {
        let value = updater.into().resolve(&self.state.sorting);
        if value == self.state.sorting {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.sorting = value;
        self.reset_page(&mut next);
        self.commit(next, HistoryMode::Push)
    }

    pub fn set_column_filters(
        &mut self,
        updater: impl Into<Updater<ColumnFiltersState>>,
    ) -> CollectionResult<bool> {
        let value = updater.into().resolve(&self.state.column_filters);
        if value == self.state.column_filters {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.column_filters = value;
        self.reset_page(&mut next);
        self.commit(next, HistoryMode::Push)
    }

    pub fn set_column_visibility(
        &mut self,
        updater: impl Into<Updater<VisibilityState>>,
    ) -> CollectionResult<bool> {
        let value = normalize_visibility(updater.into().resolve(&self.state.column_visibility));
        if value == self.state.column_visibility {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.column_visibility = value;
        self.commit(next, HistoryMode::Replace)
    }

    pub fn set_row_selection(
        &mut self,
        updater: impl Into<Updater<RowSelectionState>>,
    ) -> CollectionResult<bool> {
        let value = normalize_selection(updater.into().resolve(&self.state.row_selection));
        if value == self.state.row_selection {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.row_selection = value;
        self.commit(next, HistoryMode::Replace)
    }

    /// Raw (undebounced) free-text filter
    ///
    /// Keystrokes replace the current history entry instead of pushing one each.
    /// The page is left alone here; the search only changes the result set once
    /// it settles, see [`settle_global_filter`](Self::settle_global_filter).
    pub fn set_global_filter(&mut self, updater: impl Into<Updater<String>>) -> CollectionResult<bool> {
        let value = updater.into().resolve(&self.state.global_filter);
        if value == self.state.global_filter {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.global_filter = value;
        self.commit(next, HistoryMode::Replace)
    }

    /// Apply the page reset policy for a search that just settled
    pub fn settle_global_filter(&mut self) -> CollectionResult<bool> {
        let mut next = self.state.clone();
        self.reset_page(&mut next);
        if next == self.state {
            return Ok(false);
        }
        self.commit(next, HistoryMode::Replace)
    }

    /// Replace the whole state at once (restoring a saved view)
    pub fn replace_state(&mut self, state: ViewState) -> CollectionResult<bool> {
        let state = state.normalized();
        if state == self.state {
            return Ok(false);
        }
        self.commit(state, HistoryMode::Push)
    }

    /// Re-read the navigator after back/forward navigation
    ///
    /// Slices the URL does not persist keep their in-memory value. Returns
    /// whether anything changed.
    pub fn sync_from_navigator(&mut self) -> bool {
        let StoreMode::UrlMirrored { navigator, codec } = &self.mode else {
            return false;
        };
        let mut decoded = codec.from_query(&navigator.query()).normalized();
        if !codec.config().persist_visibility {
            decoded.column_visibility = self.state.column_visibility.clone();
        }
        if !codec.config().persist_selection {
            decoded.row_selection = self.state.row_selection.clone();
        }
        if decoded == self.state {
            return false;
        }
        self.state = decoded;
        self.version += 1;
        true
    }

    fn reset_page(&self, next: &mut ViewState) {
        if self.reset_policy == PageResetPolicy::ResetToFirstPage {
            next.pagination.page_index = 0;
        }
    }

    fn commit(&mut self, next: ViewState, mode: HistoryMode) -> CollectionResult<bool> {
        if let StoreMode::UrlMirrored { navigator, codec } = &mut self.mode {
            let query = codec.merge_into(&navigator.query(), &next);
            navigator.navigate(&query, mode)?;
            tracing::trace!(query = %query, ?mode, "view state mirrored to location");
        }
        self.state = next;
        self.version += 1;
        Ok(true)
    }
}

impl Default for ViewStateStore {
    fn default() -> Self {
        Self::local(ViewState::default())
    }
}
