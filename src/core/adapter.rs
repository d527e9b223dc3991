//! Translation from view-state to a remote query
//!
//! Everything in here is synchronous and pure except [`QueryAdapter::fetch`],
//! which is the only suspension point of the engine.

use crate::core::error::FetchError;
use crate::core::filter::FilterConfiguration;
use crate::core::query::{
    FieldSelection, RemoteQueryRequest, RemoteQueryResponse, SortDirection, SortSpec, StaticParams,
};
use crate::core::service::{CollectionFetcher, FetchOptions};
use crate::core::state::{
    ColumnFiltersState, PaginationState, SortingState, ViewState, column_filter_value,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Items and total count of one fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> QueryResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

impl<T> Default for QueryResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<RemoteQueryResponse<T>> for QueryResult<T> {
    fn from(response: RemoteQueryResponse<T>) -> Self {
        let total_count = response.count();
        Self {
            items: response.into_items(),
            total_count,
        }
    }
}

/// Builds requests for one list view
///
/// Holds only configuration; the same inputs always produce the same request.
#[derive(Debug, Clone, Default)]
pub struct QueryAdapter {
    filters: FilterConfiguration,
    static_params: StaticParams,
    fields: Option<FieldSelection>,
    inert_columns: BTreeSet<String>,
}

impl QueryAdapter {
    pub fn new(filters: FilterConfiguration) -> Self {
        Self {
            filters,
            static_params: StaticParams::default(),
            fields: None,
            inert_columns: BTreeSet::new(),
        }
    }

    pub fn with_static_params(mut self, static_params: StaticParams) -> Self {
        self.static_params = static_params;
        self
    }

    pub fn with_fields(mut self, fields: FieldSelection) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Faceted filters on these columns contribute nothing to requests
    pub fn with_inert_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inert_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter_config(&self) -> &FilterConfiguration {
        &self.filters
    }

    pub fn static_params(&self) -> &StaticParams {
        &self.static_params
    }

    /// Filters derived from view-state alone
    ///
    /// An empty search string is treated as no search; a faceted filter whose
    /// column has no active filter, or no column at all, contributes nothing.
    pub fn dynamic_filters(
        &self,
        debounced_global_filter: &str,
        column_filters: &ColumnFiltersState,
    ) -> BTreeMap<String, Value> {
        let mut filters = BTreeMap::new();

        if let Some(param) = self.filters.text_param() {
            if !debounced_global_filter.is_empty() {
                filters.insert(
                    param.to_string(),
                    Value::String(debounced_global_filter.to_string()),
                );
            }
        }

        for faceted in &self.filters.faceted_filters {
            if self.inert_columns.contains(&faceted.column_id) {
                continue;
            }
            if let Some(value) = column_filter_value(column_filters, &faceted.column_id) {
                filters.insert(faceted.query_param_name.clone(), value.clone());
            }
        }

        filters
    }

    /// Assemble the request for the current view
    ///
    /// Dynamic filters override static ones on the same key, never the reverse.
    /// Only the first sort entry is used.
    pub fn build_request(
        &self,
        pagination: &PaginationState,
        debounced_global_filter: &str,
        column_filters: &ColumnFiltersState,
        sorting: &SortingState,
    ) -> RemoteQueryRequest {
        let mut filters = self.static_params.filters.clone();
        filters.extend(self.dynamic_filters(debounced_global_filter, column_filters));

        let sort = sorting
            .first()
            .map(|s| SortSpec::new(s.id.clone(), SortDirection::from_desc(s.desc)));

        let limit = pagination.page_size.max(1);
        RemoteQueryRequest {
            offset: pagination.page_index.saturating_mul(limit),
            limit,
            filters,
            fields: self.fields.clone(),
            sort,
            extra: self.static_params.extra.clone(),
        }
    }

    /// [`build_request`](Self::build_request) over a whole view-state
    pub fn request_for(&self, state: &ViewState, debounced_global_filter: &str) -> RemoteQueryRequest {
        self.build_request(
            &state.pagination,
            debounced_global_filter,
            &state.column_filters,
            &state.sorting,
        )
    }

    /// Call the fetch contract and normalise its answer
    ///
    /// Failures are wrapped, never retried.
    pub async fn fetch<T, F>(
        &self,
        fetcher: &F,
        request: &RemoteQueryRequest,
    ) -> Result<QueryResult<T>, FetchError>
    where
        F: CollectionFetcher<T> + ?Sized,
    {
        execute(fetcher, request).await
    }
}

/// Run one request against a fetcher with the stale-while-revalidate hint
pub(crate) async fn execute<T, F>(
    fetcher: &F,
    request: &RemoteQueryRequest,
) -> Result<QueryResult<T>, FetchError>
where
    F: CollectionFetcher<T> + ?Sized,
{
    tracing::debug!(
        offset = request.offset,
        limit = request.limit,
        filters = request.filters.len(),
        "dispatching collection request"
    );
    CollectionFetcher::<T>::fetch(fetcher, request, FetchOptions::default())
        .await
        .map(QueryResult::from)
        .map_err(|e| FetchError::new(request.fingerprint(), e))
}
