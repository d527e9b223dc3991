//! Collection controller: store -> debounce -> adapter -> cache
//!
//! One controller drives one mounted list view. It owns the view-state, turns
//! it into requests and commits responses through the request-identity
//! cache. The fetch itself runs in a [`FetchTicket`], which owns everything
//! it needs, so several fetches may be in flight while the view keeps
//! changing.

use crate::config::{CollectionConfig, EngineConfig};
use crate::core::adapter::{QueryAdapter, QueryResult, execute};
use crate::core::cache::{CollectionSnapshot, FetchOutcome, QueryCache};
use crate::core::debounce::Debouncer;
use crate::core::error::CollectionResult;
use crate::core::navigation::Navigator;
use crate::core::query::{PaginationMeta, RemoteQueryRequest};
use crate::core::service::CollectionFetcher;
use crate::core::state::{
    ColumnFiltersState, PaginationState, RowSelectionState, SortingState, Updater, ViewState,
    VisibilityState,
};
use crate::core::store::ViewStateStore;
use crate::core::url::UrlCodec;
use crate::table::{Table, TableBinding};
use crate::widgets::{PaginationWidget, Toolbar};
use std::sync::Arc;
use tokio::time::Instant;

/// One prepared request, ready to run
///
/// The request identity is registered as the latest one when the ticket is
/// prepared, not when it runs, so the order of `prepare` calls decides which
/// response gets committed.
pub struct FetchTicket<T, F: ?Sized> {
    request: RemoteQueryRequest,
    identity: String,
    dispatch: bool,
    cache: QueryCache<T>,
    fetcher: Arc<F>,
}

impl<T, F> FetchTicket<T, F>
where
    T: Send + Sync + 'static,
    F: CollectionFetcher<T> + ?Sized,
{
    pub fn request(&self) -> &RemoteQueryRequest {
        &self.request
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// False when an identical request is already in flight
    pub fn will_dispatch(&self) -> bool {
        self.dispatch
    }

    /// Call the fetch contract and hand the answer to the cache
    pub async fn run(self) -> CollectionResult<FetchOutcome> {
        if !self.dispatch {
            return Ok(FetchOutcome::Deduplicated);
        }
        let result = execute::<T, F>(&*self.fetcher, &self.request).await;
        self.cache.complete(&self.identity, result)
    }
}

impl<T, F: ?Sized> std::fmt::Debug for FetchTicket<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchTicket")
            .field("identity", &self.identity)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}

pub struct CollectionController<T, F: ?Sized> {
    store: ViewStateStore,
    adapter: QueryAdapter,
    binding: TableBinding<T>,
    debouncer: Debouncer<String>,
    cache: QueryCache<T>,
    fetcher: Arc<F>,
    engine: EngineConfig,
    last_dispatched: Option<String>,
}

impl<T, F> CollectionController<T, F>
where
    T: Send + Sync + 'static,
    F: CollectionFetcher<T> + ?Sized,
{
    /// Controller with in-memory view-state
    pub fn new(
        fetcher: Arc<F>,
        collection: CollectionConfig,
        engine: EngineConfig,
    ) -> CollectionResult<Self> {
        collection.validate(&engine)?;
        let initial = ViewState::with_page_size(collection.page_size_or(&engine));
        let store = ViewStateStore::local(initial).with_reset_policy(engine.page_reset);
        Ok(Self::assemble(fetcher, collection, engine, store))
    }

    /// Controller whose view-state is mirrored into `navigator`
    ///
    /// The initial state comes from the navigator's current query; a search
    /// term found there is applied without waiting for the debounce.
    pub fn with_navigator(
        fetcher: Arc<F>,
        collection: CollectionConfig,
        engine: EngineConfig,
        navigator: impl Navigator + 'static,
    ) -> CollectionResult<Self> {
        collection.validate(&engine)?;
        let codec = UrlCodec::new(
            engine.url.clone(),
            collection.filters.clone(),
            collection.page_size_or(&engine),
        );
        let store = ViewStateStore::url_mirrored(navigator, codec).with_reset_policy(engine.page_reset);
        Ok(Self::assemble(fetcher, collection, engine, store))
    }

    fn assemble(
        fetcher: Arc<F>,
        collection: CollectionConfig,
        engine: EngineConfig,
        store: ViewStateStore,
    ) -> Self {
        let CollectionConfig {
            filters,
            static_params,
            fields,
            ..
        } = collection;
        let mut adapter = QueryAdapter::new(filters).with_static_params(static_params);
        if let Some(fields) = fields {
            adapter = adapter.with_fields(fields);
        }
        let debouncer = Debouncer::new(store.global_filter().to_string(), engine.debounce());
        Self {
            store,
            adapter,
            binding: TableBinding::default(),
            debouncer,
            cache: QueryCache::new(engine.cache_capacity),
            fetcher,
            engine,
            last_dispatched: None,
        }
    }

    /// Column definitions used by [`table`](Self::table) and the widgets
    ///
    /// Faceted filters whose column is not among them stop reaching requests,
    /// whichever path (widget, setter or URL) set their value.
    pub fn with_binding(mut self, binding: TableBinding<T>) -> Self {
        let inert: Vec<String> = binding
            .inert_filters(self.adapter.filter_config())
            .into_iter()
            .map(str::to_string)
            .collect();
        self.adapter = std::mem::take(&mut self.adapter).with_inert_columns(inert);
        self.binding = binding;
        self
    }

    pub fn store(&self) -> &ViewStateStore {
        &self.store
    }

    pub fn state(&self) -> &ViewState {
        self.store.state()
    }

    pub fn adapter(&self) -> &QueryAdapter {
        &self.adapter
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn cache(&self) -> &QueryCache<T> {
        &self.cache
    }

    // === View-state setters ===

    pub fn set_pagination(
        &mut self,
        updater: impl Into<Updater<PaginationState>>,
    ) -> CollectionResult<bool> {
        self.store.set_pagination(updater)
    }

    pub fn set_sorting(&mut self, updater: impl Into<Updater<SortingState>>) -> CollectionResult<bool> {
        self.store.set_sorting(updater)
    }

    pub fn set_column_filters(
        &mut self,
        updater: impl Into<Updater<ColumnFiltersState>>,
    ) -> CollectionResult<bool> {
        self.store.set_column_filters(updater)
    }

    pub fn set_column_visibility(
        &mut self,
        updater: impl Into<Updater<VisibilityState>>,
    ) -> CollectionResult<bool> {
        self.store.set_column_visibility(updater)
    }

    pub fn set_row_selection(
        &mut self,
        updater: impl Into<Updater<RowSelectionState>>,
    ) -> CollectionResult<bool> {
        self.store.set_row_selection(updater)
    }

    /// Raw search text; reaches requests after the quiet period
    pub fn set_global_filter(&mut self, updater: impl Into<Updater<String>>) -> CollectionResult<bool> {
        let changed = self.store.set_global_filter(updater)?;
        self.debouncer
            .observe(&self.store.state().global_filter, Instant::now());
        Ok(changed)
    }

    /// Re-read the location after back/forward navigation
    ///
    /// A search term restored from history is applied immediately.
    pub fn sync_from_navigator(&mut self) -> bool {
        let changed = self.store.sync_from_navigator();
        if changed {
            self.debouncer
                .observe(&self.store.state().global_filter, Instant::now());
            self.debouncer.flush();
        }
        changed
    }

    // === Debounce ===

    /// Search text the network sees
    pub fn debounced_global_filter(&self) -> &str {
        self.debouncer.settled()
    }

    pub fn is_debouncing(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Advance the debounce clock; true when the settled search changed
    ///
    /// A newly settled search moves the view back to the first page, in the
    /// same step, so no request ever mixes the new page with the old search.
    pub fn tick(&mut self, now: Instant) -> CollectionResult<bool> {
        match self.debouncer.poll(now) {
            Some(value) => {
                tracing::debug!(search = %value, "search text settled");
                self.store.settle_global_filter()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Sleep until a pending search settles
    pub async fn wait_for_debounce(&mut self) -> CollectionResult<bool> {
        match self.debouncer.deadline() {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.tick(Instant::now())
            }
            None => Ok(false),
        }
    }

    // === Fetching ===

    /// Request for the current view
    pub fn request(&self) -> RemoteQueryRequest {
        self.adapter
            .request_for(self.store.state(), self.debouncer.settled())
    }

    /// Register the current request as the latest and return it as a ticket
    pub fn prepare(&mut self) -> CollectionResult<FetchTicket<T, F>> {
        let request = self.request();
        let identity = request.fingerprint();
        let dispatch = self.cache.begin(&identity)?;
        self.last_dispatched = Some(identity.clone());
        Ok(FetchTicket {
            request,
            identity,
            dispatch,
            cache: self.cache.clone(),
            fetcher: Arc::clone(&self.fetcher),
        })
    }

    /// Fetch the current view, even if it was fetched before
    pub async fn refresh(&mut self) -> CollectionResult<FetchOutcome> {
        self.prepare()?.run().await
    }

    /// Fetch only when the request changed since the last dispatch
    ///
    /// Settles the debounce first if its quiet period is over. Returns `None`
    /// when nothing needed fetching.
    pub async fn sync(&mut self) -> CollectionResult<Option<FetchOutcome>> {
        self.tick(Instant::now())?;
        let identity = self.request().fingerprint();
        if self.last_dispatched.as_deref() == Some(identity.as_str()) {
            return Ok(None);
        }
        self.refresh().await.map(Some)
    }

    // === Results ===

    pub fn snapshot(&self) -> CollectionResult<CollectionSnapshot<T>> {
        self.cache.snapshot()
    }

    fn committed(&self) -> CollectionResult<Arc<QueryResult<T>>> {
        Ok(self.cache.snapshot()?.result)
    }

    pub fn items(&self) -> CollectionResult<Vec<T>>
    where
        T: Clone,
    {
        Ok(self.committed()?.items.clone())
    }

    pub fn total_count(&self) -> CollectionResult<u64> {
        Ok(self.committed()?.total_count)
    }

    pub fn pagination_meta(&self) -> CollectionResult<PaginationMeta> {
        let pagination = self.store.pagination();
        Ok(PaginationMeta::new(
            pagination.page_index,
            pagination.page_size,
            self.total_count()?,
        ))
    }

    // === Bound views ===

    pub fn table(&mut self) -> CollectionResult<Table<'_, T>> {
        let rows = self.committed()?;
        Ok(self.binding.bind(&mut self.store, rows))
    }

    pub fn toolbar(&mut self) -> CollectionResult<Toolbar<'_, T>> {
        let rows = self.committed()?;
        let table = self.binding.bind(&mut self.store, rows);
        Ok(Toolbar::new(table, self.adapter.filter_config()).with_debouncer(&mut self.debouncer))
    }

    pub fn pagination(&mut self) -> CollectionResult<PaginationWidget<'_, T>> {
        let rows = self.committed()?;
        let table = self.binding.bind(&mut self.store, rows);
        Ok(PaginationWidget::new(table, &self.engine.page_size_options))
    }
}

impl<T, F: ?Sized> std::fmt::Debug for CollectionController<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionController")
            .field("state", self.store.state())
            .field("debounced_global_filter", self.debouncer.settled())
            .field("last_dispatched", &self.last_dispatched)
            .finish_non_exhaustive()
    }
}
