//! Core module containing the view-state, query and fetch machinery

pub mod adapter;
pub mod cache;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod format;
pub mod navigation;
pub mod query;
pub mod service;
pub mod state;
pub mod store;
pub mod url;

pub use adapter::{QueryAdapter, QueryResult};
pub use cache::{CollectionSnapshot, FetchOutcome, LruCache, QueryCache};
pub use controller::{CollectionController, FetchTicket};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use error::{CollectionError, CollectionResult, ConfigError, FetchError, UrlError};
pub use filter::{FacetedFilterConfig, FilterConfiguration, FilterOption, TextFilterConfig};
pub use format::{CurrencyFormatter, FormatterCache};
pub use navigation::{HistoryMode, InMemoryHistory, Navigator};
pub use query::{
    FieldSelection, PaginationMeta, RemoteQueryRequest, RemoteQueryResponse, SortDirection,
    SortSpec, StaticParams,
};
pub use service::{CollectionFetcher, FetchOptions, FnFetcher};
pub use state::{
    ColumnFilter, ColumnFiltersState, ColumnSort, PaginationState, RowSelectionState,
    SortingState, Updater, ViewState, VisibilityState,
};
pub use store::{StoreMode, ViewStateStore};
pub use url::UrlCodec;
