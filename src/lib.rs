//! # Folio Collections
//!
//! A generic engine for server-driven list views: paginated, filterable,
//! sortable tables whose rows come from a remote fetch contract.
//!
//! ## Features
//!
//! - **View-State Store**: pagination, sorting, column filters, visibility,
//!   selection and free-text search, kept in memory or mirrored to the URL
//! - **Pure Query Adapter**: view-state + filter configuration + static params
//!   in, one `RemoteQueryRequest` out
//! - **Debounced Search**: keystrokes reach the network after a quiet period
//! - **No-Flicker Paging**: the last good page stays visible; only the
//!   response for the latest request is ever committed
//! - **Headless Table and Widgets**: manual-mode table binding, toolbar with
//!   faceted filters, pagination controls
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use folio::prelude::*;
//!
//! let filters = FilterConfiguration::new()
//!     .with_text_filter("search")
//!     .with_faceted_filter(
//!         FacetedFilterConfig::new("status", "status", "Status").option("Active", "active"),
//!     );
//!
//! let mut articles = CollectionController::new(
//!     Arc::new(api.articles()),
//!     CollectionConfig::new(filters),
//!     EngineConfig::default(),
//! )?
//! .with_binding(TableBinding::new(vec![
//!     ColumnDef::field("title", "Title"),
//!     ColumnDef::field("status", "Status"),
//! ]));
//!
//! articles.toolbar()?.toggle_facet("status", "active")?;
//! articles.sync().await?;
//! let page = articles.snapshot()?;
//! ```

pub mod config;
pub mod core;
pub mod storage;
pub mod table;
pub mod widgets;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        adapter::{QueryAdapter, QueryResult},
        cache::{CollectionSnapshot, FetchOutcome, QueryCache},
        controller::{CollectionController, FetchTicket},
        error::{CollectionError, CollectionResult, ConfigError, FetchError, UrlError},
        filter::{FacetedFilterConfig, FilterConfiguration, FilterOption, TextFilterConfig},
        format::{CurrencyFormatter, FormatterCache},
        navigation::{HistoryMode, InMemoryHistory, Navigator},
        query::{
            FieldSelection, PaginationMeta, RemoteQueryRequest, RemoteQueryResponse,
            SortDirection, SortSpec, StaticParams,
        },
        service::{CollectionFetcher, FetchOptions, FnFetcher},
        state::{
            ColumnFilter, ColumnFiltersState, ColumnSort, PaginationState, RowSelectionState,
            SortingState, Updater, ViewState, VisibilityState,
        },
        store::ViewStateStore,
        url::UrlCodec,
    };

    // === Table & Widgets ===
    pub use crate::table::{ColumnDef, Table, TableBinding};
    pub use crate::widgets::{PageChange, PaginationWidget, Toolbar};

    // === Storage ===
    pub use crate::storage::InMemoryCollection;

    // === Config ===
    pub use crate::config::{CollectionConfig, EngineConfig, PageResetPolicy, UrlConfig};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
    pub use std::sync::Arc;
}
