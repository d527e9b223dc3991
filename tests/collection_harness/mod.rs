//! Shared test harness for collection engine testing
//!
//! Provides the `Article` fixture row, filter/column configuration matching
//! a typical admin list page, and fetchers with controllable behaviour:
//! `DeferredFetcher` (responses resolved by the test, in any order),
//! `RecordingFetcher` (counts and records every request) and
//! `FlakyFetcher` (fails on demand).
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod collection_harness;
//! use collection_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
mod fetcher_contract_tests;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use uuid::Uuid;

use folio::config::{CollectionConfig, EngineConfig};
use folio::core::controller::CollectionController;
use folio::core::filter::{FacetedFilterConfig, FilterConfiguration};
use folio::core::query::{RemoteQueryRequest, RemoteQueryResponse};
use folio::core::service::{CollectionFetcher, FetchOptions};
use folio::storage::InMemoryCollection;
use folio::table::{ColumnDef, TableBinding};

// ---------------------------------------------------------------------------
// Article: the row type of the fixture list page
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub published_at: DateTime<Utc>,
    pub views: i64,
}

pub const STATUSES: [&str; 3] = ["active", "draft", "archived"];

/// `n` articles with predictable titles, statuses and dates
///
/// Article `i` is titled "Article {i:02}", has status `STATUSES[i % 3]` and
/// is published `i` days after 2024-01-01.
pub fn articles(n: usize) -> Vec<Article> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single().unwrap();
    (0..n)
        .map(|i| Article {
            id: Uuid::new_v4(),
            title: format!("Article {:02}", i),
            status: STATUSES[i % STATUSES.len()].to_string(),
            published_at: base + Duration::days(i as i64),
            views: ((i * 37) % 100) as i64,
        })
        .collect()
}

pub fn article(title: &str, status: &str) -> Article {
    Article {
        id: Uuid::new_v4(),
        title: title.to_string(),
        status: status.to_string(),
        published_at: Utc::now(),
        views: 0,
    }
}

// ---------------------------------------------------------------------------
// Configuration fixtures
// ---------------------------------------------------------------------------

pub fn article_filters() -> FilterConfiguration {
    FilterConfiguration::new()
        .with_text_filter("search")
        .with_faceted_filter(
            FacetedFilterConfig::new("status", "status", "Status")
                .option("Active", "active")
                .option("Draft", "draft")
                .option("Archived", "archived"),
        )
}

pub fn article_config(page_size: usize) -> CollectionConfig {
    CollectionConfig::new(article_filters()).with_page_size(page_size)
}

pub fn article_binding() -> TableBinding<Article> {
    TableBinding::new(vec![
        ColumnDef::display("select", ""),
        ColumnDef::field("title", "Title"),
        ColumnDef::field("status", "Status"),
        ColumnDef::field("publishedAt", "Published"),
        ColumnDef::field("views", "Views"),
    ])
    .with_row_id(|a: &Article| a.id.to_string())
}

/// In-memory article source searching titles
pub fn article_source(rows: Vec<Article>) -> InMemoryCollection<Article> {
    InMemoryCollection::new(rows).with_search("search", ["title"])
}

pub fn controller<F>(fetcher: Arc<F>, page_size: usize) -> CollectionController<Article, F>
where
    F: CollectionFetcher<Article>,
{
    CollectionController::new(fetcher, article_config(page_size), EngineConfig::default())
        .unwrap()
        .with_binding(article_binding())
}

/// Install a subscriber honoring `RUST_LOG`; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// DeferredFetcher: every request waits until the test resolves it
// ---------------------------------------------------------------------------

type Pending<T> = (RemoteQueryRequest, oneshot::Sender<Result<RemoteQueryResponse<T>>>);

pub struct DeferredFetcher<T> {
    pending: Mutex<Vec<Pending<T>>>,
}

impl<T> DeferredFetcher<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Resolve the pending request at `offset`; false if there is none
    pub fn resolve_offset(&self, offset: usize, response: Result<RemoteQueryResponse<T>>) -> bool {
        let mut pending = self.pending.lock().unwrap();
        match pending.iter().position(|(r, _)| r.offset == offset) {
            Some(pos) => {
                let (_, tx) = pending.remove(pos);
                tx.send(response).is_ok()
            }
            None => false,
        }
    }

    /// Wait until `n` requests are parked
    pub async fn wait_for_pending(&self, n: usize) {
        while self.pending() < n {
            tokio::task::yield_now().await;
        }
    }
}

impl<T> Default for DeferredFetcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send + 'static> CollectionFetcher<T> for DeferredFetcher<T> {
    async fn fetch(
        &self,
        request: &RemoteQueryRequest,
        _options: FetchOptions,
    ) -> Result<RemoteQueryResponse<T>> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push((request.clone(), tx));
        rx.await.map_err(|_| anyhow!("deferred request dropped"))?
    }
}

// ---------------------------------------------------------------------------
// RecordingFetcher: delegates and keeps every request
// ---------------------------------------------------------------------------

pub struct RecordingFetcher<F> {
    inner: F,
    requests: Mutex<Vec<(RemoteQueryRequest, FetchOptions)>>,
}

impl<F> RecordingFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RemoteQueryRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(r, _)| r.clone())
            .collect()
    }

    pub fn options(&self) -> Vec<FetchOptions> {
        self.requests.lock().unwrap().iter().map(|(_, o)| *o).collect()
    }

    pub fn last(&self) -> Option<RemoteQueryRequest> {
        self.requests.lock().unwrap().last().map(|(r, _)| r.clone())
    }
}

#[async_trait]
impl<T, F> CollectionFetcher<T> for RecordingFetcher<F>
where
    T: Send + 'static,
    F: CollectionFetcher<T>,
{
    async fn fetch(
        &self,
        request: &RemoteQueryRequest,
        options: FetchOptions,
    ) -> Result<RemoteQueryResponse<T>> {
        self.requests.lock().unwrap().push((request.clone(), options));
        CollectionFetcher::<T>::fetch(&self.inner, request, options).await
    }
}

// ---------------------------------------------------------------------------
// FlakyFetcher: fails while the switch is on
// ---------------------------------------------------------------------------

pub struct FlakyFetcher<F> {
    inner: F,
    failing: AtomicBool,
}

impl<F> FlakyFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl<T, F> CollectionFetcher<T> for FlakyFetcher<F>
where
    T: Send + 'static,
    F: CollectionFetcher<T>,
{
    async fn fetch(
        &self,
        request: &RemoteQueryRequest,
        options: FetchOptions,
    ) -> Result<RemoteQueryResponse<T>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("503 Service Unavailable"));
        }
        CollectionFetcher::<T>::fetch(&self.inner, request, options).await
    }
}

// ---------------------------------------------------------------------------
// Assertion helpers
// ---------------------------------------------------------------------------

pub fn titles(items: &[Article]) -> Vec<String> {
    items.iter().map(|a| a.title.clone()).collect()
}

pub fn page_of(rows: &[Article], offset: usize, limit: usize, total: u64) -> RemoteQueryResponse<Article> {
    RemoteQueryResponse::new(rows.iter().skip(offset).take(limit).cloned().collect(), total)
}
