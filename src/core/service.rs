//! The remote fetch contract consumed by the query adapter

use crate::core::query::{RemoteQueryRequest, RemoteQueryResponse};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Caching hints passed along with every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Keep the previous result on screen until this one resolves
    pub stale_while_revalidate: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            stale_while_revalidate: true,
        }
    }
}

/// Remote data source for one entity type
///
/// Implementations must honor:
/// - `offset`/`limit` as zero-based skip/take
/// - `filters` as an exact-match mapping (absent keys impose no constraint)
/// - `sort` as the single ordering key (absent means server default order)
/// - `fields` as a sparse selection (absent means the default field set)
///
/// HTTP transport, serialization and retries live behind this trait; the
/// engine never retries a failed call.
#[async_trait]
pub trait CollectionFetcher<T>: Send + Sync {
    async fn fetch(
        &self,
        request: &RemoteQueryRequest,
        options: FetchOptions,
    ) -> Result<RemoteQueryResponse<T>>;
}

#[async_trait]
impl<T, F> CollectionFetcher<T> for Arc<F>
where
    T: Send + 'static,
    F: CollectionFetcher<T> + ?Sized,
{
    async fn fetch(
        &self,
        request: &RemoteQueryRequest,
        options: FetchOptions,
    ) -> Result<RemoteQueryResponse<T>> {
        CollectionFetcher::<T>::fetch(&**self, request, options).await
    }
}

/// Adapter turning an async closure into a fetcher
///
/// ```rust,ignore
/// let fetcher = FnFetcher::new(|request: RemoteQueryRequest| async move {
///     api.list_articles(&request).await
/// });
/// ```
pub struct FnFetcher<F> {
    f: F,
}

impl<F> FnFetcher<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> CollectionFetcher<T> for FnFetcher<F>
where
    T: Send + 'static,
    F: Fn(RemoteQueryRequest) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<RemoteQueryResponse<T>>> + Send,
{
    async fn fetch(
        &self,
        request: &RemoteQueryRequest,
        _options: FetchOptions,
    ) -> Result<RemoteQueryResponse<T>> {
        (self.f)(request.clone()).await
    }
}
