//! Request-identity result cache and the stale-while-revalidate policy
//!
//! The cache remembers the identity of the most recently prepared request.
//! Every response is stored under its own identity, but only a response whose
//! identity is still the latest one is committed for display. Everything
//! else stays on screen until then, so paging never flashes an empty table.

use crate::core::adapter::QueryResult;
use crate::core::error::{CollectionError, CollectionResult, FetchError};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default number of pages kept per list view
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Small bounded least-recently-used map
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    capacity: usize,
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: IndexMap::new(),
        }
    }

    /// Look up and mark as most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = self.entries.get_index_of(key)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(idx, last);
        self.entries.get_index(last).map(|(_, v)| v)
    }

    /// Look up without touching recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Insert as most recently used; returns the evicted entry, if any
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let (idx, previous) = self.entries.insert_full(key, value);
        if previous.is_some() {
            let last = self.entries.len() - 1;
            self.entries.move_index(idx, last);
            return None;
        }
        if self.entries.len() > self.capacity {
            return self.entries.shift_remove_index(0);
        }
        None
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.shift_remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// What happened to a resolved request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response matched the latest request and is now displayed
    Committed,
    /// The view moved on before the response arrived; cached, not displayed
    Discarded,
    /// An identical request was already in flight; nothing was sent
    Deduplicated,
}

/// What the view should display right now
#[derive(Debug)]
pub struct CollectionSnapshot<T> {
    /// Last committed page (empty before the first response)
    pub result: Arc<QueryResult<T>>,

    /// Identity of the committed page
    pub identity: Option<String>,

    /// The displayed page does not match the latest request yet
    pub is_stale: bool,

    /// A request for the latest identity is in flight
    pub is_fetching: bool,

    /// Message of the last failure for the latest identity
    pub last_error: Option<String>,
}

impl<T> Clone for CollectionSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            result: Arc::clone(&self.result),
            identity: self.identity.clone(),
            is_stale: self.is_stale,
            is_fetching: self.is_fetching,
            last_error: self.last_error.clone(),
        }
    }
}

impl<T> CollectionSnapshot<T> {
    pub fn items(&self) -> &[T] {
        &self.result.items
    }

    pub fn total_count(&self) -> u64 {
        self.result.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.result.items.is_empty()
    }
}

struct CacheInner<T> {
    entries: LruCache<String, Arc<QueryResult<T>>>,
    latest: Option<String>,
    in_flight: HashSet<String>,
    committed: Option<(String, Arc<QueryResult<T>>)>,
    last_error: Option<String>,
}

/// Shared result cache for one list view
///
/// Cloning shares the same cache, so in-flight fetches can complete after
/// the view has moved on.
pub struct QueryCache<T> {
    inner: Arc<RwLock<CacheInner<T>>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl<T> QueryCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                entries: LruCache::new(capacity),
                latest: None,
                in_flight: HashSet::new(),
                committed: None,
                last_error: None,
            })),
        }
    }

    fn read(&self) -> CollectionResult<RwLockReadGuard<'_, CacheInner<T>>> {
        self.inner
            .read()
            .map_err(|e| CollectionError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> CollectionResult<RwLockWriteGuard<'_, CacheInner<T>>> {
        self.inner
            .write()
            .map_err(|e| CollectionError::Internal(format!("Failed to acquire write lock: {}", e)))
    }

    /// Register `identity` as the latest request
    ///
    /// A cached page for this identity is committed right away. Returns
    /// `true` when the caller should dispatch the fetch, `false` when the same
    /// identity is already in flight.
    pub fn begin(&self, identity: &str) -> CollectionResult<bool> {
        let mut inner = self.write()?;
        inner.latest = Some(identity.to_string());
        inner.last_error = None;

        let key = identity.to_string();
        if let Some(hit) = inner.entries.get(&key).cloned() {
            tracing::debug!(identity = %identity, "serving cached page while revalidating");
            inner.committed = Some((key.clone(), hit));
        }

        if inner.in_flight.contains(&key) {
            tracing::debug!(identity = %identity, "request already in flight, deduplicated");
            return Ok(false);
        }
        inner.in_flight.insert(key);
        Ok(true)
    }

    /// Record the result of a dispatched request
    ///
    /// A failure leaves the displayed page untouched and is handed back.
    pub fn complete(
        &self,
        identity: &str,
        result: Result<QueryResult<T>, FetchError>,
    ) -> CollectionResult<FetchOutcome> {
        let mut inner = self.write()?;
        inner.in_flight.remove(identity);
        let is_latest = inner.latest.as_deref() == Some(identity);

        match result {
            Ok(page) => {
                let page = Arc::new(page);
                inner.entries.insert(identity.to_string(), Arc::clone(&page));
                if is_latest {
                    inner.committed = Some((identity.to_string(), page));
                    inner.last_error = None;
                    Ok(FetchOutcome::Committed)
                } else {
                    tracing::debug!(identity = %identity, "discarding response for superseded request");
                    Ok(FetchOutcome::Discarded)
                }
            }
            Err(err) => {
                tracing::warn!(
                    identity = %identity,
                    error = %err,
                    "collection fetch failed, keeping last good page"
                );
                if is_latest {
                    inner.last_error = Some(err.to_string());
                }
                Err(CollectionError::Fetch(err))
            }
        }
    }

    /// Current display state
    pub fn snapshot(&self) -> CollectionResult<CollectionSnapshot<T>> {
        let inner = self.read()?;
        let (identity, result) = match &inner.committed {
            Some((id, page)) => (Some(id.clone()), Arc::clone(page)),
            None => (None, Arc::new(QueryResult::empty())),
        };
        let is_stale = match (&inner.latest, &identity) {
            (Some(latest), Some(id)) => latest != id,
            (Some(_), None) => true,
            (None, _) => false,
        };
        let is_fetching = inner
            .latest
            .as_ref()
            .is_some_and(|latest| inner.in_flight.contains(latest));

        Ok(CollectionSnapshot {
            result,
            identity,
            is_stale,
            is_fetching,
            last_error: inner.last_error.clone(),
        })
    }

    pub fn latest_identity(&self) -> CollectionResult<Option<String>> {
        Ok(self.read()?.latest.clone())
    }

    pub fn is_cached(&self, identity: &str) -> CollectionResult<bool> {
        Ok(self.read()?.entries.contains(&identity.to_string()))
    }

    /// Drop every cached page; the displayed page stays until replaced
    pub fn invalidate(&self) -> CollectionResult<()> {
        self.write()?.entries.clear();
        Ok(())
    }
}
