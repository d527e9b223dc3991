//! Navigable location abstraction used by URL-mirrored view-state

use crate::core::error::UrlError;
use std::sync::{Arc, RwLock};

/// How a state change lands in the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// New entry; back returns to the previous view
    Push,
    /// Overwrite the current entry (keystrokes, cosmetic changes)
    Replace,
}

/// The host's navigable location (browser URL, router, deep-link handler)
///
/// Only the query-string part is exchanged, without the leading `?`.
pub trait Navigator: Send {
    /// Query string of the current entry
    fn query(&self) -> String;

    /// Move to a new query string
    fn navigate(&mut self, query: &str, mode: HistoryMode) -> Result<(), UrlError>;
}

#[derive(Debug, Default)]
struct HistoryInner {
    entries: Vec<String>,
    cursor: usize,
}

/// In-memory history stack with back/forward
///
/// Clones share the same stack, so a test (or a headless host) can keep a
/// handle for `back()`/`forward()` while the store owns another.
#[derive(Debug, Clone)]
pub struct InMemoryHistory {
    inner: Arc<RwLock<HistoryInner>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::with_query("")
    }

    /// Start at a given query string (a shared link, a reload)
    pub fn with_query(query: &str) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HistoryInner {
                entries: vec![query.trim_start_matches('?').to_string()],
                cursor: 0,
            })),
        }
    }

    pub fn back(&self) -> bool {
        match self.inner.write() {
            Ok(mut inner) if inner.cursor > 0 => {
                inner.cursor -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn forward(&self) -> bool {
        match self.inner.write() {
            Ok(mut inner) if inner.cursor + 1 < inner.entries.len() => {
                inner.cursor += 1;
                true
            }
            _ => false,
        }
    }

    /// Number of entries in the stack
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for InMemoryHistory {
    fn query(&self) -> String {
        self.inner
            .read()
            .ok()
            .and_then(|i| i.entries.get(i.cursor).cloned())
            .unwrap_or_default()
    }

    fn navigate(&mut self, query: &str, mode: HistoryMode) -> Result<(), UrlError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| UrlError::Navigation(format!("history lock poisoned: {}", e)))?;
        let cursor = inner.cursor;
        match mode {
            HistoryMode::Replace => {
                if let Some(entry) = inner.entries.get_mut(cursor) {
                    *entry = query.to_string();
                }
            }
            HistoryMode::Push => {
                if inner.entries.get(cursor).map(String::as_str) == Some(query) {
                    return Ok(());
                }
                inner.entries.truncate(cursor + 1);
                inner.entries.push(query.to_string());
                inner.cursor = inner.entries.len() - 1;
            }
        }
        Ok(())
    }
}
