//! In-memory implementation of CollectionFetcher for testing and development

use crate::core::query::{RemoteQueryRequest, RemoteQueryResponse};
use crate::core::service::{CollectionFetcher, FetchOptions};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory collection honoring the full request contract
///
/// Filters are exact matches on the serialised field (an array value means
/// "any of"), except for search parameters registered with
/// [`with_search`](Self::with_search), which match a case-insensitive
/// substring of any of their fields. Uses RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemoryCollection<T> {
    rows: Arc<RwLock<Vec<T>>>,
    search: Arc<HashMap<String, Vec<String>>>,
}

impl<T> InMemoryCollection<T> {
    /// Create a collection holding `rows` in their default order
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
            search: Arc::new(HashMap::new()),
        }
    }

    /// Treat `param` as a free-text search over `fields`
    pub fn with_search<I, S>(mut self, param: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut search = (*self.search).clone();
        search.insert(param.into(), fields.into_iter().map(Into::into).collect());
        self.search = Arc::new(search);
        self
    }

    pub fn push(&self, row: T) -> Result<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for InMemoryCollection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> InMemoryCollection<T>
where
    T: Serialize,
{
    fn matches(&self, row: &Value, key: &str, expected: &Value) -> bool {
        if let Some(fields) = self.search.get(key) {
            let needle = match expected {
                Value::String(s) => s.to_lowercase(),
                Value::Null => return true,
                other => other.to_string().to_lowercase(),
            };
            return needle.is_empty()
                || fields.iter().any(|field| match row.get(field) {
                    Some(Value::String(s)) => s.to_lowercase().contains(&needle),
                    Some(Value::Null) | None => false,
                    Some(other) => other.to_string().to_lowercase().contains(&needle),
                });
        }

        let actual = row.get(key).unwrap_or(&Value::Null);
        match expected {
            Value::Null => true,
            Value::Array(any_of) => any_of.iter().any(|v| field_equals(actual, v)),
            single => field_equals(actual, single),
        }
    }

    /// Filter, sort and paginate the serialised rows
    fn query(&self, request: &RemoteQueryRequest) -> Result<(Vec<Value>, u64)> {
        let rows = self
            .rows
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut matched = Vec::new();
        for row in rows.iter() {
            let value = serde_json::to_value(row).context("Failed to serialize row")?;
            if request
                .filters
                .iter()
                .all(|(key, expected)| self.matches(&value, key, expected))
            {
                matched.push(value);
            }
        }

        if let Some(sort) = &request.sort {
            matched.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(&sort.field).unwrap_or(&Value::Null),
                    b.get(&sort.field).unwrap_or(&Value::Null),
                );
                if sort.direction.is_desc() { ord.reverse() } else { ord }
            });
        }

        let count = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|v| match &request.fields {
                Some(selection) => selection.project(&v),
                None => v,
            })
            .collect();
        Ok((page, count))
    }
}

/// Equality with a cell holding a list matching any of its elements
fn field_equals(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| item == expected),
        _ => actual == expected,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[async_trait]
impl<T> CollectionFetcher<T> for InMemoryCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch(
        &self,
        request: &RemoteQueryRequest,
        _options: FetchOptions,
    ) -> Result<RemoteQueryResponse<T>> {
        let (page, count) = self.query(request)?;
        let data = page
            .into_iter()
            .map(|v| serde_json::from_value(v).context("Row does not fit the requested fields"))
            .collect::<Result<Vec<T>>>()?;
        Ok(RemoteQueryResponse::new(data, count))
    }
}
