//! Remote query request/response types and pagination math

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Top-level request fields that static extras may not shadow
pub const RESERVED_REQUEST_FIELDS: [&str; 5] = ["offset", "limit", "filters", "fields", "sort"];

/// Sort direction as sent to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_desc(desc: bool) -> Self {
        if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn is_desc(self) -> bool {
        self == SortDirection::Desc
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// The single ordering key of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Sparse field-selection tree
///
/// `true` selects a whole attribute; a nested map selects attributes of a
/// related object.
///
/// # Example
/// ```
/// use folio::core::query::FieldSelection;
///
/// let fields = FieldSelection::fields(["id", "title"])
///     .nest("author", FieldSelection::fields(["name"]));
/// let json = serde_json::to_string(&fields).unwrap();
/// assert_eq!(json, r#"{"author":{"name":true},"id":true,"title":true}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSelection {
    Leaf(bool),
    Nested(BTreeMap<String, FieldSelection>),
}

impl FieldSelection {
    /// Select a flat list of attributes
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSelection::Nested(
            names
                .into_iter()
                .map(|n| (n.into(), FieldSelection::Leaf(true)))
                .collect(),
        )
    }

    /// Add (or replace) a nested selection
    pub fn nest(self, name: impl Into<String>, selection: FieldSelection) -> Self {
        let mut map = match self {
            FieldSelection::Nested(map) => map,
            FieldSelection::Leaf(_) => BTreeMap::new(),
        };
        map.insert(name.into(), selection);
        FieldSelection::Nested(map)
    }

    /// Keep only the selected attributes of a JSON value
    ///
    /// Arrays are projected element-wise; scalars pass through.
    pub fn project(&self, value: &Value) -> Value {
        match (self, value) {
            (FieldSelection::Leaf(true), v) => v.clone(),
            (FieldSelection::Leaf(false), _) => Value::Null,
            (FieldSelection::Nested(_), Value::Array(items)) => {
                Value::Array(items.iter().map(|item| self.project(item)).collect())
            }
            (FieldSelection::Nested(map), Value::Object(obj)) => {
                let mut out = Map::new();
                for (name, selection) in map {
                    if matches!(selection, FieldSelection::Leaf(false)) {
                        continue;
                    }
                    if let Some(v) = obj.get(name) {
                        out.insert(name.clone(), selection.project(v));
                    }
                }
                Value::Object(out)
            }
            (FieldSelection::Nested(_), v) => v.clone(),
        }
    }
}

/// Caller-supplied defaults merged into every request
///
/// `filters` are overridden by dynamic filters on key collision; `extra`
/// fields are spread at the top level of the request unchanged (an
/// entity-scoping id, a locale...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticParams {
    #[serde(default)]
    pub filters: BTreeMap<String, Value>,

    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl StaticParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.filters.insert(key.into(), value);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Spread a typed struct's fields into `extra`
    pub fn with_extra_from<S: Serialize>(mut self, extra: &S) -> Result<Self, ConfigError> {
        match serde_json::to_value(extra).map_err(|e| ConfigError::Parse(e.to_string()))? {
            Value::Object(obj) => {
                self.extra.extend(obj);
                Ok(self)
            }
            other => Err(ConfigError::Parse(format!(
                "static extras must serialize to an object, got {}",
                other
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = self
            .extra
            .keys()
            .find(|k| RESERVED_REQUEST_FIELDS.contains(&k.as_str()))
        {
            return Err(ConfigError::ReservedParam { name: name.clone() });
        }
        Ok(())
    }
}

/// The sole artifact handed to the fetch contract
///
/// A pure function of view-state, filter configuration and static params.
/// Two requests with equal fields have equal [`fingerprint`](Self::fingerprint)s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteQueryRequest {
    /// Rows to skip
    pub offset: usize,

    /// Rows to take
    pub limit: usize,

    /// Exact-match filters by outbound parameter name
    #[serde(default)]
    pub filters: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldSelection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,

    /// Static top-level fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RemoteQueryRequest {
    /// First page with no constraints
    pub fn first_page(limit: usize) -> Self {
        Self {
            offset: 0,
            limit: limit.max(1),
            filters: BTreeMap::new(),
            fields: None,
            sort: None,
            extra: BTreeMap::new(),
        }
    }

    /// Canonical serialized form, used as the request identity
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    pub fn filter(&self, key: &str) -> Option<&Value> {
        self.filters.get(key)
    }

    pub fn page_index(&self) -> usize {
        self.offset / self.limit.max(1)
    }
}

/// Pagination block of a response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePagination {
    #[serde(default)]
    pub count: Option<u64>,
}

/// What the fetch contract resolves to
///
/// Both blocks are optional on the wire; a malformed response reads as an
/// empty page rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteQueryResponse<T> {
    #[serde(default)]
    pub data: Option<Vec<T>>,

    #[serde(default)]
    pub pagination: Option<ResponsePagination>,
}

impl<T> RemoteQueryResponse<T> {
    pub fn new(data: Vec<T>, count: u64) -> Self {
        Self {
            data: Some(data),
            pagination: Some(ResponsePagination { count: Some(count) }),
        }
    }

    pub fn empty() -> Self {
        Self {
            data: None,
            pagination: None,
        }
    }

    /// Total row count, zero when the server did not report one
    pub fn count(&self) -> u64 {
        self.pagination
            .as_ref()
            .and_then(|p| p.count)
            .unwrap_or(0)
    }

    pub fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

/// Derived pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current zero-based page index
    pub page_index: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of items (after filters)
    pub total: u64,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page_index: usize, page_size: usize, total: u64) -> Self {
        // Ensure page_size is at least 1 to avoid division by zero
        let page_size = page_size.max(1);
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(page_size as u64) as usize
        };

        Self {
            page_index,
            page_size,
            total,
            total_pages,
            has_next: page_index.saturating_add(1) < total_pages,
            has_prev: page_index > 0,
        }
    }
}
