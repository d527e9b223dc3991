//! Column definitions
//!
//! A column is an id, a header and an accessor that reads a cell value out of
//! a row. The table never interprets cell values beyond displaying them and
//! counting facets.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Reads one cell out of a row
pub type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

pub struct ColumnDef<T> {
    pub id: String,
    pub header: String,
    accessor: Option<Accessor<T>>,
    pub enable_sorting: bool,
    pub enable_hiding: bool,
}

impl<T> ColumnDef<T> {
    /// Display-only column (actions, selection checkbox) with no accessor
    pub fn display(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: None,
            enable_sorting: false,
            enable_hiding: false,
        }
    }

    /// Column reading its value with a closure
    pub fn accessor(
        id: impl Into<String>,
        header: impl Into<String>,
        accessor: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Some(Arc::new(accessor)),
            enable_sorting: true,
            enable_hiding: true,
        }
    }

    pub fn sortable(mut self, enable: bool) -> Self {
        self.enable_sorting = enable;
        self
    }

    pub fn hideable(mut self, enable: bool) -> Self {
        self.enable_hiding = enable;
        self
    }

    pub fn has_accessor(&self) -> bool {
        self.accessor.is_some()
    }

    /// Cell value for `row`, `Null` for display-only columns
    pub fn value(&self, row: &T) -> Value {
        match &self.accessor {
            Some(accessor) => accessor(row),
            None => Value::Null,
        }
    }
}

impl<T: Serialize> ColumnDef<T> {
    /// Column reading the serialised field named like the column id
    pub fn field(id: impl Into<String>, header: impl Into<String>) -> Self {
        let id = id.into();
        let key = id.clone();
        Self::accessor(id, header, move |row: &T| {
            serde_json::to_value(row)
                .ok()
                .and_then(|v| v.get(&key).cloned())
                .unwrap_or(Value::Null)
        })
    }
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            enable_sorting: self.enable_sorting,
            enable_hiding: self.enable_hiding,
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("has_accessor", &self.accessor.is_some())
            .field("enable_sorting", &self.enable_sorting)
            .field("enable_hiding", &self.enable_hiding)
            .finish()
    }
}
