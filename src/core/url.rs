//! View-state <-> URL query-string codec
//!
//! Each slice owns a small set of parameters. Default values are omitted so
//! a pristine view has an empty query string. Lists are written as repeated
//! parameters (`hidden=slug&hidden=body`) so ids may contain any character.
//!
//! A faceted filter holding a non-empty list of strings is written as
//! repeated `status=active&status=draft` parameters. Any other value (a
//! scalar, a number, an empty list) goes out as JSON under `status.json`,
//! so the value read back is the value written.

use crate::config::UrlConfig;
use crate::core::filter::FilterConfiguration;
use crate::core::state::{ColumnFilter, ColumnSort, PaginationState, ViewState};
use serde_json::Value;
use url::form_urlencoded;

#[derive(Debug, Clone)]
pub struct UrlCodec {
    config: UrlConfig,
    filters: FilterConfiguration,
    default_page_size: usize,
}

impl UrlCodec {
    pub fn new(config: UrlConfig, filters: FilterConfiguration, default_page_size: usize) -> Self {
        Self {
            config,
            filters,
            default_page_size: default_page_size.max(1),
        }
    }

    pub fn config(&self) -> &UrlConfig {
        &self.config
    }

    /// Parameter carrying the global filter
    fn global_param(&self) -> &str {
        self.filters
            .text_param()
            .unwrap_or(self.config.search_param.as_str())
    }

    /// Every parameter this codec reads or writes
    pub fn owned_params(&self) -> Vec<String> {
        let mut params: Vec<String> = self
            .config
            .own_params()
            .into_iter()
            .map(|(n, _)| n.to_string())
            .collect();
        params.push(self.global_param().to_string());
        for faceted in &self.filters.faceted_filters {
            params.push(faceted.query_param_name.clone());
            params.push(json_param(&faceted.query_param_name));
        }
        params
    }

    /// State as ordered key/value pairs, defaults omitted
    pub fn encode(&self, state: &ViewState) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let cfg = &self.config;

        if state.pagination.page_index != 0 {
            pairs.push((
                cfg.page_param.clone(),
                (state.pagination.page_index + 1).to_string(),
            ));
        }
        if state.pagination.page_size != self.default_page_size {
            pairs.push((
                cfg.page_size_param.clone(),
                state.pagination.page_size.to_string(),
            ));
        }

        if let Some(sort) = state.sorting.first() {
            pairs.push((cfg.sort_param.clone(), sort.id.clone()));
            pairs.push((
                cfg.order_param.clone(),
                if sort.desc { "desc" } else { "asc" }.to_string(),
            ));
        }

        if !state.global_filter.is_empty() {
            pairs.push((self.global_param().to_string(), state.global_filter.clone()));
        }

        for faceted in &self.filters.faceted_filters {
            let Some(value) = state.column_filter(&faceted.column_id) else {
                continue;
            };
            match value.as_array() {
                Some(items) if !items.is_empty() && items.iter().all(Value::is_string) => {
                    for item in items.iter().filter_map(Value::as_str) {
                        pairs.push((faceted.query_param_name.clone(), item.to_string()));
                    }
                }
                _ => pairs.push((json_param(&faceted.query_param_name), value.to_string())),
            }
        }

        if cfg.persist_visibility {
            for (column, shown) in &state.column_visibility {
                if !shown {
                    pairs.push((cfg.hidden_param.clone(), column.clone()));
                }
            }
        }

        if cfg.persist_selection {
            for (row, selected) in &state.row_selection {
                if *selected {
                    pairs.push((cfg.selected_param.clone(), row.clone()));
                }
            }
        }

        pairs
    }

    /// Percent-encoded query string (no leading `?`)
    pub fn to_query(&self, state: &ViewState) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.encode(state))
            .finish()
    }

    /// Rebuild state from decoded pairs
    ///
    /// Unknown parameters are ignored; malformed values fall back to the
    /// slice default. A page whose offset would not fit a `usize` counts as
    /// malformed.
    pub fn decode<I, K, V>(&self, pairs: I) -> ViewState
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let cfg = &self.config;
        let global_param = self.global_param().to_string();
        let mut state = ViewState {
            pagination: PaginationState::new(self.default_page_size),
            ..ViewState::default()
        };
        let mut sort_id: Option<String> = None;
        let mut desc = false;
        let mut facets: Vec<(String, Value)> = Vec::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            if key == cfg.page_param {
                match value.parse::<usize>() {
                    Ok(page) if page >= 1 => state.pagination.page_index = page - 1,
                    _ => tracing::debug!(param = key, value, "ignoring malformed page number"),
                }
            } else if key == cfg.page_size_param {
                match value.parse::<usize>() {
                    Ok(size) if size >= 1 => state.pagination.page_size = size,
                    _ => tracing::debug!(param = key, value, "ignoring malformed page size"),
                }
            } else if key == cfg.sort_param {
                if !value.is_empty() {
                    sort_id = Some(value.to_string());
                }
            } else if key == cfg.order_param {
                match value {
                    "desc" => desc = true,
                    "asc" => desc = false,
                    _ => tracing::debug!(param = key, value, "ignoring unknown sort order"),
                }
            } else if key == global_param {
                state.global_filter = value.to_string();
            } else if cfg.persist_visibility && key == cfg.hidden_param {
                state.column_visibility.insert(value.to_string(), false);
            } else if cfg.persist_selection && key == cfg.selected_param {
                state.row_selection.insert(value.to_string(), true);
            } else if let Some(faceted) = self
                .filters
                .faceted_filters
                .iter()
                .find(|f| f.query_param_name == key)
            {
                let item = Value::String(value.to_string());
                match facets.iter_mut().find(|(id, _)| *id == faceted.column_id) {
                    Some((_, Value::Array(items))) => items.push(item),
                    Some((_, other)) => *other = Value::Array(vec![item]),
                    None => facets.push((faceted.column_id.clone(), Value::Array(vec![item]))),
                }
            } else if let Some(faceted) = self
                .filters
                .faceted_filters
                .iter()
                .find(|f| json_param(&f.query_param_name) == key)
            {
                match serde_json::from_str::<Value>(value) {
                    Ok(parsed) => {
                        facets.retain(|(id, _)| *id != faceted.column_id);
                        facets.push((faceted.column_id.clone(), parsed));
                    }
                    Err(e) => tracing::debug!(param = key, error = %e, "ignoring malformed filter value"),
                }
            }
        }

        if !state.pagination.is_addressable() {
            tracing::debug!(
                page_index = state.pagination.page_index,
                page_size = state.pagination.page_size,
                "page offset out of range, using first page"
            );
            state.pagination.page_index = 0;
        }
        if let Some(id) = sort_id {
            state.sorting = vec![ColumnSort { id, desc }];
        }
        // Column filters follow the declaration order of the faceted filters
        for faceted in &self.filters.faceted_filters {
            if let Some((_, value)) = facets.iter().find(|(id, _)| *id == faceted.column_id) {
                state
                    .column_filters
                    .push(ColumnFilter::new(faceted.column_id.clone(), value.clone()));
            }
        }

        state
    }

    /// Parse a query string (leading `?` allowed)
    pub fn from_query(&self, query: &str) -> ViewState {
        let query = query.trim_start_matches('?');
        self.decode(form_urlencoded::parse(query.as_bytes()))
    }

    /// Rewrite `existing` with this state, keeping parameters the codec does not own
    pub fn merge_into(&self, existing: &str, state: &ViewState) -> String {
        let owned = self.owned_params();
        let foreign: Vec<(String, String)> =
            form_urlencoded::parse(existing.trim_start_matches('?').as_bytes())
                .filter(|(k, _)| !owned.iter().any(|o| o == k))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(foreign)
            .extend_pairs(self.encode(state))
            .finish()
    }
}

/// Parameter carrying a faceted value that is not a list of strings
fn json_param(name: &str) -> String {
    format!("{name}.json")
}
