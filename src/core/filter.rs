//! Declarative mapping from view-state to outbound query parameters
//!
//! A list view declares at most one free-text filter and any number of
//! faceted filters. Each faceted filter is bound to a column id; if the table
//! has no such column the filter simply never receives a value.

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Free-text search parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFilterConfig {
    /// Name of the outbound filter key (e.g. "search")
    pub query_param_name: String,

    /// Placeholder shown in the toolbar input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// One selectable value of a faceted filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Discrete-value filter bound to a table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetedFilterConfig {
    /// Column whose filter state feeds this parameter
    pub column_id: String,

    /// Name of the outbound filter key
    pub query_param_name: String,

    /// Title shown on the filter control
    pub title: String,

    /// Authoritative option list
    #[serde(default)]
    pub options: Vec<FilterOption>,
}

impl FacetedFilterConfig {
    pub fn new(
        column_id: impl Into<String>,
        query_param_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            column_id: column_id.into(),
            query_param_name: query_param_name.into(),
            title: title.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(FilterOption::new(label, value));
        self
    }
}

/// Which view-state slices map to which query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_filter: Option<TextFilterConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faceted_filters: Vec<FacetedFilterConfig>,
}

impl FilterConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_filter(mut self, query_param_name: impl Into<String>) -> Self {
        self.text_filter = Some(TextFilterConfig {
            query_param_name: query_param_name.into(),
            placeholder: None,
        });
        self
    }

    pub fn with_faceted_filter(mut self, filter: FacetedFilterConfig) -> Self {
        self.faceted_filters.push(filter);
        self
    }

    /// Outbound key of the text filter, if one is configured
    pub fn text_param(&self) -> Option<&str> {
        self.text_filter
            .as_ref()
            .map(|t| t.query_param_name.as_str())
    }

    /// Faceted filter bound to a column
    pub fn faceted_for_column(&self, column_id: &str) -> Option<&FacetedFilterConfig> {
        self.faceted_filters
            .iter()
            .find(|f| f.column_id == column_id)
    }

    /// Every query parameter this configuration writes, with a description of its owner
    pub fn query_params(&self) -> Vec<(&str, String)> {
        let mut params = Vec::with_capacity(self.faceted_filters.len() + 1);
        if let Some(text) = &self.text_filter {
            params.push((text.query_param_name.as_str(), "text filter".to_string()));
        }
        for faceted in &self.faceted_filters {
            params.push((
                faceted.query_param_name.as_str(),
                format!("faceted filter '{}'", faceted.column_id),
            ));
        }
        params
    }

    /// Reject configurations where two filters share an outbound key
    ///
    /// Missing columns are not checked here: column sets are assembled by
    /// callers and an unknown column only makes its filter inert.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = self.query_params();
        for (i, (name, owner)) in params.iter().enumerate() {
            if let Some((_, other)) = params[..i].iter().find(|(n, _)| n == name) {
                return Err(ConfigError::DuplicateParam {
                    name: name.to_string(),
                    first: other.clone(),
                    second: owner.clone(),
                });
            }
        }
        Ok(())
    }
}
