//! Configuration loading and management

use crate::core::cache::DEFAULT_CACHE_CAPACITY;
use crate::core::error::ConfigError;
use crate::core::filter::FilterConfiguration;
use crate::core::query::{FieldSelection, StaticParams};
use crate::core::state::DEFAULT_PAGE_SIZE;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happens to the page index when the result set changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageResetPolicy {
    /// Go back to the first page on any sort, filter or search change
    #[default]
    ResetToFirstPage,
    /// Leave the page index alone
    Keep,
}

/// Query parameter names used when view-state is mirrored to the URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlConfig {
    /// One-based page number
    pub page_param: String,
    pub page_size_param: String,
    /// Sort column id
    pub sort_param: String,
    /// `asc` or `desc`
    pub order_param: String,
    /// Global filter key when no text filter declares its own name
    pub search_param: String,
    /// Repeated once per hidden column
    pub hidden_param: String,
    /// Repeated once per selected row id
    pub selected_param: String,
    pub persist_visibility: bool,
    pub persist_selection: bool,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            page_param: "page".to_string(),
            page_size_param: "pageSize".to_string(),
            sort_param: "sort".to_string(),
            order_param: "order".to_string(),
            search_param: "search".to_string(),
            hidden_param: "hidden".to_string(),
            selected_param: "selected".to_string(),
            persist_visibility: true,
            persist_selection: true,
        }
    }
}

impl UrlConfig {
    /// Parameters owned by the codec itself, with a description of their slice
    pub fn own_params(&self) -> Vec<(&str, String)> {
        let mut params = vec![
            (self.page_param.as_str(), "page index".to_string()),
            (self.page_size_param.as_str(), "page size".to_string()),
            (self.sort_param.as_str(), "sort column".to_string()),
            (self.order_param.as_str(), "sort order".to_string()),
        ];
        if self.persist_visibility {
            params.push((self.hidden_param.as_str(), "column visibility".to_string()));
        }
        if self.persist_selection {
            params.push((self.selected_param.as_str(), "row selection".to_string()));
        }
        params
    }

    /// Check that no two slices share a parameter
    ///
    /// The search parameter only counts when `filters` has no text filter.
    pub fn validate_against(&self, filters: &FilterConfiguration) -> Result<(), ConfigError> {
        filters.validate()?;
        let mut params = self.own_params();
        if filters.text_filter.is_none() {
            params.push((self.search_param.as_str(), "global filter".to_string()));
        }
        params.extend(filters.query_params());

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

/// Engine-wide settings shared by every list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiet period before the free-text filter reaches the network
    pub debounce_ms: u64,

    pub default_page_size: usize,

    /// Choices offered by the page-size selector
    pub page_size_options: Vec<usize>,

    /// Pages remembered per list view
    pub cache_capacity: usize,

    pub page_reset: PageResetPolicy,

    pub url: UrlConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: vec![10, 20, 30, 40, 50],
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            page_reset: PageResetPolicy::ResetToFirstPage,
            url: UrlConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 || self.page_size_options.contains(&0) {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}

/// Everything one list view declares about itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub filters: FilterConfiguration,

    pub static_params: StaticParams,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldSelection>,

    /// Overrides the engine default page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl CollectionConfig {
    pub fn new(filters: FilterConfiguration) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn with_static_params(mut self, static_params: StaticParams) -> Self {
        self.static_params = static_params;
        self
    }

    pub fn with_fields(mut self, fields: FieldSelection) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn page_size_or(&self, engine: &EngineConfig) -> usize {
        self.page_size.unwrap_or(engine.default_page_size)
    }

    /// Validate against the engine settings this view will run under
    pub fn validate(&self, engine: &EngineConfig) -> Result<(), ConfigError> {
        engine.validate()?;
        if self.page_size == Some(0) {
            return Err(ConfigError::ZeroPageSize);
        }
        self.static_params.validate()?;
        engine.url.validate_against(&self.filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::FacetedFilterConfig;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.page_reset, PageResetPolicy::ResetToFirstPage);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_override() {
        let config = EngineConfig::from_yaml_str(
            r#"
debounce_ms: 150
page_reset: keep
url:
  page_param: p
"#,
        )
        .unwrap();

        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.page_reset, PageResetPolicy::Keep);
        assert_eq!(config.url.page_param, "p");
        assert_eq!(config.url.sort_param, "sort");
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(EngineConfig::from_yaml_str("default_page_size: 0").is_err());
    }

    #[test]
    fn test_yaml_serialization() {
        let config = EngineConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = EngineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_collection_param_clash_with_url_slice() {
        let collection = CollectionConfig::new(
            FilterConfiguration::new()
                .with_faceted_filter(FacetedFilterConfig::new("sort", "sort", "Sort")),
        );
        let err = collection.validate(&EngineConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_QUERY_PARAM");
    }

    #[test]
    fn test_search_param_only_reserved_without_text_filter() {
        let engine = EngineConfig::default();

        let with_text = CollectionConfig::new(
            FilterConfiguration::new()
                .with_text_filter("q")
                .with_faceted_filter(FacetedFilterConfig::new("kind", "search", "Kind")),
        );
        assert!(with_text.validate(&engine).is_ok());

        let without_text = CollectionConfig::new(
            FilterConfiguration::new()
                .with_faceted_filter(FacetedFilterConfig::new("kind", "search", "Kind")),
        );
        assert!(without_text.validate(&engine).is_err());
    }

    #[test]
    fn test_collection_yaml() {
        let yaml = r#"
filters:
  text_filter:
    query_param_name: search
  faceted_filters:
    - column_id: status
      query_param_name: status
      title: Status
      options:
        - label: Active
          value: active
static_params:
  filters:
    kind: article
  extra:
    organizationId: org_1
page_size: 25
"#;
        let config = CollectionConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.page_size_or(&EngineConfig::default()), 25);
        assert_eq!(config.static_params.extra["organizationId"], "org_1");
        assert!(config.validate(&EngineConfig::default()).is_ok());
    }
}
