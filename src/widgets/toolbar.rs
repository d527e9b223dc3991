//! Toolbar: free-text input, faceted filters, reset

use crate::core::debounce::Debouncer;
use crate::core::error::CollectionResult;
use crate::core::filter::{FacetedFilterConfig, FilterConfiguration};
use crate::table::{Table, facet_key};
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

/// State of the free-text input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextInputView {
    pub value: String,
    pub placeholder: Option<String>,
}

/// One option of a faceted filter as it should be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOptionView {
    pub label: String,
    pub value: String,
    pub selected: bool,
    /// Occurrences among the loaded rows
    pub count: usize,
}

/// A faceted filter resolved against its column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetedFilterView {
    pub column_id: String,
    pub title: String,
    pub options: Vec<FacetOptionView>,
}

impl FacetedFilterView {
    pub fn selected_values(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.options.iter().filter(|o| o.selected).count()
    }
}

/// Selected option values held by a column filter
fn selected_values(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(facet_key).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![facet_key(other)],
    }
}

pub struct Toolbar<'a, T> {
    table: Table<'a, T>,
    filters: &'a FilterConfiguration,
    debouncer: Option<&'a mut Debouncer<String>>,
}

impl<'a, T> Toolbar<'a, T> {
    pub fn new(table: Table<'a, T>, filters: &'a FilterConfiguration) -> Self {
        Self {
            table,
            filters,
            debouncer: None,
        }
    }

    /// Feed text changes to a debouncer as they are typed
    pub fn with_debouncer(mut self, debouncer: &'a mut Debouncer<String>) -> Self {
        self.debouncer = Some(debouncer);
        self
    }

    pub fn table(&self) -> &Table<'a, T> {
        &self.table
    }

    /// Text input, present only when a text filter is configured
    pub fn text_input(&self) -> Option<TextInputView> {
        let text = self.filters.text_filter.as_ref()?;
        Some(TextInputView {
            value: self.table.state().global_filter.clone(),
            placeholder: text.placeholder.clone(),
        })
    }

    /// Raw keystroke value; the network only sees it once debounced
    pub fn set_text(&mut self, value: impl Into<String>) -> CollectionResult<bool> {
        let changed = self.table.store_mut().set_global_filter(value.into())?;
        if let Some(debouncer) = self.debouncer.as_deref_mut() {
            debouncer.observe(&self.table.state().global_filter, Instant::now());
        }
        Ok(changed)
    }

    /// Faceted filters whose column exists in the table
    pub fn faceted_filters(&self) -> Vec<FacetedFilterView> {
        self.filters
            .faceted_filters
            .iter()
            .filter(|f| self.table.get_column(&f.column_id).is_some())
            .map(|f| self.view_for(f))
            .collect()
    }

    pub fn faceted_filter(&self, column_id: &str) -> Option<FacetedFilterView> {
        let config = self.filters.faceted_for_column(column_id)?;
        self.table.get_column(column_id)?;
        Some(self.view_for(config))
    }

    fn view_for(&self, config: &FacetedFilterConfig) -> FacetedFilterView {
        let selected = selected_values(self.table.column_filter_value(&config.column_id));
        let counts = self.table.faceted_unique_values(&config.column_id);
        FacetedFilterView {
            column_id: config.column_id.clone(),
            title: config.title.clone(),
            options: config
                .options
                .iter()
                .map(|o| FacetOptionView {
                    label: o.label.clone(),
                    value: o.value.clone(),
                    selected: selected.contains(&o.value),
                    count: counts.get(&o.value).copied().unwrap_or(0),
                })
                .collect(),
        }
    }

    /// Select or deselect one option
    ///
    /// The column filter holds the selected values as an array and is
    /// removed once nothing is selected.
    pub fn toggle_facet(&mut self, column_id: &str, option_value: &str) -> CollectionResult<bool> {
        let mut selected = selected_values(self.table.column_filter_value(column_id));
        match selected.iter().position(|v| v == option_value) {
            Some(pos) => {
                selected.remove(pos);
            }
            None => selected.push(option_value.to_string()),
        }
        let value = if selected.is_empty() {
            None
        } else {
            Some(Value::Array(selected.into_iter().map(Value::String).collect()))
        };
        self.table.set_column_filter(column_id, value)
    }

    pub fn clear_facet(&mut self, column_id: &str) -> CollectionResult<bool> {
        self.table.set_column_filter(column_id, None)
    }

    /// Whether the reset affordance should be shown
    pub fn is_filtered(&self) -> bool {
        !self.table.state().column_filters.is_empty()
    }

    /// Clear all column filters; text, sorting and page size are kept
    pub fn reset(&mut self) -> CollectionResult<bool> {
        self.table.reset_column_filters()
    }
}
