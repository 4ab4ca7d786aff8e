use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::column::{self, ColumnDef};
use crate::state::data_model::{self, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    Text,
    Select,
    MultiSelect,
    DateRange,
    NumberRange,
}

/// A column filter. The variant follows the column's [`FilterType`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum FilterValue {
    Text(String),
    Select(String),
    MultiSelect(Vec<String>),
    Date(String),
    NumberRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
}

impl FilterValue {
    /// Empty strings, empty selections and open ranges filter nothing.
    pub fn is_active(&self) -> bool {
        match self {
            Self::Text(text) | Self::Select(text) | Self::Date(text) => !text.trim().is_empty(),
            Self::MultiSelect(values) => !values.is_empty(),
            Self::NumberRange { min, max } => min.is_some() || max.is_some(),
        }
    }

    pub fn filter_type(&self) -> FilterType {
        match self {
            Self::Text(_) => FilterType::Text,
            Self::Select(_) => FilterType::Select,
            Self::MultiSelect(_) => FilterType::MultiSelect,
            Self::Date(_) => FilterType::DateRange,
            Self::NumberRange { .. } => FilterType::NumberRange,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    filters: BTreeMap<String, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` for the column. An inactive value clears the column.
    pub fn set(&mut self, column_id: &str, value: FilterValue) {
        if value.is_active() {
            log::debug!("filter {column_id} = {value:?}");
            self.filters.insert(column_id.to_string(), value);
        } else {
            self.clear(column_id);
        }
    }

    pub fn clear(&mut self, column_id: &str) {
        if self.filters.remove(column_id).is_some() {
            log::debug!("filter {column_id} cleared");
        }
    }

    pub fn clear_all(&mut self) {
        self.filters.clear();
    }

    pub fn get(&self, column_id: &str) -> Option<&FilterValue> {
        self.filters.get(column_id)
    }

    pub fn is_active(&self, column_id: &str) -> bool {
        self.filters
            .get(column_id)
            .map(FilterValue::is_active)
            .unwrap_or(false)
    }

    pub fn active_count(&self) -> usize {
        self.filters.values().filter(|value| value.is_active()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.filters.iter().map(|(id, value)| (id.as_str(), value))
    }

    /// Adds or removes `option` from a multi-select filter. Removing the
    /// last option clears the filter.
    pub fn toggle_option(&mut self, column_id: &str, option: &str) {
        let mut selected = match self.filters.get(column_id) {
            Some(FilterValue::MultiSelect(values)) => values.clone(),
            _ => Vec::new(),
        };
        if let Some(pos) = selected.iter().position(|value| value == option) {
            selected.remove(pos);
        } else {
            selected.push(option.to_string());
        }
        self.set(column_id, FilterValue::MultiSelect(selected));
    }

    /// Drops filters for columns that no longer exist.
    pub fn retain_columns(&mut self, column_ids: &[String]) {
        self.filters.retain(|id, _| column_ids.contains(id));
    }
}

/// Default predicate for one cell value against one filter.
pub fn matches(value: Option<&Value>, filter: &FilterValue) -> bool {
    if !filter.is_active() {
        return true;
    }

    match filter {
        FilterValue::Text(needle) => {
            let needle = needle.trim().to_lowercase();
            value
                .map(|value| data_model::display_value(value).to_lowercase().contains(&needle))
                .unwrap_or(false)
        }
        FilterValue::Select(selected) => value
            .map(|value| data_model::display_value(value) == *selected)
            .unwrap_or(false),
        FilterValue::MultiSelect(selected) => match value {
            Some(Value::Array(items)) => items
                .iter()
                .any(|item| selected.contains(&data_model::display_value(item))),
            Some(value) => selected.contains(&data_model::display_value(value)),
            None => false,
        },
        FilterValue::Date(from) => {
            let Some(from) = parse_date(from) else {
                return true;
            };
            value
                .and_then(|value| value.as_str())
                .and_then(parse_date)
                .map(|date| date >= from)
                .unwrap_or(false)
        }
        FilterValue::NumberRange { min, max } => {
            let Some(number) = value.and_then(number_of) else {
                return false;
            };
            min.map(|min| number >= min).unwrap_or(true)
                && max.map(|max| number <= max).unwrap_or(true)
        }
    }
}

/// Keeps the `indices` whose rows pass every active filter.
pub fn filter_indices<T: Record>(
    rows: &[T],
    indices: impl IntoIterator<Item = usize>,
    columns: &[ColumnDef<T>],
    state: &FilterState,
) -> Vec<usize> {
    let active: Vec<(&ColumnDef<T>, &FilterValue)> = state
        .iter()
        .filter(|(_, value)| value.is_active())
        .filter_map(|(id, value)| column::find_column(columns, id).map(|column| (column, value)))
        .collect();

    indices
        .into_iter()
        .filter(|idx| {
            let row = &rows[*idx];
            active
                .iter()
                .all(|(column, filter)| matches(column.value(row).as_ref(), filter))
        })
        .collect()
}

/// Row positions passing every active filter, in input order.
pub fn filter_rows<T: Record>(
    rows: &[T],
    columns: &[ColumnDef<T>],
    state: &FilterState,
) -> Vec<usize> {
    filter_indices(rows, 0..rows.len(), columns, state)
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
