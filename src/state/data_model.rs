use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

pub type Row = BTreeMap<String, Value>;
pub type TableData = Vec<Row>;

/// Placeholder shown for cells whose accessor yields nothing.
pub const EMPTY_CELL: &str = "-";

/// Returns the sorted union of all keys across all rows.
pub fn derive_columns(data: &[Row]) -> Vec<String> {
    let mut cols = BTreeSet::new();
    for row in data {
        for key in row.keys() {
            cols.insert(key.clone());
        }
    }
    cols.into_iter().collect()
}

/// Formats a JSON value for display in a table cell.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Like [`display_value`], but missing, null and empty values render as
/// [`EMPTY_CELL`].
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => EMPTY_CELL.to_string(),
        Some(value) => {
            let text = display_value(value);
            if text.is_empty() {
                EMPTY_CELL.to_string()
            } else {
                text
            }
        }
    }
}

/// Rows the engine can read fields from by key.
pub trait Record {
    fn field(&self, key: &str) -> Option<Value>;
}

impl Record for Row {
    fn field(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl Record for Value {
    fn field(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.get(key)).cloned()
    }
}
