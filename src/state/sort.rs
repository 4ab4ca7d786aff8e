use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::state::column::{self, ColumnDef};
use crate::state::data_model::{self, Record};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    None,
    Asc,
    Desc,
}

impl SortDirection {
    /// none -> asc -> desc -> none
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Asc,
            Self::Asc => Self::Desc,
            Self::Desc => Self::None,
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::None
    }
}

/// Single-column sort. A `None` direction means the table is unsorted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column_id: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by(column_id: impl Into<String>, direction: SortDirection) -> Self {
        let mut state = Self::default();
        state.apply(&column_id.into(), direction);
        state
    }

    /// Direction a header click on `column_id` reports: the next step of the
    /// cycle for the active column, `Asc` for any other.
    pub fn next_for(&self, column_id: &str) -> SortDirection {
        match self.column_id.as_deref() {
            Some(active) if active == column_id => self.direction.next(),
            _ => SortDirection::Asc,
        }
    }

    /// Replaces any prior sort.
    pub fn apply(&mut self, column_id: &str, direction: SortDirection) {
        if direction.is_active() {
            self.column_id = Some(column_id.to_string());
            self.direction = direction;
        } else {
            self.clear();
        }
    }

    /// Advances the cycle for `column_id` and returns the new direction.
    pub fn toggle(&mut self, column_id: &str) -> SortDirection {
        let next = self.next_for(column_id);
        self.apply(column_id, next);
        log::debug!("sort {column_id} -> {next:?}");
        next
    }

    pub fn clear(&mut self) {
        self.column_id = None;
        self.direction = SortDirection::None;
    }

    pub fn direction_for(&self, column_id: &str) -> SortDirection {
        match self.column_id.as_deref() {
            Some(active) if active == column_id => self.direction,
            _ => SortDirection::None,
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.column_id.is_some() && self.direction.is_active()
    }
}

/// Stable-sorts `indices` (positions into `rows`) by the active column.
/// Unknown columns and an inactive sort leave the order untouched.
pub fn sort_indices<T: Record>(
    rows: &[T],
    indices: &mut [usize],
    columns: &[ColumnDef<T>],
    state: &SortState,
) {
    let Some(column_id) = state.column_id.as_deref() else {
        return;
    };
    let Some(column) = column::find_column(columns, column_id) else {
        return;
    };

    match state.direction {
        SortDirection::None => {}
        SortDirection::Asc => indices.sort_by(|a, b| column.compare(&rows[*a], &rows[*b])),
        SortDirection::Desc => indices.sort_by(|a, b| column.compare(&rows[*b], &rows[*a])),
    }
}

/// Returns row positions in display order.
pub fn sort_rows<T: Record>(rows: &[T], columns: &[ColumnDef<T>], state: &SortState) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    sort_indices(rows, &mut indices, columns, state);
    indices
}

pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => compare_value_pair(left, right),
    }
}

fn compare_value_pair(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        _ => type_rank(left)
            .cmp(&type_rank(right))
            .then_with(|| data_model::display_value(left).cmp(&data_model::display_value(right))),
    }
}

fn compare_numbers(left: &Number, right: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        return a.cmp(&b);
    }
    let left = left.as_f64().unwrap_or(f64::NAN);
    let right = right.as_f64().unwrap_or(f64::NAN);
    left.partial_cmp(&right).unwrap_or(Ordering::Equal)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_across_representations() {
        let neg: Number = (-3i64).into();
        let big: Number = u64::MAX.into();
        let half = Number::from_f64(0.5).unwrap();
        assert_eq!(compare_numbers(&neg, &big), Ordering::Less);
        assert_eq!(compare_numbers(&half, &neg), Ordering::Greater);
    }

    #[test]
    fn mixed_types_order_by_rank() {
        let null = Value::Null;
        let text = Value::String("a".to_string());
        assert_eq!(compare_value_pair(&null, &text), Ordering::Less);
    }
}
