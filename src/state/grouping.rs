use std::collections::BTreeMap;
use std::sync::Arc;

use crate::io::store::{self, SharedStore};
use crate::state::data_model::{self, Record, EMPTY_CELL};

pub type GroupKeyFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// What rows are grouped by: a row field or a key function.
pub enum GroupBy<T> {
    Column(String),
    Fn(GroupKeyFn<T>),
}

impl<T> Clone for GroupBy<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Column(key) => Self::Column(key.clone()),
            Self::Fn(f) => Self::Fn(Arc::clone(f)),
        }
    }
}

impl<T> PartialEq for GroupBy<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Column(a), Self::Column(b)) => a == b,
            (Self::Fn(a), Self::Fn(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: Record> GroupBy<T> {
    pub fn func(f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self::Fn(Arc::new(f))
    }

    pub fn key_for(&self, row: &T) -> String {
        match self {
            Self::Column(column) => data_model::cell_text(row.field(column).as_ref()),
            Self::Fn(f) => {
                let key = f(row);
                if key.is_empty() {
                    EMPTY_CELL.to_string()
                } else {
                    key
                }
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Group<'a, T> {
    pub key: String,
    pub label: String,
    pub items: Vec<&'a T>,
    /// Positions of `items` in the row slice they came from.
    pub indices: Vec<usize>,
    pub is_expanded: bool,
}

impl<T> Group<'_, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Per-group expand flags, independent of the rows themselves.
#[derive(Clone)]
pub struct GroupState {
    expanded: BTreeMap<String, bool>,
    initial_expanded: bool,
    storage: Option<(SharedStore, String)>,
}

impl Default for GroupState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GroupState {
    pub fn new(initial_expanded: bool) -> Self {
        Self {
            expanded: BTreeMap::new(),
            initial_expanded,
            storage: None,
        }
    }

    /// Restores the expand map saved under `key`.
    pub fn persisted(initial_expanded: bool, store: SharedStore, key: &str) -> Self {
        let storage_key = store::groups_key(key);
        let expanded = store::load_json_record(store.as_ref(), &storage_key).unwrap_or_default();
        Self {
            expanded,
            initial_expanded,
            storage: Some((store, storage_key)),
        }
    }

    pub fn initial_expanded(&self) -> bool {
        self.initial_expanded
    }

    pub fn set_initial_expanded(&mut self, expanded: bool) {
        self.initial_expanded = expanded;
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded
            .get(key)
            .copied()
            .unwrap_or(self.initial_expanded)
    }

    pub fn toggle_group(&mut self, key: &str) {
        let next = !self.is_expanded(key);
        self.expanded.insert(key.to_string(), next);
        log::debug!("group {key} expanded={next}");
        self.persist();
    }

    pub fn expand_all<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>) {
        self.set_all(keys, true);
    }

    pub fn collapse_all<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>) {
        self.set_all(keys, false);
    }

    fn set_all<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>, expanded: bool) {
        for key in keys {
            self.expanded.insert(key.to_string(), expanded);
        }
        self.persist();
    }

    /// Partitions `rows` into groups in first-seen key order.
    pub fn grouped_data<'a, T: Record>(
        &self,
        rows: &'a [T],
        group_by: &GroupBy<T>,
    ) -> Vec<Group<'a, T>> {
        self.grouped_indices(rows, 0..rows.len(), group_by)
    }

    /// Like [`GroupState::grouped_data`] over a subset of `rows`, keeping
    /// the order of `indices` inside each group.
    pub fn grouped_indices<'a, T: Record>(
        &self,
        rows: &'a [T],
        indices: impl IntoIterator<Item = usize>,
        group_by: &GroupBy<T>,
    ) -> Vec<Group<'a, T>> {
        let mut groups: Vec<Group<'a, T>> = Vec::new();
        let mut slots: BTreeMap<String, usize> = BTreeMap::new();

        for idx in indices {
            let row = &rows[idx];
            let key = group_by.key_for(row);
            let slot = match slots.get(&key) {
                Some(slot) => *slot,
                None => {
                    slots.insert(key.clone(), groups.len());
                    groups.push(Group {
                        label: key.clone(),
                        is_expanded: self.is_expanded(&key),
                        key,
                        items: Vec::new(),
                        indices: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            groups[slot].items.push(row);
            groups[slot].indices.push(idx);
        }

        groups
    }

    fn persist(&self) {
        if let Some((store, key)) = &self.storage {
            store::save_json_record(store.as_ref(), key, &self.expanded);
        }
    }
}

impl std::fmt::Debug for GroupState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupState")
            .field("expanded", &self.expanded)
            .field("initial_expanded", &self.initial_expanded)
            .finish_non_exhaustive()
    }
}

impl PartialEq for GroupState {
    fn eq(&self, other: &Self) -> bool {
        self.expanded == other.expanded && self.initial_expanded == other.initial_expanded
    }
}

/// Rows of expanded groups, in group order.
pub fn visible_items<'a, T>(groups: &[Group<'a, T>]) -> Vec<&'a T> {
    groups
        .iter()
        .filter(|group| group.is_expanded)
        .flat_map(|group| group.items.iter().copied())
        .collect()
}

pub fn group_keys<T>(groups: &[Group<'_, T>]) -> Vec<String> {
    groups.iter().map(|group| group.key.clone()).collect()
}
