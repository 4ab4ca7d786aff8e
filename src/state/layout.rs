use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::io::store::{self, SharedStore};
use crate::state::column::ColumnDef;

/// What gets written under `table-columns-<key>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredLayout {
    #[serde(default)]
    order: Vec<String>,
    #[serde(default)]
    hidden: BTreeSet<String>,
}

/// Display order and visibility of a table's columns.
///
/// `order` is always a permutation of exactly the column ids last supplied
/// through [`ColumnLayout::new`] or [`ColumnLayout::sync`].
#[derive(Clone)]
pub struct ColumnLayout {
    defaults: Vec<String>,
    order: Vec<String>,
    hidden: BTreeSet<String>,
    storage: Option<(SharedStore, String)>,
}

impl ColumnLayout {
    pub fn new(default_order: Vec<String>) -> Self {
        Self {
            order: default_order.clone(),
            defaults: default_order,
            hidden: BTreeSet::new(),
            storage: None,
        }
    }

    /// Restores the layout saved under `key`, reconciled against the
    /// current columns.
    pub fn persisted(default_order: Vec<String>, store: SharedStore, key: &str) -> Self {
        let storage_key = store::columns_key(key);
        let stored: Option<StoredLayout> = store::load_json_record(store.as_ref(), &storage_key);
        let mut layout = Self::new(default_order);
        if let Some(stored) = stored {
            layout.order = reconcile(&stored.order, &layout.defaults);
            layout.hidden = stored
                .hidden
                .into_iter()
                .filter(|id| layout.defaults.contains(id))
                .collect();
        }
        layout.storage = Some((store, storage_key));
        layout
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    pub fn hidden(&self) -> &BTreeSet<String> {
        &self.hidden
    }

    pub fn is_visible(&self, id: &str) -> bool {
        !self.hidden.contains(id)
    }

    pub fn visible_ids(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| self.is_visible(id))
            .cloned()
            .collect()
    }

    /// Columns in display order, hidden ones left out.
    pub fn visible_columns<'a, T>(&self, columns: &'a [ColumnDef<T>]) -> Vec<&'a ColumnDef<T>> {
        self.order
            .iter()
            .filter(|id| self.is_visible(id))
            .filter_map(|id| columns.iter().find(|column| &column.id == id))
            .collect()
    }

    /// Moves `active_id` to the slot held by `over_id`. Returns false when
    /// either id is unknown or they are the same.
    pub fn move_column(&mut self, active_id: &str, over_id: &str) -> bool {
        let Some(next) = move_id(&self.order, active_id, over_id) else {
            return false;
        };
        self.order = next;
        log::debug!("column {active_id} moved over {over_id}");
        self.persist();
        true
    }

    pub fn toggle_visibility(&mut self, id: &str) -> bool {
        if !self.order.iter().any(|known| known == id) {
            return false;
        }
        if !self.hidden.remove(id) {
            self.hidden.insert(id.to_string());
        }
        self.persist();
        true
    }

    /// Back to the default order with every column shown. The persisted
    /// record is removed.
    pub fn reset(&mut self) {
        self.order = self.defaults.clone();
        self.hidden.clear();
        if let Some((store, key)) = &self.storage {
            store::remove_record(store.as_ref(), key);
        }
    }

    /// Adopts a new column set: known ids keep their place, new ids are
    /// appended, vanished ids are dropped.
    pub fn sync(&mut self, default_order: Vec<String>) {
        if default_order == self.defaults {
            return;
        }
        self.order = reconcile(&self.order, &default_order);
        self.hidden.retain(|id| default_order.contains(id));
        self.defaults = default_order;
    }

    fn persist(&self) {
        if let Some((store, key)) = &self.storage {
            let record = StoredLayout {
                order: self.order.clone(),
                hidden: self.hidden.clone(),
            };
            store::save_json_record(store.as_ref(), key, &record);
        }
    }
}

impl std::fmt::Debug for ColumnLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnLayout")
            .field("order", &self.order)
            .field("hidden", &self.hidden)
            .field("key", &self.storage.as_ref().map(|(_, key)| key))
            .finish()
    }
}

impl PartialEq for ColumnLayout {
    fn eq(&self, other: &Self) -> bool {
        self.defaults == other.defaults && self.order == other.order && self.hidden == other.hidden
    }
}

/// Stored ids still present, in stored order, followed by current ids the
/// stored order lacks.
pub fn reconcile(stored: &[String], current: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::with_capacity(current.len());
    for id in stored {
        if current.contains(id) && !order.contains(id) {
            order.push(id.clone());
        }
    }
    for id in current {
        if !order.contains(id) {
            order.push(id.clone());
        }
    }
    order
}

/// Array move of `from` into the position of `to`.
pub fn move_id(order: &[String], from: &str, to: &str) -> Option<Vec<String>> {
    let from_idx = order.iter().position(|id| id == from)?;
    let to_idx = order.iter().position(|id| id == to)?;
    if from_idx == to_idx {
        return None;
    }
    let mut next = order.to_vec();
    let moved = next.remove(from_idx);
    next.insert(to_idx, moved);
    Some(next)
}
