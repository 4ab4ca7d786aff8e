use crate::io::store::{self, SharedStore};
use crate::state::column::{self, ColumnDef};
use crate::state::config::TableConfig;
use crate::state::data_model::Record;
use crate::state::filter::{self, FilterState, FilterValue};
use crate::state::grouping::{self, Group, GroupBy, GroupState};
use crate::state::layout::ColumnLayout;
use crate::state::sort::{self, SortDirection, SortState};

/// Rows after filtering, sorting and grouping.
#[derive(Debug, PartialEq)]
pub enum TableBody<'a, T> {
    /// Positions into the row slice, in display order.
    Flat(Vec<usize>),
    Grouped(Vec<Group<'a, T>>),
}

#[derive(Debug, PartialEq)]
pub struct TableView<'a, T> {
    pub columns: Vec<&'a ColumnDef<T>>,
    pub body: TableBody<'a, T>,
    pub total_rows: usize,
    pub matching_rows: usize,
}

impl<T> TableView<'_, T> {
    /// No row survived filtering.
    pub fn is_empty(&self) -> bool {
        self.matching_rows == 0
    }

    /// Row positions to render, skipping collapsed groups.
    pub fn visible_indices(&self) -> Vec<usize> {
        match &self.body {
            TableBody::Flat(indices) => indices.clone(),
            TableBody::Grouped(groups) => groups
                .iter()
                .filter(|group| group.is_expanded)
                .flat_map(|group| group.indices.iter().copied())
                .collect(),
        }
    }
}

/// Presentation state of one table: sort, filters, column layout and
/// group expansion. Rows are never stored here; they are passed to
/// [`TableState::view`] on every render.
pub struct TableState<T> {
    columns: Vec<ColumnDef<T>>,
    sort: SortState,
    filters: FilterState,
    layout: ColumnLayout,
    groups: GroupState,
    group_by: Option<GroupBy<T>>,
    filter_storage: Option<(SharedStore, String)>,
}

impl<T: Record> TableState<T> {
    pub fn new(columns: Vec<ColumnDef<T>>) -> Self {
        let layout = ColumnLayout::new(column::column_ids(&columns));
        Self {
            columns,
            sort: SortState::default(),
            filters: FilterState::default(),
            layout,
            groups: GroupState::default(),
            group_by: None,
            filter_storage: None,
        }
    }

    /// Builds a table whose layout, group expansion and (optionally)
    /// filters survive reloads through `store`.
    pub fn with_config(
        columns: Vec<ColumnDef<T>>,
        config: &TableConfig,
        store: Option<SharedStore>,
    ) -> Self {
        let mut state = Self::new(columns);
        state.groups = GroupState::new(config.initial_expanded);

        let (Some(store), Some(key)) = (store, config.persistence_key.as_deref()) else {
            return state;
        };

        let ids = column::column_ids(&state.columns);
        state.layout = ColumnLayout::persisted(ids.clone(), store.clone(), key);
        state.groups = GroupState::persisted(config.initial_expanded, store.clone(), key);
        if config.persist_filters {
            let filters_key = store::filters_key(key);
            if let Some(mut filters) =
                store::load_json_record::<FilterState>(store.as_ref(), &filters_key)
            {
                filters.retain_columns(&ids);
                state.filters = filters;
            }
            state.filter_storage = Some((store, filters_key));
        }
        state
    }

    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDef<T>> {
        column::find_column(&self.columns, id)
    }

    /// Swaps in a new column set, keeping order, sort and filters for ids
    /// that survive.
    pub fn set_columns(&mut self, columns: Vec<ColumnDef<T>>) {
        let ids = column::column_ids(&columns);
        self.layout.sync(ids.clone());
        self.filters.retain_columns(&ids);
        if let Some(active) = self.sort.column_id.as_deref() {
            if !ids.iter().any(|id| id == active) {
                self.sort.clear();
            }
        }
        self.columns = columns;
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Header click. Non-sortable and unknown columns are ignored.
    pub fn on_sort(&mut self, column_id: &str) -> Option<SortDirection> {
        let sortable = self.column(column_id).map(|c| c.sortable).unwrap_or(false);
        if !sortable {
            return None;
        }
        Some(self.sort.toggle(column_id))
    }

    pub fn set_sort(&mut self, column_id: &str, direction: SortDirection) {
        self.sort.apply(column_id, direction);
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn on_filter(&mut self, column_id: &str, value: FilterValue) {
        if self.column(column_id).is_none() {
            return;
        }
        self.filters.set(column_id, value);
        self.persist_filters();
    }

    pub fn on_clear_filter(&mut self, column_id: &str) {
        self.filters.clear(column_id);
        self.persist_filters();
    }

    pub fn toggle_filter_option(&mut self, column_id: &str, option: &str) {
        self.filters.toggle_option(column_id, option);
        self.persist_filters();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear_all();
        self.persist_filters();
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn move_column(&mut self, active_id: &str, over_id: &str) -> bool {
        self.layout.move_column(active_id, over_id)
    }

    pub fn toggle_column_visibility(&mut self, id: &str) -> bool {
        self.layout.toggle_visibility(id)
    }

    pub fn reset_column_order(&mut self) {
        self.layout.reset();
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDef<T>> {
        self.layout.visible_columns(&self.columns)
    }

    pub fn group_by(&self) -> Option<&GroupBy<T>> {
        self.group_by.as_ref()
    }

    pub fn set_group_by(&mut self, group_by: Option<GroupBy<T>>) {
        self.group_by = group_by;
    }

    pub fn groups(&self) -> &GroupState {
        &self.groups
    }

    pub fn toggle_group(&mut self, key: &str) {
        self.groups.toggle_group(key);
    }

    /// Expands every group present in `rows`.
    pub fn expand_all(&mut self, rows: &[T]) {
        let keys = self.group_keys(rows);
        self.groups.expand_all(keys.iter().map(String::as_str));
    }

    pub fn collapse_all(&mut self, rows: &[T]) {
        let keys = self.group_keys(rows);
        self.groups.collapse_all(keys.iter().map(String::as_str));
    }

    fn group_keys(&self, rows: &[T]) -> Vec<String> {
        match &self.group_by {
            Some(group_by) => grouping::group_keys(&self.groups.grouped_data(rows, group_by)),
            None => Vec::new(),
        }
    }

    /// Runs filter, then sort, then grouping over `rows`.
    pub fn view<'a>(&'a self, rows: &'a [T]) -> TableView<'a, T> {
        let mut indices = filter::filter_rows(rows, &self.columns, &self.filters);
        sort::sort_indices(rows, &mut indices, &self.columns, &self.sort);
        let matching_rows = indices.len();

        let body = match &self.group_by {
            Some(group_by) => {
                TableBody::Grouped(self.groups.grouped_indices(rows, indices, group_by))
            }
            None => TableBody::Flat(indices),
        };

        TableView {
            columns: self.visible_columns(),
            body,
            total_rows: rows.len(),
            matching_rows,
        }
    }

    fn persist_filters(&self) {
        if let Some((store, key)) = &self.filter_storage {
            store::save_json_record(store.as_ref(), key, &self.filters);
        }
    }
}

impl<T> Clone for TableState<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            sort: self.sort.clone(),
            filters: self.filters.clone(),
            layout: self.layout.clone(),
            groups: self.groups.clone(),
            group_by: self.group_by.clone(),
            filter_storage: self.filter_storage.clone(),
        }
    }
}

impl<T> PartialEq for TableState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
            && self.sort == other.sort
            && self.filters == other.filters
            && self.layout == other.layout
            && self.groups == other.groups
            && self.group_by == other.group_by
    }
}

impl<T> std::fmt::Debug for TableState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableState")
            .field("columns", &self.columns)
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("layout", &self.layout)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}
