mod common;

use std::sync::Arc;

use serde_json::json;

use tabula::io::store::{KeyValueStore, MemoryStore, SharedStore};
use tabula::state::column::ColumnDef;
use tabula::state::config::{Density, TableConfig};
use tabula::state::data_model::Row;
use tabula::state::filter::{FilterType, FilterValue};
use tabula::state::grouping::GroupBy;
use tabula::state::sort::SortDirection;
use tabula::state::table_state::{TableBody, TableState};

fn columns() -> Vec<ColumnDef<Row>> {
    vec![
        ColumnDef::new("title").header("Title").sortable().filterable(FilterType::Text),
        ColumnDef::new("artist").header("Artist").sortable().filterable(FilterType::Select),
        ColumnDef::new("status").filterable(FilterType::MultiSelect),
        ColumnDef::new("streams").sortable().filterable(FilterType::NumberRange),
    ]
}

fn persisted_config() -> TableConfig {
    TableConfig {
        persistence_key: Some("songs".to_string()),
        persist_filters: true,
        ..TableConfig::default()
    }
}

fn flat(body: &TableBody<'_, Row>) -> Vec<usize> {
    match body {
        TableBody::Flat(indices) => indices.clone(),
        TableBody::Grouped(_) => panic!("expected a flat body"),
    }
}

#[test]
fn test_view_without_state_is_input_order() {
    let rows = common::songs();
    let state = TableState::new(columns());
    let view = state.view(&rows);
    assert_eq!(flat(&view.body), vec![0, 1, 2, 3, 4]);
    assert_eq!(view.total_rows, 5);
    assert_eq!(view.matching_rows, 5);
    let ids: Vec<&str> = view.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["title", "artist", "status", "streams"]);
}

#[test]
fn test_filter_then_sort() {
    let rows = common::songs();
    let mut state = TableState::new(columns());
    let statuses = vec!["released".to_string(), "draft".to_string()];
    state.on_filter("status", FilterValue::MultiSelect(statuses));
    state.on_sort("streams");
    state.on_sort("streams");
    assert_eq!(state.sort().direction_for("streams"), SortDirection::Desc);

    let view = state.view(&rows);
    assert_eq!(flat(&view.body), vec![1, 3, 0, 4]);
    assert_eq!(view.matching_rows, 4);
}

#[test]
fn test_filtered_and_sorted_rows_are_a_subset() {
    let rows = common::songs();
    let mut state = TableState::new(columns());
    state.on_filter("title", FilterValue::Text("e".to_string()));
    state.on_sort("title");

    let view = state.view(&rows);
    let shown = flat(&view.body);
    assert!(shown.iter().all(|idx| *idx < rows.len()));
    let mut unique = shown.clone();
    unique.dedup();
    assert_eq!(unique.len(), shown.len());
    let titles: Vec<&str> = shown.iter().map(|idx| rows[*idx]["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Afterglow", "Echoes", "Hello", "Night Drive", "Paper Boats"]);
}

#[test]
fn test_no_matches_is_empty_view() {
    let rows = common::songs();
    let mut state = TableState::new(columns());
    state.on_filter("title", FilterValue::Text("zzz".to_string()));
    let view = state.view(&rows);
    assert!(view.is_empty());
    assert!(view.visible_indices().is_empty());
}

#[test]
fn test_filters_on_unknown_columns_are_ignored() {
    let mut state = TableState::new(columns());
    state.on_filter("missing", FilterValue::Text("x".to_string()));
    assert_eq!(state.filters().active_count(), 0);
}

#[test]
fn test_clear_filter_and_toggle_option() {
    let mut state = TableState::new(columns());
    state.toggle_filter_option("status", "draft");
    state.on_filter("title", FilterValue::Text("o".to_string()));
    assert_eq!(state.filters().active_count(), 2);

    state.on_clear_filter("title");
    assert_eq!(state.filters().active_count(), 1);
    state.clear_filters();
    assert_eq!(state.filters().active_count(), 0);
}

#[test]
fn test_grouped_view_respects_filters_and_sort() {
    let rows = common::songs();
    let mut state = TableState::new(columns());
    state.set_group_by(Some(GroupBy::Column("artist".to_string())));
    state.on_sort("streams");
    let statuses = vec!["draft".to_string(), "scheduled".to_string()];
    state.on_filter("status", FilterValue::MultiSelect(statuses));

    let view = state.view(&rows);
    let TableBody::Grouped(groups) = &view.body else {
        panic!("expected groups");
    };
    let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["The Lanterns", "Sola"]);
    assert_eq!(groups[0].indices, vec![4]);
    assert_eq!(groups[1].indices, vec![0, 2]);
    let total: usize = groups.iter().map(|g| g.len()).sum();
    assert_eq!(total, view.matching_rows);
}

#[test]
fn test_collapse_all_hides_rows_but_keeps_headers() {
    let rows = common::songs();
    let mut state = TableState::new(columns());
    state.set_group_by(Some(GroupBy::Column("artist".to_string())));
    state.collapse_all(&rows);

    let view = state.view(&rows);
    assert!(view.visible_indices().is_empty());
    match &view.body {
        TableBody::Grouped(groups) => assert_eq!(groups.len(), 3),
        TableBody::Flat(_) => panic!("expected groups"),
    }

    state.toggle_group("Sola");
    assert_eq!(state.view(&rows).visible_indices(), vec![0, 2]);

    state.expand_all(&rows);
    assert_eq!(state.view(&rows).visible_indices().len(), 5);
}

#[test]
fn test_hidden_and_moved_columns_in_view() {
    let rows = common::songs();
    let mut state = TableState::new(columns());
    assert!(state.move_column("streams", "title"));
    assert!(state.toggle_column_visibility("status"));

    let view = state.view(&rows);
    let ids: Vec<&str> = view.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["streams", "title", "artist"]);

    state.reset_column_order();
    assert_eq!(state.visible_columns().len(), 4);
}

#[test]
fn test_set_columns_drops_stale_state() {
    let mut state = TableState::new(columns());
    state.on_sort("streams");
    state.on_filter("streams", FilterValue::NumberRange { min: Some(1.0), max: None });
    state.on_filter("title", FilterValue::Text("a".to_string()));

    let mut fewer = columns();
    fewer.retain(|c| c.id != "streams");
    state.set_columns(fewer);

    assert!(!state.sort().is_sorted());
    assert_eq!(state.filters().active_count(), 1);
    assert_eq!(state.layout().order().len(), 3);
}

#[test]
fn test_state_survives_reload_through_store() {
    let memory = Arc::new(MemoryStore::new());
    let shared: SharedStore = memory.clone();
    let config = persisted_config();
    let rows = common::songs();

    let mut state = TableState::with_config(columns(), &config, Some(shared.clone()));
    state.move_column("artist", "title");
    state.on_filter("title", FilterValue::Text("o".to_string()));
    state.set_group_by(Some(GroupBy::Column("artist".to_string())));
    state.toggle_group("Sola");

    assert!(memory.get("table-columns-songs").is_some());
    assert!(memory.get("table-groups-songs").is_some());
    assert!(memory.get("table-filters-songs").is_some());

    let mut restored = TableState::with_config(columns(), &config, Some(shared));
    assert_eq!(restored.layout().order()[0], "artist");
    assert_eq!(restored.filters().get("title"), Some(&FilterValue::Text("o".to_string())));
    assert!(!restored.groups().is_expanded("Sola"));

    restored.set_group_by(Some(GroupBy::Column("artist".to_string())));
    assert_eq!(restored.view(&rows).visible_indices(), vec![1, 4, 3]);
}

#[test]
fn test_filters_not_persisted_unless_asked() {
    let memory = Arc::new(MemoryStore::new());
    let shared: SharedStore = memory.clone();
    let config = TableConfig {
        persist_filters: false,
        ..persisted_config()
    };

    let mut state = TableState::with_config(columns(), &config, Some(shared));
    state.on_filter("title", FilterValue::Text("o".to_string()));
    assert_eq!(memory.get("table-filters-songs"), None);
}

#[test]
fn test_no_key_means_no_persistence() {
    let memory = Arc::new(MemoryStore::new());
    let shared: SharedStore = memory.clone();
    let mut state = TableState::with_config(columns(), &TableConfig::default(), Some(shared));
    state.move_column("artist", "title");
    assert!(memory.is_empty());
}

#[test]
fn test_broken_store_falls_back_to_defaults() {
    let memory = Arc::new(MemoryStore::with_quota(0));
    let shared: SharedStore = memory.clone();
    let mut state = TableState::with_config(columns(), &persisted_config(), Some(shared));
    assert!(state.move_column("artist", "title"));
    assert_eq!(state.layout().order()[0], "artist");
    assert!(memory.is_empty());
}

#[test]
fn test_config_from_json() {
    let config = TableConfig::from_json(r#"{"density": "compact", "virtualize": true}"#);
    assert_eq!(config.density, Density::Compact);
    assert!(config.virtualize);
    assert_eq!(config.overscan, 5);

    let options = config.virtualizer_options(100);
    assert_eq!(options.estimate_size, 32.0);
    assert!(options.enabled);
    assert_eq!(options.count, 100);

    assert_eq!(TableConfig::from_json("{broken"), TableConfig::default());
    assert_eq!(json!(Density::Comfortable), json!("comfortable"));
}
