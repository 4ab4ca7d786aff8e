mod common;

use std::sync::Arc;

use serde_json::json;

use tabula::io::store::{self, KeyValueStore, MemoryStore};
use tabula::state::data_model::Row;
use tabula::state::grouping::{self, GroupBy, GroupState};

#[test]
fn test_groups_in_first_seen_order() {
    let rows = common::songs();
    let state = GroupState::default();
    let groups = state.grouped_data(&rows, &GroupBy::Column("artist".to_string()));

    assert_eq!(
        grouping::group_keys(&groups),
        common::ids(&["Sola", "The Lanterns", "Kid Meridian"])
    );
    assert_eq!(groups[0].indices, vec![0, 2]);
    assert_eq!(groups[1].indices, vec![1, 4]);
    assert_eq!(groups[2].len(), 1);
    assert!(groups.iter().all(|group| group.is_expanded));
}

#[test]
fn test_group_sizes_add_up() {
    let rows = common::songs();
    let groups = GroupState::default().grouped_data(&rows, &GroupBy::Column("status".to_string()));
    let total: usize = groups.iter().map(|group| group.len()).sum();
    assert_eq!(total, rows.len());
}

#[test]
fn test_groups_partition_rows_with_unique_labels() {
    let rows = common::songs();
    for field in ["artist", "status", "released", "streams"] {
        let groups = GroupState::default().grouped_data(&rows, &GroupBy::Column(field.to_string()));

        let mut seen: Vec<usize> = groups.iter().flat_map(|g| g.indices.iter().copied()).collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4], "grouped by {field}");

        let mut labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), groups.len(), "grouped by {field}");
    }
}

#[test]
fn test_missing_key_groups_under_dash() {
    let rows = common::songs();
    let by_release = GroupBy::Column("released".to_string());
    let groups = GroupState::default().grouped_data(&rows, &by_release);
    let dash = groups.iter().find(|group| group.key == "-").unwrap();
    assert_eq!(dash.indices, vec![4]);
}

#[test]
fn test_group_by_function() {
    let rows = common::songs();
    let by_reach = GroupBy::func(|row: &Row| {
        let streams = row.get("streams").and_then(|v| v.as_i64()).unwrap_or(0);
        if streams >= 1000 { "hit" } else { "" }.to_string()
    });
    let groups = GroupState::default().grouped_data(&rows, &by_reach);
    assert_eq!(grouping::group_keys(&groups), common::ids(&["-", "hit"]));
    assert_eq!(groups[1].indices, vec![1, 3]);
}

#[test]
fn test_toggle_and_visible_items() {
    let rows = common::songs();
    let by_artist = GroupBy::Column("artist".to_string());
    let mut state = GroupState::default();
    state.toggle_group("Sola");
    assert!(!state.is_expanded("Sola"));

    let groups = state.grouped_data(&rows, &by_artist);
    assert!(!groups[0].is_expanded);
    let visible = grouping::visible_items(&groups);
    assert_eq!(visible.len(), 3);
    assert!(visible.iter().all(|row| row["artist"] != json!("Sola")));

    state.toggle_group("Sola");
    assert!(state.is_expanded("Sola"));
}

#[test]
fn test_initially_collapsed_and_expand_all() {
    let rows = common::songs();
    let by_artist = GroupBy::Column("artist".to_string());
    let mut state = GroupState::new(false);
    let groups = state.grouped_data(&rows, &by_artist);
    assert!(grouping::visible_items(&groups).is_empty());

    let keys = grouping::group_keys(&groups);
    state.expand_all(keys.iter().map(String::as_str));
    assert!(keys.iter().all(|key| state.is_expanded(key)));

    state.collapse_all(keys.iter().map(String::as_str));
    assert!(keys.iter().all(|key| !state.is_expanded(key)));
}

#[test]
fn test_grouped_indices_keep_subset_order() {
    let rows = common::songs();
    let groups = GroupState::default().grouped_indices(
        &rows,
        vec![4, 2, 1, 0],
        &GroupBy::Column("artist".to_string()),
    );
    assert_eq!(grouping::group_keys(&groups), common::ids(&["The Lanterns", "Sola"]));
    assert_eq!(groups[0].indices, vec![4, 1]);
    assert_eq!(groups[1].indices, vec![2, 0]);
}

#[test]
fn test_expand_state_persists() {
    let memory = Arc::new(MemoryStore::new());
    let shared: store::SharedStore = memory.clone();

    let mut state = GroupState::persisted(true, shared.clone(), "songs");
    state.toggle_group("Sola");
    assert!(memory.get("table-groups-songs").is_some());

    let restored = GroupState::persisted(true, shared, "songs");
    assert!(!restored.is_expanded("Sola"));
    assert!(restored.is_expanded("Kid Meridian"));
}
