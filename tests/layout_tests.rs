mod common;

use std::sync::Arc;

use tabula::io::store::{KeyValueStore, MemoryStore, SharedStore};
use tabula::state::layout::{self, ColumnLayout};

fn is_permutation(order: &[String], ids: &[String]) -> bool {
    let mut a = order.to_vec();
    let mut b = ids.to_vec();
    a.sort();
    b.sort();
    a == b
}

#[test]
fn test_move_forward_and_backward() {
    let order = common::ids(&["a", "b", "c", "d"]);
    assert_eq!(
        layout::move_id(&order, "a", "c"),
        Some(common::ids(&["b", "c", "a", "d"]))
    );
    assert_eq!(
        layout::move_id(&order, "d", "b"),
        Some(common::ids(&["a", "d", "b", "c"]))
    );
}

#[test]
fn test_move_rejects_unknown_and_same_ids() {
    let order = common::ids(&["a", "b"]);
    assert_eq!(layout::move_id(&order, "a", "a"), None);
    assert_eq!(layout::move_id(&order, "a", "z"), None);
    assert_eq!(layout::move_id(&order, "z", "a"), None);
}

#[test]
fn test_any_sequence_of_moves_keeps_a_permutation() {
    let ids = common::ids(&["a", "b", "c", "d", "e"]);
    let mut layout = ColumnLayout::new(ids.clone());
    let moves = [("a", "e"), ("c", "a"), ("e", "b"), ("b", "b"), ("x", "a"), ("d", "c")];
    for (from, to) in moves {
        layout.move_column(from, to);
        assert!(is_permutation(layout.order(), &ids));
    }

    layout.reset();
    assert_eq!(layout.order(), ids.as_slice());
}

#[test]
fn test_reconcile_appends_new_and_drops_removed() {
    let stored = common::ids(&["b", "a"]);
    let current = common::ids(&["a", "b", "c"]);
    assert_eq!(layout::reconcile(&stored, &current), common::ids(&["b", "a", "c"]));

    let stored = common::ids(&["c", "x", "a"]);
    let current = common::ids(&["a", "c"]);
    assert_eq!(layout::reconcile(&stored, &current), common::ids(&["c", "a"]));
}

#[test]
fn test_visibility_toggle() {
    let mut layout = ColumnLayout::new(common::ids(&["a", "b", "c"]));
    assert!(layout.toggle_visibility("b"));
    assert!(!layout.is_visible("b"));
    assert_eq!(layout.visible_ids(), common::ids(&["a", "c"]));
    assert_eq!(layout.order().len(), 3);

    assert!(!layout.toggle_visibility("missing"));
    assert!(layout.toggle_visibility("b"));
    assert!(layout.is_visible("b"));
}

#[test]
fn test_move_then_reset_restores_defaults() {
    let memory = Arc::new(MemoryStore::new());
    let shared: SharedStore = memory.clone();
    let defaults = common::ids(&["a", "b", "c"]);

    let mut layout = ColumnLayout::persisted(defaults.clone(), shared.clone(), "songs");
    assert!(layout.move_column("c", "a"));
    layout.toggle_visibility("b");
    assert_eq!(layout.order(), common::ids(&["c", "a", "b"]).as_slice());
    assert!(memory.get("table-columns-songs").is_some());

    layout.reset();
    assert_eq!(layout.order(), defaults.as_slice());
    assert!(layout.hidden().is_empty());
    assert_eq!(memory.get("table-columns-songs"), None);

    let reloaded = ColumnLayout::persisted(defaults.clone(), shared, "songs");
    assert_eq!(reloaded.order(), defaults.as_slice());
}

#[test]
fn test_persisted_order_is_reconciled_on_load() {
    let memory = Arc::new(MemoryStore::new());
    let shared: SharedStore = memory.clone();

    let mut layout = ColumnLayout::persisted(common::ids(&["a", "b"]), shared.clone(), "songs");
    layout.move_column("b", "a");
    layout.toggle_visibility("a");

    let grown = ColumnLayout::persisted(common::ids(&["a", "b", "c"]), shared.clone(), "songs");
    assert_eq!(grown.order(), common::ids(&["b", "a", "c"]).as_slice());
    assert!(!grown.is_visible("a"));

    let shrunk = ColumnLayout::persisted(common::ids(&["b", "c"]), shared, "songs");
    assert_eq!(shrunk.order(), common::ids(&["b", "c"]).as_slice());
    assert!(shrunk.hidden().is_empty());
}

#[test]
fn test_corrupt_record_falls_back_to_defaults() {
    let memory = Arc::new(MemoryStore::new());
    memory.set("table-columns-songs", "{not json").unwrap();
    let shared: SharedStore = memory.clone();

    let layout = ColumnLayout::persisted(common::ids(&["a", "b"]), shared, "songs");
    assert_eq!(layout.order(), common::ids(&["a", "b"]).as_slice());
}

#[test]
fn test_sync_keeps_known_positions() {
    let mut layout = ColumnLayout::new(common::ids(&["a", "b", "c"]));
    layout.move_column("c", "a");
    layout.toggle_visibility("b");
    layout.sync(common::ids(&["a", "c", "d"]));
    assert_eq!(layout.order(), common::ids(&["c", "a", "d"]).as_slice());
    assert!(layout.hidden().is_empty());
    assert_eq!(layout.defaults(), common::ids(&["a", "c", "d"]).as_slice());
}
