use std::sync::Arc;

use serde_json::json;

use tabula::io::store::{self, FileStore, KeyValueStore, MemoryStore, StoreError};

#[test]
fn test_key_helpers() {
    assert_eq!(store::columns_key("songs"), "table-columns-songs");
    assert_eq!(store::groups_key("songs"), "table-groups-songs");
    assert_eq!(store::filters_key("songs"), "table-filters-songs");
}

#[test]
fn test_memory_store_roundtrip() {
    let memory = MemoryStore::new();
    assert!(memory.is_empty());
    memory.set("a", "1").unwrap();
    assert_eq!(memory.get("a"), Some("1".to_string()));
    memory.remove("a").unwrap();
    assert_eq!(memory.get("a"), None);
    memory.remove("a").unwrap();
}

#[test]
fn test_memory_store_clones_share_entries() {
    let memory = MemoryStore::new();
    let other = memory.clone();
    other.set("k", "v").unwrap();
    assert_eq!(memory.len(), 1);
}

#[test]
fn test_quota_rejects_oversized_writes() {
    let memory = MemoryStore::with_quota(10);
    memory.set("k", "12345").unwrap();
    let err = memory.set("other", "123456").unwrap_err();
    assert!(matches!(err, StoreError::QuotaExceeded { limit: 10, .. }));
    assert_eq!(memory.get("other"), None);

    memory.set("k", "123456789").unwrap();
}

#[test]
fn test_failed_save_is_swallowed() {
    let memory = MemoryStore::with_quota(4);
    store::save_json_record(&memory, "table-columns-songs", &vec!["a", "b"]);
    assert!(memory.is_empty());
}

#[test]
fn test_json_records() {
    let memory = MemoryStore::new();
    store::save_json_record(&memory, "rec", &json!({"order": ["a"]}));
    let loaded: Option<serde_json::Value> = store::load_json_record(&memory, "rec");
    assert_eq!(loaded, Some(json!({"order": ["a"]})));

    memory.set("bad", "{oops").unwrap();
    let corrupt: Option<serde_json::Value> = store::load_json_record(&memory, "bad");
    assert_eq!(corrupt, None);

    store::remove_record(&memory, "rec");
    assert_eq!(memory.get("rec"), None);
}

#[test]
fn test_file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let first = FileStore::new(&path);
    assert_eq!(first.get("a"), None);
    first.set("a", "1").unwrap();
    first.set("b", "2").unwrap();

    let second = FileStore::new(&path);
    assert_eq!(second.get("a"), Some("1".to_string()));
    second.remove("a").unwrap();
    assert_eq!(first.get("a"), None);
    assert_eq!(first.get("b"), Some("2".to_string()));
}

#[test]
fn test_file_store_corrupt_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "garbage").unwrap();

    let file = FileStore::new(&path);
    assert_eq!(file.get("a"), None);
    file.set("a", "1").unwrap();
    assert_eq!(file.get("a"), Some("1".to_string()));
}

#[test]
fn test_shared_store_is_usable_as_trait_object() {
    let shared: store::SharedStore = Arc::new(MemoryStore::new());
    shared.set("x", "y").unwrap();
    assert_eq!(shared.get("x"), Some("y".to_string()));
}
