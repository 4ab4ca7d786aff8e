use serde_json::Value;

use tabula::io::json_io::{self, JsonIoError};

#[test]
fn test_load_json_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("songs.json");
    std::fs::write(
        &path,
        r#"[{"title":"Hello","streams":120},{"title":"Echoes","streams":35}]"#,
    )
    .unwrap();

    let rows = json_io::load_json(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["title"], Value::String("Hello".to_string()));
    assert_eq!(rows[1]["streams"], Value::Number(35.into()));
}

#[test]
fn test_load_json_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, "[]").unwrap();

    let rows = json_io::load_json(&path).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_load_json_not_array() {
    let err = json_io::parse_rows(r#"{"key": "value"}"#).unwrap_err();
    assert!(matches!(err, JsonIoError::NotAnArray));
}

#[test]
fn test_load_json_not_objects() {
    let err = json_io::parse_rows("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, JsonIoError::NotArrayOfObjects));
}

#[test]
fn test_load_json_invalid() {
    let err = json_io::parse_rows("not json").unwrap_err();
    assert!(matches!(err, JsonIoError::Parse(_)));
}

#[test]
fn test_load_json_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = json_io::load_json(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, JsonIoError::Io(_)));
}

#[test]
fn test_nested_values_survive() {
    let rows = json_io::parse_rows(r#"[{"genres":["pop","indie"],"meta":{"bpm":120}}]"#).unwrap();
    assert!(rows[0]["genres"].is_array());
    assert_eq!(rows[0]["meta"]["bpm"], Value::Number(120.into()));
}
